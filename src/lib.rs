pub mod app;
pub mod core;
pub mod error;
pub mod input;
pub mod io;
pub mod locomotion;
pub mod render;
pub mod scene;
pub mod ui;
pub mod viewer;
