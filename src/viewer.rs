pub mod grab;
pub mod pool;
pub mod session;
pub mod ui;
