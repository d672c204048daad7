pub mod devices;
pub mod emulator;
