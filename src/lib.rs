pub mod app;
pub mod board;
pub mod canvas;
pub mod components;
pub mod config;
pub mod demo;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod gesture;
pub mod state;
pub mod viewport;

use log::{info, Level};

/// Initialize logging and the panic hook for the WASM target.
pub fn init_logging() {
    let _ = console_log::init_with_level(Level::Debug);
    console_error_panic_hook::set_once();
    info!("task-board: logging initialized");
}
