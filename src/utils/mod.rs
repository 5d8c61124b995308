// src/utils/mod.rs
pub mod error;
pub mod html_debug;
pub mod logging;

pub use error::AppError; // Top-level error of the command-line driver
