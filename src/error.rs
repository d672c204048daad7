//! Error types for the model viewer

use thiserror::Error;

/// Main error type for setup and I/O paths. Runtime degradations only log.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load model '{path}': {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GUI error: {0}")]
    Gui(String),
}

impl From<toml::de::Error> for ViewerError {
    fn from(e: toml::de::Error) -> Self {
        ViewerError::Config(format!("Failed to parse TOML: {}", e))
    }
}

impl From<eframe::Error> for ViewerError {
    fn from(e: eframe::Error) -> Self {
        ViewerError::Gui(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
