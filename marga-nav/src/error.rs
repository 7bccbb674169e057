//! Error types for MargaNav

use crate::grid::GridCell;
use thiserror::Error;

/// MargaNav error type
#[derive(Error, Debug)]
pub enum NavError {
    #[error("Drive error: {0}")]
    Drive(#[from] chakra_drive::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Position ({x:.1}, {y:.1}) is outside the field")]
    OutOfField { x: f32, y: f32 },

    #[error("No path from {from} to {to}")]
    NoPath { from: GridCell, to: GridCell },

    #[error("Unknown target {0}")]
    UnknownTarget(usize),

    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
