//! Error types shared across Montage crates.

use std::path::PathBuf;

/// Top-level error type for Montage operations.
#[derive(Debug, thiserror::Error)]
pub enum MontageError {
    #[error("Timeline error: {message}")]
    Timeline { message: String },

    #[error("Animation error: {message}")]
    Animation { message: String },

    #[error("Asset error: {message}")]
    Asset { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid render options: {message}")]
    InvalidRenderOptions { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MontageError.
pub type MontageResult<T> = Result<T, MontageError>;

impl MontageError {
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline {
            message: msg.into(),
        }
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation {
            message: msg.into(),
        }
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_render_options(msg: impl Into<String>) -> Self {
        Self::InvalidRenderOptions {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
