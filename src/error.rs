//! Error types for mesh-uninject
//!
//! The uninjection core itself can only fail when the encoder fails; the other
//! variants belong to decoding, input handling and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding, uninjecting or encoding manifests
#[derive(Debug, Error)]
pub enum UninjectError {
    /// The manifest encoder failed to serialize a resource
    #[error("Failed to encode manifest: {0}")]
    Encode(String),

    /// A document could not be parsed into a resource
    #[error("Failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded (e.g. `Deployment "web"`)
        context: String,
        /// Underlying parser message
        message: String,
    },

    /// Reading a specific input failed
    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        /// The offending input path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the output file failed
    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure (stdin, stdout, output file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("could not read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file (or a rendering of it) is not valid TOML
    #[error("parsing failed: {0}")]
    ParsingFailed(String),
}

impl UninjectError {
    /// Build a decode error with a short description of the document.
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, UninjectError>;
