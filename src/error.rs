//! Error types and handling for the Wayfarer application

use thiserror::Error;

/// Main error type for the Wayfarer application.
///
/// Upstream place-source failures have their own taxonomy in
/// [`crate::places::PlaceSourceError`]; this type covers configuration
/// and cache setup, the only other fallible surfaces.
#[derive(Error, Debug)]
pub enum WayfarerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl WayfarerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}
