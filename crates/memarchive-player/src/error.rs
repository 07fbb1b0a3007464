//! Memory Archive — player error types.

use memarchive_orchestrator::config::ConfigError;
use thiserror::Error;

/// Startup and runtime errors for the player.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The story document does not resolve.
    #[error("story error: {0}")]
    Story(#[from] ConfigError),

    /// Terminal or state directory I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
