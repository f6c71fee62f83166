//! CLI error type.

use std::fmt;

use treasurehunt::config::ConfigError;
use treasurehunt::logging::LoggingError;
use treasurehunt::HuntError;

/// Errors surfaced to the terminal.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be read, written or applied.
    Config(String),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// The hunt service rejected a request or stopped.
    Hunt(HuntError),
    /// The async runtime could not be created.
    Runtime(String),
    /// Invalid command-line input.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Hunt(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::Hunt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<HuntError> for CliError {
    fn from(e: HuntError) -> Self {
        CliError::Hunt(e)
    }
}
