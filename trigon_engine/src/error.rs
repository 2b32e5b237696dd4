//! Error types for the Trigon engine
//!
//! This module defines the error types used throughout the engine: shader
//! compilation and program link failures carrying the driver diagnostics, plus
//! the backend, resource and initialization errors of the surrounding stack.

use std::fmt;

use crate::graphics_device::ShaderStage;

/// Result type for Trigon engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trigon engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A shader stage failed to compile.
    ///
    /// `log` is the driver diagnostic, truncated to the configured capacity.
    CompilationError {
        stage: ShaderStage,
        log: String,
    },

    /// A program failed to link (or the stage set cannot form a program).
    LinkError {
        log: String,
    },

    /// Backend-specific error (object allocation, driver failure, etc.)
    BackendError(String),

    /// Invalid resource (spent shader unit, released object, etc.)
    InvalidResource(String),

    /// Initialization failed (context, window, function loading)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CompilationError { stage, log } => {
                write!(f, "Shader compilation failed ({} stage): {}", stage, log)
            }
            Error::LinkError { log } => write!(f, "Program link failed: {}", log),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
