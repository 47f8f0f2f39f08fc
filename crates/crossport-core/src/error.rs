//! Unified error handling for Crossport
//!
//! This module provides a single error type that encompasses all
//! failure modes of an export run.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all Crossport operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Model Errors ====================

    /// Asset model failed to deserialize
    #[error("Invalid asset model: {0}")]
    InvalidModel(String),

    // ==================== Export Errors ====================

    /// Asset has no resolvable source location
    #[error("Asset is not exportable: {name}")]
    NotExportable { name: String },

    /// Writing one output document failed
    #[error("Failed to write document {path}: {source}")]
    DocumentWrite {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Export failed
    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    // ==================== General Errors ====================

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Multiple independent errors occurred
    #[error("Multiple errors occurred: {0:?}")]
    Multiple(Vec<Error>),
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an export failure with a message
    pub fn export_failed(message: impl Into<String>) -> Self {
        Error::ExportFailed {
            message: message.into(),
        }
    }

    /// Collapse a list of per-document failures into one error.
    ///
    /// Returns `Ok(())` for an empty list and unwraps a single-element
    /// list so callers never see `Multiple([e])`.
    pub fn from_failures(mut failures: Vec<Error>) -> Result<()> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Error::Multiple(failures)),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::FileNotFound(PathBuf::from("/test"));
        let contextualized = err.with_context("while loading graph");

        assert!(contextualized.to_string().contains("while loading graph"));
    }

    #[test]
    fn test_from_failures_empty() {
        assert!(Error::from_failures(Vec::new()).is_ok());
    }

    #[test]
    fn test_from_failures_single() {
        let result = Error::from_failures(vec![Error::export_failed("one")]);
        match result {
            Err(Error::ExportFailed { message }) => assert_eq!(message, "one"),
            other => panic!("Expected ExportFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_from_failures_many() {
        let result = Error::from_failures(vec![
            Error::export_failed("one"),
            Error::export_failed("two"),
        ]);
        match result {
            Err(Error::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected Multiple, got {:?}", other),
        }
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::FileNotFound(PathBuf::from("/test")));
        let with_context = result.context("loading graph");

        assert!(with_context.is_err());
        assert!(with_context.unwrap_err().to_string().contains("loading graph"));
    }
}
