//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `job-wrecker` application. It uses the `thiserror` library to create a
//! small `Error` enum that covers the failure modes of a translation run.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur while translating a job. The most important variant is
//!   `UnrecognizedConstruct`, the single recoverable classification failure:
//!   inside a handler it is caught at the item boundary and converted into a
//!   raw-XML fallback value; at the root walker it is fatal for that job.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library to simplify function signatures.
//!
//! Anything outside the engine (file I/O, argument handling) is surfaced by
//! the binary through `anyhow`.

use thiserror::Error;

/// Main error type for job-wrecker operations
#[derive(Error, Debug)]
pub enum Error {
    /// A node shape that no handler knows how to interpret, or an
    /// interpreted shape whose combination of attributes and children is
    /// outside the supported cases.
    ///
    /// Inside subsystem handlers this is caught per item and replaced with
    /// a raw-XML fallback value. Only at the root walker does it escape to
    /// the caller.
    #[error("unrecognized construct <{tag}>: {message}")]
    UnrecognizedConstruct { tag: String, message: String },

    /// The source document could not be parsed or re-serialized as XML.
    #[error("XML error: {message}")]
    Xml { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for the classification failure used all over the handlers.
    pub fn unrecognized(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnrecognizedConstruct {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unrecognized_construct() {
        let error = Error::unrecognized("hudson.tasks.Ant", "cannot handle builder");
        let display = format!("{}", error);
        assert!(display.contains("unrecognized construct"));
        assert!(display.contains("<hudson.tasks.Ant>"));
        assert!(display.contains("cannot handle builder"));
    }

    #[test]
    fn test_error_display_xml() {
        let error = Error::Xml {
            message: "unexpected end of document".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("XML error"));
        assert!(display.contains("unexpected end of document"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
