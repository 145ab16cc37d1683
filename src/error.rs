//! Error types for the scscript netlist and results parsers.
//!
//! This module provides a unified error type [`ScsError`] that covers
//! all error conditions that can occur during netlist parsing, query
//! pattern compilation, and results-file decoding.

use thiserror::Error;

/// Result type alias using [`ScsError`].
pub type Result<T> = std::result::Result<T, ScsError>;

/// Unified error type for all scscript operations.
#[derive(Error, Debug)]
pub enum ScsError {
    // ============ Netlist Parsing Errors ============
    /// A logical line could not be split into at least a statement name
    #[error("Malformed statement at line {line}: {text:?}")]
    MalformedStatement { line: usize, text: String },

    /// End of input reached while a subcircuit or brace block was still open
    #[error("Unterminated block opened at line {line}")]
    UnterminatedBlock { line: usize },

    // ============ Query Errors ============
    /// A search pattern failed to compile
    #[error("Invalid match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // ============ Results Parsing Errors ============
    /// A preamble section header outside the recognized set
    #[error("Unrecognized results section '{section}'")]
    UnknownPreambleSection { section: String },

    /// Results input ended before a VALUE or END section was reached
    #[error("Results input ended before the VALUE section")]
    TruncatedResults,

    // ============ I/O Errors ============
    /// Error reading an input file
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScsError {
    /// Create a malformed-statement error
    pub fn malformed(line: usize, text: impl Into<String>) -> Self {
        Self::MalformedStatement {
            line,
            text: text.into(),
        }
    }

    /// Create an invalid-pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an unknown-section error
    pub fn unknown_section(section: impl Into<String>) -> Self {
        Self::UnknownPreambleSection {
            section: section.into(),
        }
    }

    /// Create a file-read error
    pub fn file_read(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a file-write error
    pub fn file_write(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            source,
        }
    }
}
