//! Error types for document loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a document
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a readable PDF structure
    #[error("Invalid PDF {path}: {source}")]
    InvalidPdf {
        /// File path
        path: PathBuf,
        /// Parser error
        #[source]
        source: lopdf::Error,
    },

    /// Extracted text is empty or too short to support extraction
    #[error("{path} has too little text ({chars} chars, need {min})")]
    EmptyContent {
        /// File path
        path: PathBuf,
        /// Characters extracted after normalization
        chars: usize,
        /// Configured minimum
        min: usize,
    },
}

impl LoadError {
    /// Path of the document that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Io { path, .. }
            | LoadError::InvalidPdf { path, .. }
            | LoadError::EmptyContent { path, .. } => path,
        }
    }

    /// Whether the failure is unusable content rather than an unreadable file
    pub fn is_empty_content(&self) -> bool {
        matches!(self, LoadError::EmptyContent { .. })
    }
}
