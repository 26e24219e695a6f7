//! Error types for the Extractor

use plct_domain::traits::EngineFailure;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Every attempt failed with a transient failure
    #[error("Extraction failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last: EngineFailure,
    },

    /// The engine rejected the credentials; retrying cannot help
    #[error("Engine rejected credentials: {0}")]
    Unauthorized(String),

    /// The request budget was shut down
    #[error("Request budget closed")]
    BudgetClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether this failure should abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractorError::Unauthorized(_))
    }
}
