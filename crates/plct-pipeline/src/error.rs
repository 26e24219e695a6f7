//! Error types for pipeline operations

use plct_ingest::LoadError;
use std::fmt;
use thiserror::Error;

/// Conditions that abort a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    /// The persistence sink cannot be reached
    StoreUnavailable,
    /// The reasoning engine rejected the credentials
    EngineUnauthorized,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalKind::StoreUnavailable => write!(f, "record store unavailable"),
            FatalKind::EngineUnauthorized => write!(f, "reasoning engine rejected credentials"),
        }
    }
}

/// Errors that can occur during pipeline operations
///
/// Per-document failures are not errors; they are recorded in the batch
/// report. Only conditions that make every further document pointless end
/// up here.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run cannot continue
    #[error("Fatal: {kind}: {reason}")]
    Fatal {
        /// What failed
        kind: FatalKind,
        /// Underlying message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input directory could not be listed
    #[error("Cannot list documents: {0}")]
    Discovery(#[from] LoadError),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Store connectivity failure
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        PipelineError::Fatal {
            kind: FatalKind::StoreUnavailable,
            reason: reason.into(),
        }
    }

    /// Credential failure
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        PipelineError::Fatal {
            kind: FatalKind::EngineUnauthorized,
            reason: reason.into(),
        }
    }

    /// Whether the error aborts the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Fatal { .. })
    }
}
