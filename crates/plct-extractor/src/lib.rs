//! PLCT Structured Extractor
//!
//! Turns a document's full text into a candidate JSON payload by calling a
//! reasoning engine once per document.
//!
//! # Architecture
//!
//! ```text
//! Document text → PromptBuilder → RequestBudget → ReasoningEngine → parser → RawPayload
//!                                       ↑                 │
//!                                       └── retry/backoff ┘
//! ```
//!
//! # Key Features
//!
//! - **Full-document strategy**: one call carries the whole (truncated) text
//!   plus the rendered schema
//! - **Retry policy**: exponential backoff on transient failures, no retry on
//!   rejected credentials
//! - **Shared budget**: per-minute quota and concurrency cap shared by all
//!   workers, slowing down automatically on rate limiting
//! - **Untrusted output**: the result is a `RawPayload` that must still pass
//!   the validator
//!
//! # Example Usage
//!
//! ```no_run
//! use plct_extractor::{ExtractorConfig, StructuredExtractor};
//! use plct_domain::SchemaSpec;
//! use plct_llm::MockEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MockEngine::new(r#"{"companyName": "Acme", "reportYear": 2023, "initiatives": []}"#);
//! let extractor = StructuredExtractor::new(engine, ExtractorConfig::default())?;
//!
//! let payload = extractor.extract("Annual report text...", &SchemaSpec::plct()).await?;
//! println!("{}", payload.value());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod budget;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;


pub use budget::RequestBudget;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::StructuredExtractor;
pub use parser::parse_response;
pub use prompt::PromptBuilder;
pub use types::{Extraction, RawPayload};
