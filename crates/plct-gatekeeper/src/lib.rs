//! PLCT Gatekeeper
//!
//! Validates and coerces untrusted engine output against the extraction
//! schema before anything touches the data model.
//!
//! The Gatekeeper:
//! - Rejects payloads missing required top-level keys
//! - Clamps out-of-range scores and records a violation
//! - Maps unknown enum labels to `Unclassified` and records a violation
//! - Degrades unparseable nested fields to empty lists
//! - Rejects individual initiatives that lack a description or any PLCT dimension,
//!   and the whole payload when every listed initiative is rejected
//!
//! # Examples
//!
//! ```
//! use plct_gatekeeper::SchemaValidator;
//! use plct_extractor::RawPayload;
//! use serde_json::json;
//!
//! let validator = SchemaValidator::default_config();
//! let raw = RawPayload::new(json!({
//!     "companyName": "Acme Berhad",
//!     "reportYear": 2023,
//!     "initiatives": []
//! }));
//!
//! let payload = validator.validate(&raw).unwrap();
//! assert_eq!(payload.company.name, "Acme Berhad");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fields;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::SchemaValidator;
