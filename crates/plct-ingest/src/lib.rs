//! PLCT Document Loader
//!
//! Opens annual-report PDFs and yields their full text plus lightweight
//! metadata. Text keeps page order; the only cleaning is whitespace
//! normalization.
//!
//! # Example
//!
//! ```no_run
//! use plct_ingest::{DocumentLoader, LoaderConfig};
//! use std::path::Path;
//!
//! let loader = DocumentLoader::new(LoaderConfig::default());
//! let document = loader.load(Path::new("reports/acme-2023.pdf")).unwrap();
//! println!("{} pages, {} chars", document.page_count(), document.text().len());
//! ```

#![warn(missing_docs)]

mod error;
mod fingerprint;
mod loader;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::LoadError;
pub use fingerprint::fingerprint;
pub use loader::{discover_pdfs, DocumentLoader, LoaderConfig, DEFAULT_MIN_TEXT_CHARS};
