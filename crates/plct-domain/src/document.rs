//! Document module - one source report

use std::fmt;
use std::path::{Path, PathBuf};

/// Content fingerprint of a source document
///
/// Stable across runs for the same file name and bytes; the store uses it to
/// keep re-runs from double-inserting initiatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentFingerprint(String);

impl DocumentFingerprint {
    /// Wrap an already computed fingerprint
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fingerprint as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded source report
///
/// The extracted text is immutable once produced. Documents are never
/// persisted; only the records derived from them are.
#[derive(Debug, Clone)]
pub struct Document {
    identifier: String,
    path: PathBuf,
    byte_size: u64,
    page_count: usize,
    text: String,
    fingerprint: DocumentFingerprint,
}

impl Document {
    /// Assemble a document from loader output
    pub fn new(
        identifier: impl Into<String>,
        path: impl Into<PathBuf>,
        byte_size: u64,
        page_count: usize,
        text: String,
        fingerprint: DocumentFingerprint,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
            byte_size,
            page_count,
            text,
            fingerprint,
        }
    }

    /// File name used as the document identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file size in bytes
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Full extracted text in page order
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> &DocumentFingerprint {
        &self.fingerprint
    }
}
