//! PDF loading and text normalization

use crate::{fingerprint, LoadError};
use plct_domain::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default minimum characters of usable text
pub const DEFAULT_MIN_TEXT_CHARS: usize = 200;

/// Configuration for the document loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Documents with less normalized text than this are rejected as empty
    pub min_text_chars: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

/// Loads PDFs into [`Document`]s
///
/// Loading is synchronous file and CPU work; async callers should run it on
/// a blocking thread.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    config: LoaderConfig,
}

impl DocumentLoader {
    /// Create a loader
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read and parse the PDF at `path`
    ///
    /// # Errors
    ///
    /// - `LoadError::Io` if the file cannot be read
    /// - `LoadError::InvalidPdf` if it is not a PDF structure
    /// - `LoadError::EmptyContent` if the text is below the threshold
    pub fn load(&self, path: &Path) -> Result<Document, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_bytes(path, &bytes)
    }

    /// Parse already-read PDF bytes
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> Result<Document, LoadError> {
        let identifier = identifier_for(path);

        if bytes.is_empty() {
            return Err(self.empty(path, 0));
        }

        let pdf = lopdf::Document::load_mem(bytes).map_err(|source| LoadError::InvalidPdf {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = pdf.get_pages();
        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match pdf.extract_text(&[*page_number]) {
                Ok(raw) => {
                    let normalized = normalize_whitespace(&raw);
                    if !normalized.is_empty() {
                        page_texts.push(normalized);
                    }
                }
                // One bad page (unsupported font, broken stream) should not sink the report
                Err(e) => warn!(document = %identifier, page = page_number, "Skipping page without extractable text: {}", e),
            }
        }

        let text = page_texts.join("\n\n");
        let chars = text.chars().count();
        if chars < self.config.min_text_chars {
            return Err(self.empty(path, chars));
        }

        debug!(document = %identifier, pages = pages.len(), chars, "Loaded document");

        Ok(Document::new(
            identifier.clone(),
            path,
            bytes.len() as u64,
            pages.len(),
            text,
            fingerprint(&identifier, bytes),
        ))
    }

    fn empty(&self, path: &Path, chars: usize) -> LoadError {
        LoadError::EmptyContent {
            path: path.to_path_buf(),
            chars,
            min: self.config.min_text_chars,
        }
    }
}

/// File name used to identify a document in reports and logs
fn identifier_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Collapse runs of spaces and tabs within lines and drop blank lines
fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// List `*.pdf` files directly inside `dir`, sorted by name
///
/// The extension match is case-insensitive. Subdirectories are not walked.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{filler_text, write_pdf};
    use tempfile::TempDir;

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  Digital   transformation\t report \n\n   \nPage  two ";
        assert_eq!(normalize_whitespace(raw), "Digital transformation report\nPage two");
    }

    #[test]
    fn test_load_preserves_page_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme-2023.pdf");
        let pages = vec![
            format!("FIRST PAGE {}", filler_text(300)),
            format!("SECOND PAGE {}", filler_text(300)),
            format!("THIRD PAGE {}", filler_text(300)),
        ];
        write_pdf(&path, &pages).unwrap();

        let document = DocumentLoader::default().load(&path).unwrap();

        assert_eq!(document.identifier(), "acme-2023.pdf");
        assert_eq!(document.page_count(), 3);
        let text = document.text();
        let first = text.find("FIRST PAGE").unwrap();
        let second = text.find("SECOND PAGE").unwrap();
        let third = text.find("THIRD PAGE").unwrap();
        assert!(first < second && second < third);
        assert!(document.byte_size() > 0);
    }

    #[test]
    fn test_zero_byte_file_is_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.pdf");
        std::fs::write(&path, b"").unwrap();

        let err = DocumentLoader::default().load(&path).unwrap_err();
        assert!(err.is_empty_content());
    }

    #[test]
    fn test_short_text_is_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover-only.pdf");
        write_pdf(&path, &["Annual Report 2023".to_string()]).unwrap();

        match DocumentLoader::default().load(&path) {
            Err(LoadError::EmptyContent { chars, min, .. }) => {
                assert!(chars < min);
                assert_eq!(min, DEFAULT_MIN_TEXT_CHARS);
            }
            other => panic!("expected EmptyContent, got {:?}", other.map(|d| d.page_count())),
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.pdf");
        write_pdf(&path, &["Annual Report 2023".to_string()]).unwrap();

        let loader = DocumentLoader::new(LoaderConfig { min_text_chars: 5 });
        assert!(loader.load(&path).is_ok());
    }

    #[test]
    fn test_garbage_is_invalid_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = DocumentLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPdf { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn test_missing_file_is_io() {
        let err = DocumentLoader::default()
            .load(Path::new("/nonexistent/report.pdf"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_fingerprint_matches_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme.pdf");
        write_pdf(&path, &[filler_text(400)]).unwrap();

        let loader = DocumentLoader::default();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(first.fingerprint(), &fingerprint("acme.pdf", &bytes));
    }

    #[test]
    fn test_discover_pdfs_sorted_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let found: Vec<String> = discover_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.PDF", "b.pdf", "c.pdf"]);
    }
}
