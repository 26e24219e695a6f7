//! Content fingerprints used to recognise documents across runs

use plct_domain::DocumentFingerprint;
use sha2::{Digest, Sha256};

/// Fingerprint a document by name and content
///
/// SHA-256 over the file name, a NUL separator and the raw bytes, hex-encoded.
pub fn fingerprint(file_name: &str, bytes: &[u8]) -> DocumentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(file_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(bytes);
    DocumentFingerprint::new(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint("acme-2023.pdf", b"%PDF-1.5 body");
        let b = fingerprint("acme-2023.pdf", b"%PDF-1.5 body");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_depends_on_name_and_bytes() {
        let base = fingerprint("acme-2023.pdf", b"body");
        assert_ne!(base, fingerprint("acme-2024.pdf", b"body"));
        assert_ne!(base, fingerprint("acme-2023.pdf", b"body!"));
        // The separator keeps name/content boundaries unambiguous
        assert_ne!(fingerprint("ab", b"c"), fingerprint("a", b"bc"));
    }
}
