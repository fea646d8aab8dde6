//! Content fingerprint of the knowledge-base sources.
//!
//! The persisted index is only reused when the fingerprint recorded at build
//! time equals the fingerprint of the files on disk now.

use crate::records::KnowledgeSources;
use guardiane_core::AppResult;
use sha2::{Digest, Sha256};

/// SHA-256 (lowercase hex) over the concatenation of `parts`, in order.
pub fn fingerprint_bytes<T: AsRef<[u8]>>(parts: &[T]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    format!("{:x}", hasher.finalize())
}

/// Fingerprint of the FAQ file followed by the hotline file.
pub fn compute_fingerprint(sources: &KnowledgeSources) -> AppResult<String> {
    let raw = sources.read_raw()?;
    let fingerprint = fingerprint_bytes(raw.as_slice());

    tracing::debug!(
        "Computed source fingerprint {} over {} bytes",
        &fingerprint[..12],
        raw.iter().map(Vec::len).sum::<usize>()
    );

    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let hash = fingerprint_bytes(&["Hello, world!"]);
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3"
        );
    }

    #[test]
    fn test_only_concatenated_bytes_matter() {
        assert_eq!(fingerprint_bytes(&["ab", "c"]), fingerprint_bytes(&["a", "bc"]));
        assert_ne!(fingerprint_bytes(&["ab", "c"]), fingerprint_bytes(&["c", "ab"]));
    }

    #[test]
    fn test_byte_change_changes_fingerprint() {
        let temp = TempDir::new().unwrap();
        let faq = temp.path().join("faq.json");
        let hotlines = temp.path().join("hotlines.json");
        std::fs::write(&faq, r#"[{"answer": "Talk early."}]"#).unwrap();
        std::fs::write(&hotlines, "[]").unwrap();
        let sources = KnowledgeSources::new(&faq, &hotlines);

        let first = compute_fingerprint(&sources).unwrap();
        assert_eq!(first, compute_fingerprint(&sources).unwrap());

        std::fs::write(&hotlines, "[ ]").unwrap();
        assert_ne!(first, compute_fingerprint(&sources).unwrap());
    }
}
