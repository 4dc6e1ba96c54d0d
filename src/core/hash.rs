//! Content hashing
//!
//! SHA-256 over canonical JSON (struct field order, BTreeMap keys),
//! lowercase hex. Every produced record hashes only its own fields.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of raw bytes
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash of a record's canonical JSON encoding.
///
/// Records in this crate only use string-keyed maps, so encoding cannot fail;
/// a failure would hash the empty document.
pub fn hash_record<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    sha256_hex(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_is_stable() {
        let a = json!({"axes": [1, 2, 3], "verdict": "SEAL"});
        assert_eq!(hash_record(&a), hash_record(&a.clone()));
        assert_eq!(hash_record(&a).len(), 64);
    }

    #[test]
    fn test_hash_differs_on_content() {
        assert_ne!(hash_record(&json!({"x": 1})), hash_record(&json!({"x": 2})));
    }
}
