//! Stable hashing for placement IDs

use sha2::{Digest, Sha256};

/// Deterministic 16-hex-char id from the identifying parts of an element.
///
/// Parts are joined with a separator that cannot occur in keys, so
/// `["a:b", "c"]` and `["a", "b:c"]` hash differently.
pub fn stable_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            hasher.update([0x1f]);
        }
        hasher.update(part.as_bytes());
    }
    let result = hasher.finalize();
    format!("{:x}", result)[..16].to_string()
}
