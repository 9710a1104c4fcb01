use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Hex digest of arbitrary bytes.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// 128-bit digest of a sequence of string parts.
///
/// Parts are NUL-separated so that `["ab", "c"]` and `["a", "bc"]` differ.
#[must_use]
pub fn hash_parts(parts: &[&str]) -> u128 {
    let mut hasher = Xxh3::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    hasher.digest128()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_parts_is_deterministic() {
        assert_eq!(hash_parts(&["group", "engine"]), hash_parts(&["group", "engine"]));
    }

    #[test]
    fn test_hash_parts_separates_parts() {
        assert_ne!(hash_parts(&["ab", "c"]), hash_parts(&["a", "bc"]));
    }

    #[test]
    fn test_hash_bytes_format() {
        let digest = hash_bytes(b"version = 1\n");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
