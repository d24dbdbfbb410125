//! Content fingerprints for notes.
//!
//! A note's guid is the SHA-1 of its joined field values, so re-adding
//! identical content maps to the same guid. The checksum column stores the
//! first 8 hex digits of the same digest as an integer; the importing
//! application uses it for duplicate scanning.

use sha1::{Digest, Sha1};

/// ASCII unit separator used between field values in the `flds` column.
pub const FIELD_SEPARATOR: &str = "\u{001f}";

/// Join field values with the reserved separator byte.
pub fn join_fields(fields: &[String]) -> String {
    fields.join(FIELD_SEPARATOR)
}

/// Lowercase hex SHA-1 of a string.
pub fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First 8 hex digits of the SHA-1 digest, as an integer.
pub fn field_checksum(joined: &str) -> u32 {
    u32::from_str_radix(&sha1_hex(joined)[..8], 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_uses_unit_separator() {
        let fields = vec!["hello".to_string(), "world".to_string()];
        assert_eq!(join_fields(&fields), "hello\u{001f}world");
    }

    #[test]
    fn sha1_matches_known_digest() {
        assert_eq!(sha1_hex("hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
        assert_eq!(
            sha1_hex("front\u{001f}back"),
            "a61b277e96905ba65b9be5d1713af9b3f4609497"
        );
    }

    #[test]
    fn checksum_is_truncated_digest() {
        assert_eq!(field_checksum("hello"), 0xaaf4c61d);
        assert_eq!(field_checksum("hello\u{001f}world"), 212958591);
    }
}
