//! SHA-256 digest newtype used for content addressing.

use crate::FilesError;

/// A validated lowercase hexadecimal SHA-256 digest.
///
/// Guarantees exactly 64 lowercase hex characters, so the value can be used
/// directly as a filename and as the source of the shard directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Computes the digest of the given bytes.
    pub fn digest(bytes: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Parses an existing digest string.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidHash` unless the input is exactly 64
    /// lowercase hexadecimal characters.
    pub fn parse(input: &str) -> Result<Self, FilesError> {
        if input.len() != 64 {
            return Err(FilesError::InvalidHash(format!(
                "expected 64 hex characters, got {}",
                input.len()
            )));
        }
        let ok = input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !ok {
            return Err(FilesError::InvalidHash(
                "digest must be lowercase hexadecimal".into(),
            ));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-character shard prefix for directory layout.
    pub fn shard(&self) -> &str {
        &self.0[0..2]
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Sha256Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Sha256Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_produces_64_lowercase_hex_characters() {
        let hash = Sha256Hash::digest(b"hello");
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.as_str(), hash.as_str().to_lowercase());
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(Sha256Hash::digest(b"abc"), Sha256Hash::digest(b"abc"));
        assert_ne!(Sha256Hash::digest(b"abc"), Sha256Hash::digest(b"abd"));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            Sha256Hash::parse("abc123"),
            Err(FilesError::InvalidHash(_))
        ));
    }

    #[test]
    fn parse_rejects_uppercase_input() {
        let upper = "A".repeat(64);
        assert!(matches!(
            Sha256Hash::parse(&upper),
            Err(FilesError::InvalidHash(_))
        ));
    }

    #[test]
    fn shard_is_first_two_characters() {
        let hash = Sha256Hash::parse(
            "ab3f9e0000000000000000000000000000000000000000000000000000000000",
        )
        .expect("valid digest");
        assert_eq!(hash.shard(), "ab");
    }
}
