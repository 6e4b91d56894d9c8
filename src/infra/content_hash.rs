//! Content hash computation for change detection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// SHA256 hash of a note's text, stored as 64 lowercase hex characters.
///
/// Two hashes compare equal exactly when the texts they were computed from
/// are byte-identical, which is what the index uses to skip re-indexing
/// unchanged files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    hex: String,
}

/// Errors when parsing a content hash from a hex string.
#[derive(Debug, Error)]
pub enum ContentHashError {
    #[error("invalid content hash: expected 64 hex characters, got {0} characters")]
    InvalidLength(usize),

    #[error("invalid hex character at position {position}: '{character}'")]
    InvalidCharacter { position: usize, character: char },
}

impl ContentHash {
    /// Hashes raw bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self {
            hex: format!("{:x}", digest),
        }
    }

    /// Hashes the UTF-8 bytes of `text`.
    pub fn of_text(text: &str) -> Self {
        Self::compute(text.as_bytes())
    }

    /// Parses a hash previously produced by [`ContentHash::as_str`].
    ///
    /// Upper-case input is accepted and normalized to lowercase.
    pub fn from_hex(hex: &str) -> Result<Self, ContentHashError> {
        if hex.len() != 64 {
            return Err(ContentHashError::InvalidLength(hex.len()));
        }

        if let Some((position, character)) =
            hex.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit())
        {
            return Err(ContentHashError::InvalidCharacter {
                position,
                character,
            });
        }

        Ok(Self {
            hex: hex.to_ascii_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.hex)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
