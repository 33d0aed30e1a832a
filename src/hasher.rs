//! Content addressing: deterministic, truncated digests over normalised section text.
//!
//! Sections are identified by what they say rather than where they sit, so the digest is
//! computed after normalisation (outer whitespace trimmed, line endings unified) and with the
//! section's own divider line removed. Rewriting that divider with a hash and timestamp therefore
//! never changes the hash.

use crate::error::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// Shortest permitted hash, in hex characters.
pub const MIN_HASH_LENGTH: usize = 8;
/// Longest permitted hash, in hex characters.
pub const MAX_HASH_LENGTH: usize = 16;
/// Hash length used when none is configured.
pub const DEFAULT_HASH_LENGTH: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Digest families available for content addressing.
pub enum HashAlgorithm {
    /// SHA-256, the default.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
    /// BLAKE3.
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm, in the order reported by [`ContentHasher::compare`].
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha512, Self::Blake3];

    /// Look an algorithm up by its configuration name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for names other than `sha256`, `sha512` and `blake3`.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            other => Err(Error::InvalidInput(format!(
                "unknown hash algorithm {other:?} (expected sha256, sha512 or blake3)"
            ))),
        }
    }

    #[must_use]
    /// Configuration name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    #[must_use]
    /// Full uppercase hex digest of `bytes`.
    pub fn digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => hex::encode_upper(Sha256::digest(bytes)),
            Self::Sha512 => hex::encode_upper(Sha512::digest(bytes)),
            Self::Blake3 => hex::encode_upper(blake3::hash(bytes).as_bytes()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
/// Uppercase hex identity of a section's normalised content.
pub struct ContentHash(String);

impl ContentHash {
    /// Accept an externally supplied hash of the given length, uppercasing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] unless `text` is exactly `length` hex characters.
    pub fn parse(text: &str, length: usize) -> Result<Self> {
        if is_valid_hash(text, length) {
            Ok(Self(text.to_ascii_uppercase()))
        } else {
            Err(Error::InvalidInput(format!(
                "{text:?} is not a {length}-character hex hash"
            )))
        }
    }

    #[must_use]
    /// The hash text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// The same content digested by every supported algorithm, for side-by-side comparison.
pub struct DigestComparison {
    /// Truncated SHA-256 digest.
    pub sha256: String,
    /// Truncated SHA-512 digest.
    pub sha512: String,
    /// Truncated BLAKE3 digest.
    pub blake3: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Produces [`ContentHash`]es with one configured algorithm and length.
pub struct ContentHasher {
    algorithm: HashAlgorithm,
    length: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            length: DEFAULT_HASH_LENGTH,
        }
    }
}

impl ContentHasher {
    /// Create a hasher truncating `algorithm`'s digest to `length` hex characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `length` is outside 8..=16.
    pub fn new(algorithm: HashAlgorithm, length: usize) -> Result<Self> {
        if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&length) {
            return Err(Error::InvalidInput(format!(
                "hash length must be between {MIN_HASH_LENGTH} and {MAX_HASH_LENGTH}, got {length}"
            )));
        }
        Ok(Self { algorithm, length })
    }

    #[must_use]
    /// Configured algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    /// Configured hash length in hex characters.
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    /// Hash normalised `content`.
    pub fn hash(&self, content: &str) -> ContentHash {
        let normalized = normalize(content);
        ContentHash(self.truncate(self.algorithm.digest(normalized.as_bytes())))
    }

    /// Hash raw bytes that are expected to be UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `bytes` is not valid UTF-8.
    pub fn hash_bytes(&self, bytes: &[u8]) -> Result<ContentHash> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidInput(format!("content is not UTF-8 text: {e}")))?;
        Ok(self.hash(text))
    }

    #[must_use]
    /// Hash a section's content with its own divider line removed.
    ///
    /// The divider is matched verbatim against whole lines; if it cannot be found the entire
    /// content is hashed.
    pub fn section_hash(&self, content: &str, divider: Option<&str>) -> ContentHash {
        match divider.and_then(|divider| without_line(content, divider)) {
            Some(body) => self.hash(&body),
            None => self.hash(content),
        }
    }

    #[must_use]
    /// Digest `content` with every algorithm at this hasher's length.
    pub fn compare(&self, content: &str) -> DigestComparison {
        let normalized = normalize(content);
        let digest = |algorithm: HashAlgorithm| {
            self.truncate(algorithm.digest(normalized.as_bytes()))
        };
        DigestComparison {
            sha256: digest(HashAlgorithm::Sha256),
            sha512: digest(HashAlgorithm::Sha512),
            blake3: digest(HashAlgorithm::Blake3),
        }
    }

    #[must_use]
    /// Whether `text` has this hasher's length and is entirely hex.
    pub fn is_valid_hash(&self, text: &str) -> bool {
        is_valid_hash(text, self.length)
    }

    fn truncate(&self, mut digest: String) -> String {
        digest.truncate(self.length);
        digest
    }
}

#[must_use]
/// Normalise text before digesting.
///
/// Trims outer whitespace and converts CRLF and lone CR to LF. Trimming also removes every
/// trailing newline, so runs of trailing blank lines never affect the digest.
pub fn normalize(content: &str) -> String {
    content.trim().replace("\r\n", "\n").replace('\r', "\n")
}

#[must_use]
/// Whether `text` is exactly `length` hex characters, in either case.
pub fn is_valid_hash(text: &str, length: usize) -> bool {
    text.len() == length && text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn without_line(content: &str, line: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let position = lines.iter().position(|candidate| *candidate == line)?;
    let mut kept = lines;
    kept.remove(position);
    Some(kept.join("\n"))
}

#[cfg(test)]
#[path = "tests/hasher.rs"]
mod tests;
