//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we look for a splitmark.toml (or an explicitly named file), and if present we
//! load settings from there. The resulting value is passed to every component that needs it;
//! nothing reads configuration from ambient state after startup.

use crate::error::{Error, Result};
use crate::hasher::{ContentHasher, HashAlgorithm};
use crate::timestamp::Zone;
use facet::Facet;
use std::fs;
use std::io;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "splitmark.toml";
/// Extension given to written section files.
pub const DEFAULT_EXTENSION: &str = ".md";
/// Input size at or above which files are processed by streaming.
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 10 * 1024 * 1024;
/// Longest line the streaming indexer accepts.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

#[derive(Facet, Clone, Debug, PartialEq, Eq)]
/// User preferences loaded from splitmark.toml or falling back to defaults.
pub struct Config {
    #[facet(default = ".md".to_string())]
    /// Extension of written files, with or without the leading dot.
    pub extension: String,
    #[facet(default = 8)]
    /// Length of content hashes in hex characters (8 to 16).
    pub hash_length: usize,
    #[facet(default = "sha256".to_string())]
    /// Digest used for content hashes: sha256, sha512 or blake3.
    pub hash_algorithm: String,
    #[facet(default = 10_485_760)]
    /// Input size in bytes from which the streaming strategy is used.
    pub streaming_threshold: u64,
    #[facet(default = 1_048_576)]
    /// Longest line in bytes accepted while streaming.
    pub max_line_length: usize,
    #[facet(default = "local".to_string())]
    /// Zone for divider timestamps: local, utc, or an offset such as +02:00.
    pub timezone: String,
    #[facet(default = false)]
    /// Replace existing files instead of skipping them.
    pub overwrite: bool,
    #[facet(default = false)]
    /// Stamp every section of one split with the same timestamp.
    pub shared_timestamp: bool,
    #[facet(default = true)]
    /// Append a reference block to the anchor file.
    pub references: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            hash_length: crate::hasher::DEFAULT_HASH_LENGTH,
            hash_algorithm: HashAlgorithm::default().name().to_string(),
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            timezone: "local".to_string(),
            overwrite: false,
            shared_timestamp: false,
            references: true,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from splitmark.toml if present, else use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read, if an existing splitmark.toml
    /// cannot be read, or if a configuration file cannot be parsed. Only a missing
    /// splitmark.toml falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
                Self::parse(&contents)
            }
            None => Self::load_optional(Path::new(CONFIG_FILE)),
        }
    }

    /// Load `path` if it exists, else use defaults.
    fn load_optional(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::from_io(e, path)),
        }
    }

    /// Parse TOML text, filling unspecified fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not a valid configuration.
    pub fn parse(contents: &str) -> Result<Self> {
        facet_toml::from_str::<Self>(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Build the content hasher described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown algorithm or an out-of-range length.
    pub fn hasher(&self) -> Result<ContentHasher> {
        ContentHasher::new(HashAlgorithm::parse(&self.hash_algorithm)?, self.hash_length)
    }

    #[must_use]
    /// Zone used for divider timestamps.
    pub fn zone(&self) -> Zone {
        Zone::parse(&self.timezone)
    }

    #[must_use]
    /// File extension with exactly one leading dot, or empty for extensionless output.
    pub fn extension(&self) -> String {
        let bare = self.extension.trim().trim_start_matches('.');
        if bare.is_empty() {
            String::new()
        } else {
            format!(".{bare}")
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
