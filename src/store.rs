//! The flat output directory holding one anchor file and many hash-named section files.
//!
//! All path resolution for readers goes through here, so that a name or hash supplied from
//! outside can never reach a file beyond the root directory.
//!
//! A store that knows its anchor's stem classifies that file as the anchor even when the stem
//! happens to be hex (a source named `20241017.md`, say). Cleaning is scoped to one anchor and the
//! section files its reference block lists, so other documents sharing the directory survive.

use crate::error::{Error, Result};
use crate::hasher::{MAX_HASH_LENGTH, MIN_HASH_LENGTH};
use crate::reconstruct;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Role of a file in the output directory.
pub enum FileKind {
    /// Named after the source document; carries the reference block.
    Anchor,
    /// Named after its content hash.
    Section,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One file found in the output directory.
pub struct StoredFile {
    /// File name including extension.
    pub name: String,
    /// Anchor or section.
    pub kind: FileKind,
    /// Hash taken from the name, for section files.
    pub hash: Option<String>,
    /// Size in bytes.
    pub size: u64,
}

#[derive(Clone, Debug)]
/// A directory of split output with a fixed file extension.
pub struct SectionStore {
    root: PathBuf,
    extension: String,
    anchor_stem: Option<String>,
}

impl SectionStore {
    #[must_use]
    /// A store rooted at `root` whose files end in `extension` (including the dot).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            anchor_stem: None,
        }
    }

    #[must_use]
    /// Treat the file named after `stem` as the anchor, whatever the stem looks like.
    pub fn with_anchor(mut self, stem: impl Into<String>) -> Self {
        self.anchor_stem = Some(stem.into());
        self
    }

    #[must_use]
    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    /// Extension given to every file, including the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    /// File name for a section with the given hash.
    pub fn section_name(&self, hash: &str) -> String {
        format!("{hash}{}", self.extension)
    }

    #[must_use]
    /// Where a section with the given hash lives.
    pub fn section_path(&self, hash: &str) -> PathBuf {
        self.root.join(self.section_name(hash))
    }

    #[must_use]
    /// File name for the anchor of a source with the given stem.
    pub fn anchor_name(&self, stem: &str) -> String {
        format!("{stem}{}", self.extension)
    }

    /// Create the root directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the directory cannot be created.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::from_io(e, &self.root))
    }

    /// Every file in the root with this store's extension, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the root cannot be listed.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let entries = fs::read_dir(&self.root).map_err(|e| Error::from_io(e, &self.root))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::from_io(e, &self.root))?;
            let metadata = entry.metadata().map_err(|e| Error::from_io(e, &entry.path()))?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(stem) = self.stem_of(&name) else {
                continue;
            };
            let is_anchor = self.anchor_stem.as_deref() == Some(stem);
            let hash = (!is_anchor && is_hash_stem(stem)).then(|| stem.to_ascii_uppercase());
            files.push(StoredFile {
                kind: if hash.is_some() {
                    FileKind::Section
                } else {
                    FileKind::Anchor
                },
                hash,
                size: metadata.len(),
                name,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Resolve a file name inside the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if `name` is absolute, contains `..` or otherwise
    /// resolves outside the root, and [`Error::NotFound`] if it does not exist.
    pub fn resolve_name(&self, name: &str) -> Result<PathBuf> {
        let candidate = Path::new(name);
        let plain = !name.is_empty()
            && candidate
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(Error::PermissionDenied {
                path: candidate.to_path_buf(),
            });
        }

        let joined = self.root.join(candidate);
        let root = self
            .root
            .canonicalize()
            .map_err(|e| Error::from_io(e, &self.root))?;
        let resolved = joined
            .canonicalize()
            .map_err(|e| Error::from_io(e, &joined))?;
        if !resolved.starts_with(&root) {
            return Err(Error::PermissionDenied { path: joined });
        }
        Ok(resolved)
    }

    /// Resolve the section file for a hash inside the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `hash` is not 8 to 16 hex characters, otherwise as
    /// [`SectionStore::resolve_name`].
    pub fn resolve_hash(&self, hash: &str) -> Result<PathBuf> {
        if !is_hash_stem(hash) {
            return Err(Error::InvalidInput(format!("{hash:?} is not a section hash")));
        }
        self.resolve_name(&self.section_name(&hash.to_ascii_uppercase()))
    }

    /// Remove the anchor named after `anchor_stem` and the section files its reference block
    /// lists.
    ///
    /// Section files that the anchor does not reference, and every other file, are left alone.
    /// A missing root or anchor counts as already clean.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the anchor cannot be read or a file cannot be removed.
    pub fn clean(&self, anchor_stem: &str) -> Result<usize> {
        let anchor = self.root.join(self.anchor_name(anchor_stem));
        if !anchor.is_file() {
            debug!(anchor = ?anchor, "No anchor, nothing to clean");
            return Ok(0);
        }
        let text = fs::read_to_string(&anchor).map_err(|e| Error::from_io(e, &anchor))?;
        let block = reconstruct::extract_references(&text);

        let mut removed = 0;
        for reference in &block.references {
            if !is_hash_stem(&reference.hash) || reference.hash.eq_ignore_ascii_case(anchor_stem) {
                continue;
            }
            let path = self.section_path(&reference.hash);
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| Error::from_io(e, &path))?;
                debug!(path = ?path, "Removed");
                removed += 1;
            }
        }
        fs::remove_file(&anchor).map_err(|e| Error::from_io(e, &anchor))?;
        removed += 1;
        info!(root = ?self.root, removed, "Cleaned output directory");
        Ok(removed)
    }

    fn stem_of<'a>(&self, name: &'a str) -> Option<&'a str> {
        if self.extension.is_empty() {
            return (!name.contains('.')).then_some(name);
        }
        name.strip_suffix(self.extension.as_str())
            .filter(|stem| !stem.is_empty())
    }
}

fn is_hash_stem(stem: &str) -> bool {
    (MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&stem.len())
        && stem.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "tests/store.rs"]
mod tests;
