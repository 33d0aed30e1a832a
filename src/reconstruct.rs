//! Rebuilding a document from its anchor file and the section files it references.
//!
//! The anchor ends with a block of `---: <HASH>` lines. Everything before that block (and the
//! blank lines leading into it) is the base content, including any hash-like divider lines that
//! are followed by ordinary text. Each hash resolves to `<HASH><extension>`
//! in the search directory; the section's annotated divider is collapsed back to a bare `---:`
//! and the pieces are joined with single blank lines. A hash with no file is reported and left
//! out rather than failing the whole reconstruction.

use crate::divider::{self, Divider};
use crate::error::{require_file, Error, Result};
use crate::store::SectionStore;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One hash listed in an anchor's reference block.
pub struct Reference {
    /// Uppercased hash.
    pub hash: String,
    /// The reference line as written.
    pub original_line: String,
    /// 1-based line number within the anchor.
    pub line_number: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// An anchor document separated into its own content and its references.
pub struct ReferenceBlock {
    /// Trimmed content preceding the reference block.
    pub base_content: String,
    /// References in the order they appear.
    pub references: Vec<Reference>,
}

#[must_use]
/// Separate an anchor document's base content from its trailing references.
///
/// Only the contiguous run of hash-carrying divider lines at the end of the document (trailing
/// blank lines aside) counts as the reference block. A line such as `---: 2024` further up is
/// anchor text and stays in the base content. Without a block, the whole trimmed document is
/// the base content.
pub fn extract_references(content: &str) -> ReferenceBlock {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let mut start = end;
    while start > 0 && Divider::parse(lines[start - 1]).is_some_and(|d| d.hash().is_some()) {
        start -= 1;
    }

    let references: Vec<Reference> = lines[start..end]
        .iter()
        .zip(start + 1..)
        .filter_map(|(line, line_number)| {
            let hash = Divider::parse(line)?.hash()?.to_string();
            Some(Reference {
                hash,
                original_line: (*line).to_string(),
                line_number,
            })
        })
        .collect();

    if references.is_empty() {
        return ReferenceBlock {
            base_content: content.trim().to_string(),
            references,
        };
    }

    while start > 0 && lines[start - 1].trim().is_empty() {
        start -= 1;
    }
    ReferenceBlock {
        base_content: lines[..start].join("\n").trim().to_string(),
        references,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A reference whose section file exists.
pub struct Found {
    /// The reference.
    pub reference: Reference,
    /// Section file it resolved to.
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A reference whose section file does not exist.
pub struct Missing {
    /// The reference.
    pub reference: Reference,
    /// Where the section file was expected.
    pub expected_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A resolved section with its divider collapsed.
pub struct ResolvedSection {
    /// The reference.
    pub reference: Reference,
    /// Section file it was read from.
    pub path: PathBuf,
    /// Section text with a bare leading divider.
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A rebuilt document and how each reference fared.
pub struct Reconstruction {
    /// The rebuilt document.
    pub content: String,
    /// Content of the anchor before its reference block.
    pub base_content: String,
    /// Sections included, in reference order.
    pub resolved: Vec<ResolvedSection>,
    /// References left out because their file is absent.
    pub missing: Vec<Missing>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Found and missing partitions of an anchor's references.
pub struct ReferenceValidation {
    /// References with a section file.
    pub found: Vec<Found>,
    /// References without one.
    pub missing: Vec<Missing>,
}

impl ReferenceValidation {
    #[must_use]
    /// Whether every reference resolves.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Read-only summary of an anchor file.
pub struct AnchorAnalysis {
    /// The anchor analysed.
    pub anchor: PathBuf,
    /// Directory searched for section files.
    pub search_dir: PathBuf,
    /// Number of reference lines.
    pub total_references: usize,
    /// References with a section file.
    pub found: usize,
    /// References without one.
    pub missing: usize,
    /// Hashes of the missing references.
    pub missing_hashes: Vec<String>,
    /// Lines of base content.
    pub base_content_lines: usize,
    /// Bytes of base content.
    pub base_content_bytes: usize,
}

#[derive(Clone, Debug)]
/// Rebuilds documents from anchor files.
pub struct DocumentReconstructor {
    extension: String,
    search_dir: Option<PathBuf>,
}

impl DocumentReconstructor {
    #[must_use]
    /// A reconstructor resolving `<HASH><extension>` next to each anchor.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            search_dir: None,
        }
    }

    #[must_use]
    /// Resolve section files in `dir` instead of the anchor's directory.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Rebuild the document anchored at `anchor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the anchor or a resolved section file cannot be read. Missing
    /// section files are recorded in [`Reconstruction::missing`] instead.
    pub fn reconstruct_document(&self, anchor: &Path) -> Result<Reconstruction> {
        let block = extract_references(&read_text(anchor)?);
        if block.references.is_empty() {
            debug!(anchor = ?anchor, "No references, returning anchor as-is");
            return Ok(Reconstruction {
                content: block.base_content.clone(),
                base_content: block.base_content,
                resolved: Vec::new(),
                missing: Vec::new(),
            });
        }

        let validation = self.partition(anchor, block.references)?;
        let mut resolved = Vec::with_capacity(validation.found.len());
        for found in validation.found {
            let raw = read_text(&found.path)?;
            resolved.push(ResolvedSection {
                content: divider::strip_annotation(&raw).trim().to_string(),
                reference: found.reference,
                path: found.path,
            });
        }

        let parts: Vec<&str> = std::iter::once(block.base_content.as_str())
            .filter(|base| !base.is_empty())
            .chain(resolved.iter().map(|section| section.content.as_str()))
            .collect();
        let content = parts.join("\n\n");

        info!(
            anchor = ?anchor,
            resolved = resolved.len(),
            missing = validation.missing.len(),
            "Reconstructed document"
        );
        Ok(Reconstruction {
            content,
            base_content: block.base_content,
            resolved,
            missing: validation.missing,
        })
    }

    /// Rebuild the document anchored at `anchor` and write it to `output`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`DocumentReconstructor::reconstruct_document`], or a filesystem
    /// error if `output` cannot be written.
    pub fn write_reconstruction(&self, anchor: &Path, output: &Path) -> Result<Reconstruction> {
        let reconstruction = self.reconstruct_document(anchor)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(e, parent))?;
        }
        let mut text = reconstruction.content.clone();
        if !text.is_empty() {
            text.push('\n');
        }
        fs::write(output, text).map_err(|e| Error::from_io(e, output))?;
        Ok(reconstruction)
    }

    /// Check which of the anchor's references resolve, without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the anchor cannot be read.
    pub fn validate_references(&self, anchor: &Path) -> Result<ReferenceValidation> {
        let block = extract_references(&read_text(anchor)?);
        self.partition(anchor, block.references)
    }

    /// Summarise the anchor's references and base content, without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the anchor cannot be read.
    pub fn analyze_file(&self, anchor: &Path) -> Result<AnchorAnalysis> {
        let block = extract_references(&read_text(anchor)?);
        let total_references = block.references.len();
        let validation = self.partition(anchor, block.references)?;
        Ok(AnchorAnalysis {
            anchor: anchor.to_path_buf(),
            search_dir: self.search_dir_for(anchor),
            total_references,
            found: validation.found.len(),
            missing: validation.missing.len(),
            missing_hashes: validation
                .missing
                .iter()
                .map(|missing| missing.reference.hash.clone())
                .collect(),
            base_content_lines: if block.base_content.is_empty() {
                0
            } else {
                block.base_content.lines().count()
            },
            base_content_bytes: block.base_content.len(),
        })
    }

    fn search_dir_for(&self, anchor: &Path) -> PathBuf {
        self.search_dir.clone().unwrap_or_else(|| {
            anchor
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }

    fn partition(&self, anchor: &Path, references: Vec<Reference>) -> Result<ReferenceValidation> {
        let store = SectionStore::new(self.search_dir_for(anchor), self.extension.as_str());
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for reference in references {
            match store.resolve_hash(&reference.hash) {
                Ok(path) => found.push(Found { reference, path }),
                Err(Error::NotFound { .. } | Error::InvalidInput(_)) => {
                    let expected_path = store.section_path(&reference.hash);
                    let err = Error::MissingReference {
                        hash: reference.hash.clone(),
                        path: expected_path.clone(),
                    };
                    warn!(anchor = ?anchor, line = reference.line_number, "{err}");
                    missing.push(Missing {
                        reference,
                        expected_path,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(ReferenceValidation { found, missing })
    }
}

fn read_text(path: &Path) -> Result<String> {
    require_file(path)?;
    fs::read_to_string(path).map_err(|e| Error::from_io(e, path))
}

#[cfg(test)]
#[path = "tests/reconstruct.rs"]
mod tests;
