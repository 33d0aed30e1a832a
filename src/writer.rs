//! Persisting sections as content-addressed files.
//!
//! Every file is planned before anything is written: hashes, names and final bodies are computed
//! up front, section files are written next, and the anchor is written last, exactly once, with
//! its reference block already in place. A crash can therefore leave an anchor missing but never
//! an anchor without references, and re-running a split never stacks a second reference block.

use crate::config::Config;
use crate::divider;
use crate::error::{Error, Result};
use crate::hasher::{ContentHash, ContentHasher};
use crate::reconstruct;
use crate::section::Section;
use crate::store::SectionStore;
use crate::timestamp::Zone;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
/// Where and how a batch of sections is written.
pub struct WriteOptions {
    /// Directory receiving every file.
    pub output_dir: PathBuf,
    /// Base name of the source document, used for the anchor file.
    pub source_stem: String,
    /// Extension for every file, including the dot.
    pub extension: String,
    /// Replace existing files instead of skipping them.
    pub overwrite: bool,
    /// Append a reference block to the anchor.
    pub references: bool,
    /// Stamp the whole batch with one timestamp instead of one per section.
    pub shared_timestamp: bool,
    /// Zone for divider timestamps.
    pub zone: Zone,
}

impl WriteOptions {
    /// Options for splitting `source` into `output_dir` under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `source` has no file name to name the anchor after, or
    /// if the anchor would land on `source` itself.
    pub fn from_config(config: &Config, source: &Path, output_dir: &Path) -> Result<Self> {
        let source_stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                Error::InvalidInput(format!("{} has no usable file name", source.display()))
            })?
            .to_string();
        let options = Self {
            output_dir: output_dir.to_path_buf(),
            source_stem,
            extension: config.extension(),
            overwrite: config.overwrite,
            references: config.references,
            shared_timestamp: config.shared_timestamp,
            zone: config.zone(),
        };
        let anchor = options.anchor_path();
        if same_file(&anchor, source) {
            return Err(Error::InvalidInput(format!(
                "anchor {} would replace the source document; choose another output directory",
                anchor.display()
            )));
        }
        Ok(options)
    }

    #[must_use]
    /// The output directory as a store, with this source's anchor.
    pub fn store(&self) -> SectionStore {
        SectionStore::new(&self.output_dir, &self.extension).with_anchor(&self.source_stem)
    }

    #[must_use]
    /// Where the anchor file is written.
    pub fn anchor_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}{}", self.source_stem, self.extension))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Why a file was left as it was.
pub enum SkipReason {
    /// The file exists and overwriting is disabled.
    FileExists,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Outcome of writing one file.
pub enum WriteStatus {
    /// The file was written.
    Written,
    /// The file was deliberately not written.
    Skipped {
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Writing failed; the batch continued.
    Failed {
        /// Error text.
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Record of one planned file.
pub struct WriteResult {
    /// Section written, or `None` for an anchor holding only references.
    pub index: Option<usize>,
    /// Content hash of the section (of the reference block for a references-only anchor).
    pub hash: ContentHash,
    /// File name within the output directory.
    pub file_name: String,
    /// Full path of the file.
    pub path: PathBuf,
    /// Whether this is the anchor file.
    pub is_anchor: bool,
    /// What happened.
    #[serde(flatten)]
    pub status: WriteStatus,
    /// Bytes written, zero unless the file was written.
    pub bytes: u64,
}

impl WriteResult {
    #[must_use]
    /// Whether the file was written.
    pub fn is_written(&self) -> bool {
        self.status == WriteStatus::Written
    }

    #[must_use]
    /// Whether the file is present with this content hash after the batch.
    pub fn is_available(&self) -> bool {
        matches!(
            self.status,
            WriteStatus::Written
                | WriteStatus::Skipped {
                    reason: SkipReason::FileExists
                }
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
/// Counts over a batch of [`WriteResult`]s.
pub struct WriteSummary {
    /// Files written.
    pub written: usize,
    /// Files skipped.
    pub skipped: usize,
    /// Files that failed.
    pub failed: usize,
    /// Bytes written in total.
    pub total_bytes: u64,
}

impl WriteSummary {
    #[must_use]
    /// Tally a batch.
    pub fn from_results(results: &[WriteResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                WriteStatus::Written => summary.written += 1,
                WriteStatus::Skipped { .. } => summary.skipped += 1,
                WriteStatus::Failed { .. } => summary.failed += 1,
            }
            summary.total_bytes += result.bytes;
            summary
        })
    }
}

struct Planned {
    index: Option<usize>,
    hash: ContentHash,
    file_name: String,
    body: String,
}

#[derive(Clone, Copy, Debug, Default)]
/// Writes sections into a [`SectionStore`].
pub struct SectionWriter {
    hasher: ContentHasher,
}

impl SectionWriter {
    #[must_use]
    /// A writer naming files with `hasher`.
    pub fn new(hasher: ContentHasher) -> Self {
        Self { hasher }
    }

    /// Write `sections` as files under `options.output_dir`.
    ///
    /// The first section becomes the anchor, named after the source, unless it opens with a
    /// divider; every other section is named by its hash and has its divider rewritten to
    /// `---: <HASH> <timestamp>`. When references are enabled the anchor ends with one
    /// `---: <HASH>` line per section file present after the batch, in section order: sections
    /// written now and sections skipped because their file already exists are both listed, so a
    /// re-run over existing output references the same set. Failed writes are left out. If no
    /// section qualifies as anchor, an anchor holding only the reference block is written.
    ///
    /// An anchor section that already ends in a reference block (a re-split of earlier output)
    /// has only that trailing block replaced; the rest of its text is kept as is.
    ///
    /// Existing files are skipped unless overwriting is enabled, and a failed write is recorded
    /// without stopping the batch.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error only if the output directory cannot be created.
    pub fn write_sections(
        &self,
        sections: &[Section],
        options: &WriteOptions,
    ) -> Result<Vec<WriteResult>> {
        let store = options.store();
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        store.ensure_root()?;

        let shared = options.shared_timestamp.then(|| options.zone.now());
        let mut anchor_section = None;
        let mut planned = Vec::with_capacity(sections.len());
        for section in sections {
            let hash = section.hash(&self.hasher);
            if section.is_anchor_candidate() {
                anchor_section = Some((section, hash));
                continue;
            }
            let timestamp = shared.clone().unwrap_or_else(|| options.zone.now());
            planned.push(Planned {
                index: Some(section.index),
                file_name: store.section_name(hash.as_str()),
                body: annotate(section, &hash, &timestamp),
                hash,
            });
        }

        let mut results: Vec<WriteResult> = planned
            .into_iter()
            .map(|plan| write_file(&store, plan, false, options.overwrite))
            .collect();

        let references: Vec<String> = if options.references {
            results
                .iter()
                .filter(|result| result.is_available())
                .map(|result| divider::reference(result.hash.as_str()))
                .collect()
        } else {
            Vec::new()
        };

        let anchor = match anchor_section {
            Some((section, hash)) => Some(Planned {
                index: Some(section.index),
                file_name: store.anchor_name(&options.source_stem),
                body: with_references(&section.content, &references),
                hash,
            }),
            None if !references.is_empty() => {
                warn!(
                    source = %options.source_stem,
                    "First section opens with a divider; writing a references-only anchor"
                );
                let body = with_references("", &references);
                Some(Planned {
                    index: None,
                    file_name: store.anchor_name(&options.source_stem),
                    hash: self.hasher.hash(&body),
                    body,
                })
            }
            None => None,
        };
        if let Some(anchor) = anchor {
            let result = write_file(&store, anchor, true, options.overwrite);
            if result.index == Some(0) {
                results.insert(0, result);
            } else {
                results.push(result);
            }
        }

        let summary = WriteSummary::from_results(&results);
        info!(
            output = ?store.root(),
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            bytes = summary.total_bytes,
            "Wrote sections"
        );
        Ok(results)
    }
}

fn write_file(store: &SectionStore, plan: Planned, is_anchor: bool, overwrite: bool) -> WriteResult {
    let path = store.root().join(&plan.file_name);
    let (status, bytes) = if path.exists() && !overwrite {
        debug!(path = ?path, "File exists, skipping");
        (
            WriteStatus::Skipped {
                reason: SkipReason::FileExists,
            },
            0,
        )
    } else {
        match fs::write(&path, &plan.body) {
            Ok(()) => {
                debug!(path = ?path, hash = %plan.hash, anchor = is_anchor, "Wrote section");
                (WriteStatus::Written, plan.body.len() as u64)
            }
            Err(e) => {
                let err = Error::from_io(e, &path);
                warn!(path = ?path, error = %err, "Failed to write section");
                (
                    WriteStatus::Failed {
                        reason: err.to_string(),
                    },
                    0,
                )
            }
        }
    };
    WriteResult {
        index: plan.index,
        hash: plan.hash,
        file_name: plan.file_name,
        path,
        is_anchor,
        status,
        bytes,
    }
}

/// Whether both paths exist and name the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replace a section's own divider (always its first line) with the annotated form.
fn annotate(section: &Section, hash: &ContentHash, timestamp: &str) -> String {
    if !section.has_divider {
        return section.content.clone();
    }
    let rest = section.content.split_once('\n').map(|(_, rest)| rest);
    let line = divider::annotated(hash.as_str(), timestamp);
    match rest {
        Some(rest) => format!("{line}\n{rest}"),
        None => line,
    }
}

/// Anchor body: its content, minus any trailing reference block it already carried, then the new
/// block.
fn with_references(content: &str, references: &[String]) -> String {
    let existing = reconstruct::extract_references(content);
    let base = if existing.references.is_empty() {
        content
    } else {
        existing.base_content.as_str()
    };
    if references.is_empty() {
        return base.to_string();
    }
    let block = references.join("\n");
    let base = base.trim_end();
    if base.is_empty() {
        format!("{block}\n")
    } else {
        format!("{base}\n\n{block}\n")
    }
}

#[cfg(test)]
#[path = "tests/writer.rs"]
mod tests;
