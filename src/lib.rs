//! splitmark: content-addressed section splitting and reconstruction for text documents.
//!
//! A document is divided at bare `---:` lines. The first section keeps the document's name and
//! becomes the anchor; every other section is written to a file named by the truncated hash of
//! its content, with its divider rewritten to carry that hash and a timestamp. The anchor lists
//! the sections it owns in a trailing block of `---: <HASH>` lines, from which the document can
//! be joined back together.
//!
//! Small inputs are read whole; inputs at or above the configured threshold are scanned line by
//! line. Both strategies share one boundary-detection routine and give identical results.
#![allow(clippy::multiple_crate_versions)]

pub mod boundary;
pub mod config;
pub mod divider;
pub mod error;
pub mod hasher;
pub mod indexer;
pub mod lines;
pub mod processor;
pub mod reconstruct;
pub mod section;
pub mod splitter;
pub mod store;
pub mod timestamp;
pub mod writer;

pub use error::{Error, Result};
