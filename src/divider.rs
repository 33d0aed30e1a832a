//! The `---:` divider grammar.
//!
//! A divider is a whole line. In its bare form it only marks a section boundary; once a section
//! has been written its divider is rewritten to carry the content hash and a timestamp, and the
//! anchor file lists the remaining sections with hash-only dividers.
//!
//! ```text
//! ---:
//! ---: 3FA9C01B 14:02:11 2024/05/01
//! ---: 3FA9C01B
//! ```

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Literal token that starts every divider line.
pub const DIVIDER_TOKEN: &str = "---:";

static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^---:\s*$").expect("bare divider pattern is valid"));

static ANNOTATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^---:\s+([A-F0-9]+)(?:\s+(\d{2}:\d{2}:\d{2}\s+\d{4}/\d{2}/\d{2}))?$")
        .expect("annotated divider pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
/// A parsed divider line.
pub enum Divider {
    /// `---:` with nothing after it.
    Bare,
    /// `---: <HASH>`, the form used in reference blocks.
    Hashed {
        /// Uppercased content hash.
        hash: String,
    },
    /// `---: <HASH> <timestamp>`, the canonical form of a written section's own divider.
    Annotated {
        /// Uppercased content hash.
        hash: String,
        /// Timestamp text exactly as it appeared.
        timestamp: String,
    },
}

impl Divider {
    #[must_use]
    /// Parse a single line, returning `None` if it is not a divider.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\r');
        if BARE.is_match(line) {
            return Some(Self::Bare);
        }
        let captures = ANNOTATED.captures(line)?;
        let hash = captures[1].to_ascii_uppercase();
        Some(match captures.get(2) {
            Some(timestamp) => Self::Annotated {
                hash,
                timestamp: timestamp.as_str().to_string(),
            },
            None => Self::Hashed { hash },
        })
    }

    #[must_use]
    /// The hash carried by this divider, if any.
    pub fn hash(&self) -> Option<&str> {
        match self {
            Self::Bare => None,
            Self::Hashed { hash } | Self::Annotated { hash, .. } => Some(hash),
        }
    }
}

#[must_use]
/// Whether `line` is a bare section boundary.
pub fn is_bare(line: &str) -> bool {
    BARE.is_match(line)
}

#[must_use]
/// Whether `line` is a divider carrying a hash, with or without a timestamp.
pub fn is_annotated(line: &str) -> bool {
    ANNOTATED.is_match(line.trim_end_matches('\r'))
}

#[must_use]
/// Render the canonical written form of a section's own divider.
pub fn annotated(hash: &str, timestamp: &str) -> String {
    format!("{DIVIDER_TOKEN} {hash} {timestamp}")
}

#[must_use]
/// Render a reference-block line.
pub fn reference(hash: &str) -> String {
    format!("{DIVIDER_TOKEN} {hash}")
}

#[must_use]
/// Collapse an annotated divider on the first line of `content` back to a bare one.
///
/// Content whose first line is not an annotated divider is returned untouched.
pub fn strip_annotation(content: &str) -> Cow<'_, str> {
    let (first, rest) = match content.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (content, None),
    };
    if !is_annotated(first) {
        return Cow::Borrowed(content);
    }
    match rest {
        Some(rest) => Cow::Owned(format!("{DIVIDER_TOKEN}\n{rest}")),
        None => Cow::Borrowed(DIVIDER_TOKEN),
    }
}

#[cfg(test)]
#[path = "tests/divider.rs"]
mod tests;
