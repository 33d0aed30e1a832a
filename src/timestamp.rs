//! Fixed-width timestamps embedded in annotated dividers.
//!
//! The textual form is `HH:MM:SS YYYY/MM/DD`, 24-hour and zero-padded. Timestamps are
//! rendered in local time, UTC, or a fixed UTC offset. Zone names that cannot be understood
//! fall back to local time so that a typo in configuration never blocks a split.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use tracing::warn;

/// `strftime` pattern for divider timestamps.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S %Y/%m/%d";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Time zone in which divider timestamps are rendered.
pub enum Zone {
    /// The host's local time zone.
    #[default]
    Local,
    /// Coordinated universal time.
    Utc,
    /// A fixed offset from UTC, such as `+05:30`.
    Fixed(FixedOffset),
}

impl Zone {
    #[must_use]
    /// Interpret a configured zone name, falling back to [`Zone::Local`] when unrecognised.
    ///
    /// Accepts `local`, `utc`/`gmt`/`z` (any case) and offsets written `+HH:MM`, `-HHMM` or `+HH`.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "local" => Self::Local,
            "utc" | "gmt" | "z" | "etc/utc" => Self::Utc,
            _ => parse_offset(trimmed).map_or_else(
                || {
                    warn!(zone = trimmed, "Unrecognised timezone, using local time");
                    Self::Local
                },
                Self::Fixed,
            ),
        }
    }

    #[must_use]
    /// Render an instant in this zone.
    pub fn format(self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Local => instant
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            Self::Utc => instant.format(TIMESTAMP_FORMAT).to_string(),
            Self::Fixed(offset) => instant
                .with_timezone(&offset)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        }
    }

    #[must_use]
    /// Render the current instant in this zone.
    pub fn now(self) -> String {
        self.format(Utc::now())
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (
            digits[..2].parse::<i32>().ok()?,
            digits[2..].parse::<i32>().ok()?,
        ),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a divider timestamp back into a naive wall-clock time.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `text` is not in `HH:MM:SS YYYY/MM/DD` form.
pub fn parse(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("bad timestamp {text:?}: {e}")))
}

#[cfg(test)]
#[path = "tests/timestamp.rs"]
mod tests;
