//! Time anchor parsing and rendering
//!
//! Anchors are RFC 3339 timestamps with nanosecond precision and an
//! explicit offset (`Z` accepted for UTC). The offset is preserved so
//! that rendering round-trips with parsing.

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::{Error, Result};

/// The instant a temporal predicate is anchored to.
pub type Anchor = DateTime<FixedOffset>;

/// Parse an RFC 3339 time anchor.
pub fn parse_anchor(s: &str) -> Result<Anchor> {
    DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| Error::InvalidTimeAnchor(format!("{s:?}: {e}")))
}

/// Render a time anchor in RFC 3339 with minimal subsecond digits.
pub fn format_anchor(t: &Anchor) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
