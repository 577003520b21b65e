//! Predicate values
//!
//! A predicate is either immutable (timeless) or temporal, carrying a
//! time anchor with nanosecond resolution and a timezone offset. The
//! textual forms are `"id"@[]` and `"id"@[RFC3339Nano]`.

use serde::{Deserialize, Serialize};

use crate::time::{format_anchor, parse_anchor, Anchor};
use crate::{Error, Result};

/// The two kinds of predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    /// Always valid, not bound to any time anchor.
    Immutable,
    /// Anchored in the time continuum.
    Temporal,
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredicateKind::Immutable => write!(f, "IMMUTABLE"),
            PredicateKind::Temporal => write!(f, "TEMPORAL"),
        }
    }
}

/// A predicate of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    id: String,
    anchor: Option<Anchor>,
}

impl Predicate {
    /// Create a new immutable predicate.
    pub fn immutable<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Semantic(
                "cannot create a predicate with an empty id".to_string(),
            ));
        }
        Ok(Self { id, anchor: None })
    }

    /// Create a new temporal predicate.
    pub fn temporal<S: Into<String>>(id: S, anchor: Anchor) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Semantic(
                "cannot create a predicate with an empty id".to_string(),
            ));
        }
        Ok(Self {
            id,
            anchor: Some(anchor),
        })
    }

    /// Parse the textual form `"id"@[]` or `"id"@[RFC3339Nano]`.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(Error::Semantic(
                "cannot parse a predicate from an empty string".to_string(),
            ));
        }
        if !raw.starts_with('"') {
            return Err(Error::Semantic(format!(
                "cannot parse predicate {raw:?}: missing leading '\"'"
            )));
        }
        let idx = raw.find("\"@[").ok_or_else(|| {
            Error::Semantic(format!(
                "cannot parse predicate {raw:?}: missing anchor definition"
            ))
        })?;
        if !raw.ends_with(']') {
            return Err(Error::Semantic(format!(
                "cannot parse predicate {raw:?}: missing trailing ']'"
            )));
        }
        let id = &raw[1..idx];
        let mut ta = &raw[idx + 3..raw.len() - 1];
        if ta.is_empty() {
            return Self::immutable(id);
        }
        // The anchor may be quoted.
        ta = ta.strip_prefix('"').unwrap_or(ta);
        ta = ta.strip_suffix('"').unwrap_or(ta);
        Self::temporal(id, parse_anchor(ta)?)
    }

    /// The id of the predicate.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The kind of the predicate.
    pub fn kind(&self) -> PredicateKind {
        if self.anchor.is_none() {
            PredicateKind::Immutable
        } else {
            PredicateKind::Temporal
        }
    }

    /// True for temporal predicates.
    pub fn is_temporal(&self) -> bool {
        self.anchor.is_some()
    }

    /// The time anchor of a temporal predicate. Requesting the anchor
    /// of an immutable predicate is a hard error.
    pub fn time_anchor(&self) -> Result<&Anchor> {
        self.anchor.as_ref().ok_or_else(|| {
            Error::Semantic(format!(
                "cannot retrieve the time anchor of immutable predicate {self}"
            ))
        })
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.anchor {
            None => write!(f, "\"{}\"@[]", self.id),
            Some(t) => write!(f, "\"{}\"@[{}]", self.id, format_anchor(t)),
        }
    }
}
