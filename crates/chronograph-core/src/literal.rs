//! Typed literal values
//!
//! Literals are typed scalars printed as `"value"^^type:<name>`. The
//! builder validates the textual value against the declared type; a
//! mismatch fails typed-literal validation. The default builder is
//! process-wide configuration, initialized once and read-only after.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The scalar types a literal can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Bool,
    Int64,
    Float64,
    Text,
    Blob,
}

impl LiteralKind {
    /// The name used in the textual form.
    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Bool => "bool",
            LiteralKind::Int64 => "int64",
            LiteralKind::Float64 => "float64",
            LiteralKind::Text => "text",
            LiteralKind::Blob => "blob",
        }
    }
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Literal {
    /// The declared type of the literal.
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::Int64(_) => LiteralKind::Int64,
            Literal::Float64(_) => LiteralKind::Float64,
            Literal::Text(_) => LiteralKind::Text,
            Literal::Blob(_) => LiteralKind::Blob,
        }
    }

    fn value_text(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Int64(i) => i.to_string(),
            Literal::Float64(f) => f.to_string(),
            Literal::Text(s) => s.clone(),
            Literal::Blob(bytes) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"^^type:{}", self.value_text(), self.kind())
    }
}

impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.value_text().hash(state);
    }
}

impl Eq for Literal {}

/// Builds literals from their textual form, validating the value
/// against the registered types.
#[derive(Debug, Clone)]
pub struct Builder {
    types: HashMap<&'static str, LiteralKind>,
}

impl Builder {
    /// Create a builder with all the base types registered.
    pub fn new() -> Self {
        let mut types = HashMap::new();
        for kind in [
            LiteralKind::Bool,
            LiteralKind::Int64,
            LiteralKind::Float64,
            LiteralKind::Text,
            LiteralKind::Blob,
        ] {
            types.insert(kind.name(), kind);
        }
        Self { types }
    }

    /// Look up a registered type by name.
    pub fn kind_for(&self, name: &str) -> Result<LiteralKind> {
        self.types.get(name).copied().ok_or_else(|| {
            Error::Semantic(format!("unknown literal type {name:?}"))
        })
    }

    /// Build a literal of the given type from its textual value.
    pub fn build(&self, kind: LiteralKind, value: &str) -> Result<Literal> {
        let mismatch = || Error::TypeMismatch {
            expected: kind.name().to_string(),
            found: format!("{value:?}"),
        };
        match kind {
            LiteralKind::Bool => match value {
                "true" => Ok(Literal::Bool(true)),
                "false" => Ok(Literal::Bool(false)),
                _ => Err(mismatch()),
            },
            LiteralKind::Int64 => value
                .parse::<i64>()
                .map(Literal::Int64)
                .map_err(|_| mismatch()),
            LiteralKind::Float64 => value
                .parse::<f64>()
                .map(Literal::Float64)
                .map_err(|_| mismatch()),
            LiteralKind::Text => Ok(Literal::Text(value.to_string())),
            LiteralKind::Blob => {
                if value.len() % 2 != 0 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(mismatch());
                }
                let bytes = (0..value.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&value[i..i + 2], 16))
                    .collect::<std::result::Result<Vec<u8>, _>>()
                    .map_err(|_| mismatch())?;
                Ok(Literal::Blob(bytes))
            }
        }
    }

    /// Parse the textual form `"value"^^type:<name>`.
    pub fn parse(&self, s: &str) -> Result<Literal> {
        let raw = s.trim();
        if !raw.starts_with('"') {
            return Err(Error::Semantic(format!(
                "cannot parse literal {raw:?}: missing leading '\"'"
            )));
        }
        let idx = raw.rfind("\"^^type:").ok_or_else(|| {
            Error::Semantic(format!(
                "cannot parse literal {raw:?}: missing type declaration"
            ))
        })?;
        let value = &raw[1..idx];
        let kind = self.kind_for(&raw[idx + 8..])?;
        self.build(kind, value)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_BUILDER: Lazy<Builder> = Lazy::new(Builder::new);

/// The process-wide default literal builder.
pub fn default_builder() -> &'static Builder {
    &DEFAULT_BUILDER
}
