//! Lookup options pushed down to storage enumerations

use chronograph_core::Anchor;

/// Bounds a storage enumeration: an optional element cap and an
/// optional time window. The window applies to temporal predicates
/// only; immutable predicates always pass time filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupOptions {
    /// Maximum number of elements the enumeration may yield.
    pub max_elements: Option<usize>,

    /// Earliest admissible time anchor.
    pub lower_anchor: Option<Anchor>,

    /// Latest admissible time anchor.
    pub upper_anchor: Option<Anchor>,
}

impl LookupOptions {
    /// Options that bound nothing.
    pub fn unbounded() -> Self {
        Self::default()
    }
}
