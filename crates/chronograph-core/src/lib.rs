//! Core value types for chronograph
//!
//! Defines the atomic values of the temporal graph data model: nodes,
//! predicates, typed literals, objects, and triples, together with the
//! shared error type and time-anchor handling.

pub mod error;
pub mod literal;
pub mod node;
pub mod predicate;
pub mod time;
pub mod triple;

pub use error::{Error, Result};
pub use literal::{default_builder, Builder, Literal, LiteralKind};
pub use node::{Node, NodeId, NodeType};
pub use predicate::{Predicate, PredicateKind};
pub use time::{format_anchor, parse_anchor, Anchor};
pub use triple::{Object, Triple};
