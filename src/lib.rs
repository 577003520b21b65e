//! chronograph - temporal graph query engine
//!
//! This is the main library crate that re-exports all chronograph
//! components.

pub use chronograph_core as core;
pub use chronograph_query as query;
pub use chronograph_storage as storage;

// Re-export commonly used types
pub use chronograph_core::{
    default_builder, Anchor, Builder, Error, Literal, LiteralKind, Node, NodeId, NodeType,
    Object, Predicate, PredicateKind, Result, Triple,
};

pub use chronograph_query::{compile, execute, run, Cell, Row, Statement, StatementKind, Table};

pub use chronograph_storage::{Graph, LookupOptions, MemoryStore, Store};
