//! Storage contract for chronograph
//!
//! The query planner depends only on the `Store` and `Graph` traits
//! defined here. Every enumerating operation returns a lazy stream of
//! its element type; producers stop and release their cursor when the
//! consumer hangs up early.

pub mod memory;
pub mod options;

use std::sync::Arc;

use chronograph_core::{Node, Object, Predicate, Result, Triple};

pub use memory::MemoryStore;
pub use options::LookupOptions;

/// Lazy stream of triples.
pub type Triples = Box<dyn Iterator<Item = Triple> + Send>;

/// Lazy stream of objects.
pub type Objects = Box<dyn Iterator<Item = Object> + Send>;

/// Lazy stream of subject nodes.
pub type Nodes = Box<dyn Iterator<Item = Node> + Send>;

/// Lazy stream of predicates.
pub type Predicates = Box<dyn Iterator<Item = Predicate> + Send>;

/// A named, unordered set of triples. Implementations must support
/// concurrent readers; each mutating call is internally atomic.
pub trait Graph: Send + Sync {
    /// The name of the graph.
    fn id(&self) -> &str;

    /// Add the given triples to the graph.
    fn add_triples(&self, ts: &[Triple]) -> Result<()>;

    /// Remove the given triples from the graph.
    fn remove_triples(&self, ts: &[Triple]) -> Result<()>;

    /// True if the graph contains the triple.
    fn exist(&self, t: &Triple) -> Result<bool>;

    /// All triples in the graph.
    fn triples(&self) -> Result<Triples>;

    /// Triples with the given subject.
    fn triples_for_subject(&self, s: &Node, lo: &LookupOptions) -> Result<Triples>;

    /// Triples with the given predicate.
    fn triples_for_predicate(&self, p: &Predicate, lo: &LookupOptions) -> Result<Triples>;

    /// Triples with the given object.
    fn triples_for_object(&self, o: &Object, lo: &LookupOptions) -> Result<Triples>;

    /// Triples with the given subject and predicate.
    fn triples_for_subject_and_predicate(
        &self,
        s: &Node,
        p: &Predicate,
        lo: &LookupOptions,
    ) -> Result<Triples>;

    /// Triples with the given predicate and object.
    fn triples_for_predicate_and_object(
        &self,
        p: &Predicate,
        o: &Object,
        lo: &LookupOptions,
    ) -> Result<Triples>;

    /// Objects of triples with the given subject and predicate.
    fn objects(&self, s: &Node, p: &Predicate, lo: &LookupOptions) -> Result<Objects>;

    /// Subjects of triples with the given predicate and object.
    fn subjects(&self, p: &Predicate, o: &Object, lo: &LookupOptions) -> Result<Nodes>;

    /// Predicates of triples with the given subject.
    fn predicates_for_subject(&self, s: &Node, lo: &LookupOptions) -> Result<Predicates>;

    /// Predicates of triples with the given object.
    fn predicates_for_object(&self, o: &Object, lo: &LookupOptions) -> Result<Predicates>;

    /// Predicates of triples with the given subject and object.
    fn predicates_for_subject_and_object(
        &self,
        s: &Node,
        o: &Object,
        lo: &LookupOptions,
    ) -> Result<Predicates>;
}

/// A pluggable collection of named graphs.
pub trait Store: Send + Sync {
    /// A short name identifying the backend.
    fn name(&self) -> &str;

    /// Create a new graph. Fails if the name is taken.
    fn new_graph(&self, id: &str) -> Result<Arc<dyn Graph>>;

    /// Get an existing graph. Fails if it does not exist.
    fn graph(&self, id: &str) -> Result<Arc<dyn Graph>>;

    /// Destroy an existing graph. Fails if it does not exist.
    fn delete_graph(&self, id: &str) -> Result<()>;
}
