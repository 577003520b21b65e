//! In-memory reference store
//!
//! Keeps every graph as a triple set under a read-write lock.
//! Enumerations stream through a bounded channel fed by a producer
//! thread: single producer, single consumer, and the producer drops
//! its cursor as soon as the consumer hangs up.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::thread;

use tracing::debug;

use chronograph_core::{Anchor, Error, Node, Object, Predicate, Result, Triple};

use crate::options::LookupOptions;
use crate::{Graph, Nodes, Objects, Predicates, Store, Triples};

/// Capacity of the channel between an enumeration producer and its
/// consumer.
const STREAM_BUFFER: usize = 128;

/// Applies the lookup options to one enumeration: the element cap
/// counts every emitted element, the time window constrains temporal
/// predicates only.
struct Checker {
    max: Option<usize>,
    emitted: usize,
    lower: Option<Anchor>,
    upper: Option<Anchor>,
}

impl Checker {
    fn new(lo: &LookupOptions) -> Self {
        Self {
            max: lo.max_elements,
            emitted: 0,
            lower: lo.lower_anchor,
            upper: lo.upper_anchor,
        }
    }

    fn exhausted(&self) -> bool {
        self.max.is_some_and(|m| self.emitted >= m)
    }

    fn check_and_update(&mut self, p: &Predicate) -> bool {
        if self.exhausted() {
            return false;
        }
        if p.is_temporal() {
            if let Ok(a) = p.time_anchor() {
                if self.lower.is_some_and(|l| *a < l) {
                    return false;
                }
                if self.upper.is_some_and(|u| *a > u) {
                    return false;
                }
            }
        }
        self.emitted += 1;
        true
    }
}

type TripleMap = HashMap<String, Triple>;

/// A graph held entirely in memory.
pub struct MemoryGraph {
    id: String,
    triples: Arc<RwLock<TripleMap>>,
}

impl MemoryGraph {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            triples: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, TripleMap>> {
        self.triples
            .write()
            .map_err(|_| Error::Internal(format!("poisoned lock on graph {}", self.id)))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, TripleMap>> {
        self.triples
            .read()
            .map_err(|_| Error::Internal(format!("poisoned lock on graph {}", self.id)))
    }

    /// Stream every triple accepted by `f` through a bounded channel.
    /// The producer thread holds a read lock for the duration of the
    /// enumeration and stops at the first failed send.
    fn stream<T, F>(&self, lo: &LookupOptions, f: F) -> Result<Box<dyn Iterator<Item = T> + Send>>
    where
        T: Send + 'static,
        F: Fn(&Triple) -> Option<T> + Send + 'static,
    {
        let triples = Arc::clone(&self.triples);
        let lo = lo.clone();
        let (tx, rx) = mpsc::sync_channel(STREAM_BUFFER);
        thread::spawn(move || {
            let guard = match triples.read() {
                Ok(g) => g,
                Err(_) => return,
            };
            let mut checker = Checker::new(&lo);
            for t in guard.values() {
                if checker.exhausted() {
                    break;
                }
                let Some(item) = f(t) else { continue };
                if !checker.check_and_update(t.p()) {
                    continue;
                }
                if tx.send(item).is_err() {
                    // Consumer stopped reading.
                    break;
                }
            }
        });
        Ok(Box::new(rx.into_iter()))
    }
}

impl Graph for MemoryGraph {
    fn id(&self) -> &str {
        &self.id
    }

    fn add_triples(&self, ts: &[Triple]) -> Result<()> {
        let mut guard = self.write()?;
        for t in ts {
            guard.insert(t.to_string(), t.clone());
        }
        debug!(graph = %self.id, count = ts.len(), "added triples");
        Ok(())
    }

    fn remove_triples(&self, ts: &[Triple]) -> Result<()> {
        let mut guard = self.write()?;
        for t in ts {
            guard.remove(&t.to_string());
        }
        debug!(graph = %self.id, count = ts.len(), "removed triples");
        Ok(())
    }

    fn exist(&self, t: &Triple) -> Result<bool> {
        Ok(self.read()?.contains_key(&t.to_string()))
    }

    fn triples(&self) -> Result<Triples> {
        self.stream(&LookupOptions::unbounded(), |t| Some(t.clone()))
    }

    fn triples_for_subject(&self, s: &Node, lo: &LookupOptions) -> Result<Triples> {
        let s = s.clone();
        self.stream(lo, move |t| (t.s() == &s).then(|| t.clone()))
    }

    fn triples_for_predicate(&self, p: &Predicate, lo: &LookupOptions) -> Result<Triples> {
        let p = p.clone();
        self.stream(lo, move |t| (t.p() == &p).then(|| t.clone()))
    }

    fn triples_for_object(&self, o: &Object, lo: &LookupOptions) -> Result<Triples> {
        let o = o.clone();
        self.stream(lo, move |t| (t.o() == &o).then(|| t.clone()))
    }

    fn triples_for_subject_and_predicate(
        &self,
        s: &Node,
        p: &Predicate,
        lo: &LookupOptions,
    ) -> Result<Triples> {
        let (s, p) = (s.clone(), p.clone());
        self.stream(lo, move |t| {
            (t.s() == &s && t.p() == &p).then(|| t.clone())
        })
    }

    fn triples_for_predicate_and_object(
        &self,
        p: &Predicate,
        o: &Object,
        lo: &LookupOptions,
    ) -> Result<Triples> {
        let (p, o) = (p.clone(), o.clone());
        self.stream(lo, move |t| {
            (t.p() == &p && t.o() == &o).then(|| t.clone())
        })
    }

    fn objects(&self, s: &Node, p: &Predicate, lo: &LookupOptions) -> Result<Objects> {
        let (s, p) = (s.clone(), p.clone());
        self.stream(lo, move |t| {
            (t.s() == &s && t.p() == &p).then(|| t.o().clone())
        })
    }

    fn subjects(&self, p: &Predicate, o: &Object, lo: &LookupOptions) -> Result<Nodes> {
        let (p, o) = (p.clone(), o.clone());
        self.stream(lo, move |t| {
            (t.p() == &p && t.o() == &o).then(|| t.s().clone())
        })
    }

    fn predicates_for_subject(&self, s: &Node, lo: &LookupOptions) -> Result<Predicates> {
        let s = s.clone();
        self.stream(lo, move |t| (t.s() == &s).then(|| t.p().clone()))
    }

    fn predicates_for_object(&self, o: &Object, lo: &LookupOptions) -> Result<Predicates> {
        let o = o.clone();
        self.stream(lo, move |t| (t.o() == &o).then(|| t.p().clone()))
    }

    fn predicates_for_subject_and_object(
        &self,
        s: &Node,
        o: &Object,
        lo: &LookupOptions,
    ) -> Result<Predicates> {
        let (s, o) = (s.clone(), o.clone());
        self.stream(lo, move |t| {
            (t.s() == &s && t.o() == &o).then(|| t.p().clone())
        })
    }
}

/// An in-memory collection of named graphs.
#[derive(Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<String, Arc<MemoryGraph>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<MemoryGraph>>>> {
        self.graphs
            .write()
            .map_err(|_| Error::Internal("poisoned lock on graph registry".to_string()))
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        "VOLATILE"
    }

    fn new_graph(&self, id: &str) -> Result<Arc<dyn Graph>> {
        let mut guard = self.lock()?;
        if guard.contains_key(id) {
            return Err(Error::GraphExists(id.to_string()));
        }
        let g = Arc::new(MemoryGraph::new(id));
        guard.insert(id.to_string(), Arc::clone(&g));
        debug!(graph = id, "created graph");
        Ok(g)
    }

    fn graph(&self, id: &str) -> Result<Arc<dyn Graph>> {
        self.graphs
            .read()
            .map_err(|_| Error::Internal("poisoned lock on graph registry".to_string()))?
            .get(id)
            .map(|g| Arc::clone(g) as Arc<dyn Graph>)
            .ok_or_else(|| Error::GraphNotFound(id.to_string()))
    }

    fn delete_graph(&self, id: &str) -> Result<()> {
        let mut guard = self.lock()?;
        if guard.remove(id).is_none() {
            return Err(Error::GraphNotFound(id.to_string()));
        }
        debug!(graph = id, "deleted graph");
        Ok(())
    }
}
