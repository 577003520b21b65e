//! Triples and their object position
//!
//! A triple is the `(subject, predicate, object)` atom of the graph.
//! The object position is a tagged sum over nodes, predicates, and
//! literals. Both are immutable after construction.

use serde::{Deserialize, Serialize};

use crate::literal::{Builder, Literal};
use crate::node::Node;
use crate::predicate::Predicate;
use crate::{Error, Result};

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    Node(Node),
    Predicate(Predicate),
    Literal(Literal),
}

impl Object {
    /// Parse an object, dispatching on its first character: `/` starts
    /// a node, `"…"@[…]` a predicate, `"…"^^type:…` a literal.
    pub fn parse(s: &str, builder: &Builder) -> Result<Self> {
        let raw = s.trim();
        match raw.chars().next() {
            Some('/') => Ok(Object::Node(Node::parse(raw)?)),
            Some('"') if raw.ends_with(']') && raw.contains("\"@[") => {
                Ok(Object::Predicate(Predicate::parse(raw)?))
            }
            Some('"') => Ok(Object::Literal(builder.parse(raw)?)),
            _ => Err(Error::Semantic(format!("cannot parse object {raw:?}"))),
        }
    }

    /// The node boxed in the object, if any.
    pub fn node(&self) -> Option<&Node> {
        match self {
            Object::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The predicate boxed in the object, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Object::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// The literal boxed in the object, if any.
    pub fn literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Node(n) => write!(f, "{n}"),
            Object::Predicate(p) => write!(f, "{p}"),
            Object::Literal(l) => write!(f, "{l}"),
        }
    }
}

impl From<Node> for Object {
    fn from(n: Node) -> Self {
        Object::Node(n)
    }
}

impl From<Predicate> for Object {
    fn from(p: Predicate) -> Self {
        Object::Predicate(p)
    }
}

impl From<Literal> for Object {
    fn from(l: Literal) -> Self {
        Object::Literal(l)
    }
}

/// A `(subject, predicate, object)` atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    s: Node,
    p: Predicate,
    o: Object,
}

impl Triple {
    /// Create a new triple.
    pub fn new(s: Node, p: Predicate, o: Object) -> Self {
        Self { s, p, o }
    }

    /// Parse the tab-separated textual form `S\tP\tO`.
    pub fn parse(s: &str, builder: &Builder) -> Result<Self> {
        let parts: Vec<&str> = s
            .split('\t')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 {
            return Err(Error::Semantic(format!(
                "cannot parse triple {s:?}: expected 3 tab-separated components, got {}",
                parts.len()
            )));
        }
        Ok(Self {
            s: Node::parse(parts[0])?,
            p: Predicate::parse(parts[1])?,
            o: Object::parse(parts[2], builder)?,
        })
    }

    /// The subject of the triple.
    pub fn s(&self) -> &Node {
        &self.s
    }

    /// The predicate of the triple.
    pub fn p(&self) -> &Predicate {
        &self.p
    }

    /// The object of the triple.
    pub fn o(&self) -> &Object {
        &self.o
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.s, self.p, self.o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::default_builder;

    #[test]
    fn test_object_dispatch() {
        let b = default_builder();
        assert!(Object::parse("/u<john>", b).unwrap().node().is_some());
        assert!(Object::parse("\"knows\"@[]", b).unwrap().predicate().is_some());
        assert!(Object::parse("\"1\"^^type:int64", b).unwrap().literal().is_some());
        assert!(Object::parse("?o", b).is_err());
    }

    #[test]
    fn test_triple_parse_round_trip() {
        let b = default_builder();
        for s in [
            "/u<john>\t\"knows\"@[]\t/u<mary>",
            "/u<john>\t\"met\"@[2015-07-19T13:12:04Z]\t\"nice\"^^type:text",
        ] {
            let t = Triple::parse(s, b).expect("valid triple");
            assert_eq!(Triple::parse(&t.to_string(), b).unwrap(), t);
        }
    }

    #[test]
    fn test_triple_accessors() {
        let t = Triple::parse("/u<john>\t\"knows\"@[]\t/u<mary>", default_builder()).unwrap();
        assert_eq!(t.s().to_string(), "/u<john>");
        assert_eq!(t.p().to_string(), "\"knows\"@[]");
        assert_eq!(t.o().to_string(), "/u<mary>");
    }

    #[test]
    fn test_triple_parse_invalid() {
        let b = default_builder();
        assert!(Triple::parse("/u<john>\t\"knows\"@[]", b).is_err());
        assert!(Triple::parse("", b).is_err());
    }
}
