//! Node values of the temporal graph
//!
//! A node is identified by a hierarchical type path and an opaque id,
//! printed as `/type<id>`. Nodes are immutable once constructed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Hierarchical node type, e.g. `/u` or `/city/district`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeType(String);

impl NodeType {
    /// Create a new node type from a path like `/user`.
    pub fn new(path: &str) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(Error::Semantic(format!(
                "node type {path:?} must start with '/'"
            )));
        }
        for component in path[1..].split('/') {
            if component.is_empty()
                || !component.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(Error::Semantic(format!(
                    "node type {path:?} contains invalid component {component:?}"
                )));
            }
        }
        Ok(Self(path.to_string()))
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the graph, identified by `(type, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    t: NodeType,
    id: NodeId,
}

impl Node {
    /// Create a node from an already validated type and id.
    pub fn new(t: NodeType, id: NodeId) -> Self {
        Self { t, id }
    }

    /// Create a fresh blank node of type `/_`.
    pub fn new_blank() -> Self {
        Self {
            t: NodeType("/_".to_string()),
            id: NodeId(Uuid::new_v4().simple().to_string()),
        }
    }

    /// Parse the textual form `/type<id>`.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if !raw.starts_with('/') {
            return Err(Error::Semantic(format!(
                "cannot parse node {raw:?}: missing leading '/'"
            )));
        }
        let open = raw.find('<').ok_or_else(|| {
            Error::Semantic(format!("cannot parse node {raw:?}: missing '<'"))
        })?;
        if !raw.ends_with('>') {
            return Err(Error::Semantic(format!(
                "cannot parse node {raw:?}: missing trailing '>'"
            )));
        }
        let t = NodeType::new(&raw[..open])?;
        let id = &raw[open + 1..raw.len() - 1];
        if id.is_empty() {
            return Err(Error::Semantic(format!(
                "cannot parse node {raw:?}: empty id"
            )));
        }
        Ok(Self {
            t,
            id: NodeId::new(id),
        })
    }

    /// The hierarchical type of the node.
    pub fn node_type(&self) -> &NodeType {
        &self.t
    }

    /// The id of the node.
    pub fn id(&self) -> &NodeId {
        &self.id
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{}>", self.t, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for s in ["/u<john>", "/_<foo>", "/city/district<soho>"] {
            let n = Node::parse(s).expect("valid node");
            assert_eq!(n.to_string(), s);
            assert_eq!(Node::parse(&n.to_string()).unwrap(), n);
        }
    }

    #[test]
    fn test_parse_accessors() {
        let n = Node::parse("/u<john>").unwrap();
        assert_eq!(n.node_type().as_str(), "/u");
        assert_eq!(n.id().as_str(), "john");
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["u<john>", "/u<john", "/u john", "/<john>", "/u<>", "/u/<x>"] {
            assert!(Node::parse(s).is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn test_blank_nodes_are_distinct() {
        let a = Node::new_blank();
        let b = Node::new_blank();
        assert_eq!(a.node_type().as_str(), "/_");
        assert_ne!(a, b);
    }
}
