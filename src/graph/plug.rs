use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a node in the host graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(pub String);

impl NodeHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Address one attribute of this node.
    pub fn plug(&self, attribute: impl Into<String>) -> Plug {
        Plug::new(self.0.clone(), attribute)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully qualified attribute address: `node.attribute[index].child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Plug {
    pub node: String,
    pub attribute: String,
}

impl Plug {
    pub fn new(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: attribute.into(),
        }
    }

    /// Split `node.attribute...` on the first dot. Both halves must be non-empty.
    pub fn parse(path: &str) -> Option<Self> {
        let (node, attribute) = path.split_once('.')?;
        if node.is_empty() || attribute.is_empty() {
            return None;
        }
        Some(Self::new(node, attribute))
    }

    pub fn node_handle(&self) -> NodeHandle {
        NodeHandle(self.node.clone())
    }

    /// True when `self` is `other` or one of its elements/children
    /// (`input[0]` and `input.x` are within `input`).
    pub fn is_within(&self, other: &Plug) -> bool {
        if self.node != other.node {
            return false;
        }
        match self.attribute.strip_prefix(other.attribute.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('[') || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attribute)
    }
}

impl From<Plug> for String {
    fn from(p: Plug) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Plug {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Plug::parse(&s).ok_or_else(|| format!("\"{s}\" is not a node.attribute path"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/plug.rs"]
mod tests;
