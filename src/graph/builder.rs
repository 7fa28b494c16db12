use crate::graph::plug::{NodeHandle, Plug};
use crate::graph::primitives::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An attribute value as the host stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Double(f64),
    /// Distance-typed scalar.
    DoubleLinear(f64),
    Int(i64),
    Bool(bool),
    String(String),
    Double3([f64; 3]),
}

/// The host's attribute type, without the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Double,
    DoubleLinear,
    Int,
    Bool,
    String,
    Double3,
}

impl Value {
    pub fn kind(&self) -> AttrKind {
        match self {
            Value::Double(_) => AttrKind::Double,
            Value::DoubleLinear(_) => AttrKind::DoubleLinear,
            Value::Int(_) => AttrKind::Int,
            Value::Bool(_) => AttrKind::Bool,
            Value::String(_) => AttrKind::String,
            Value::Double3(_) => AttrKind::Double3,
        }
    }

    /// Numeric view of scalar values; `Bool` reads as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) | Value::DoubleLinear(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(_) | Value::Double3(_) => None,
        }
    }
}

impl AttrKind {
    /// The two kinds a compiled sentence may write to.
    pub fn is_scalar(self) -> bool {
        matches!(self, AttrKind::Double | AttrKind::DoubleLinear)
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttrKind::Double => "double",
            AttrKind::DoubleLinear => "doubleLinear",
            AttrKind::Int => "long",
            AttrKind::Bool => "bool",
            AttrKind::String => "string",
            AttrKind::Double3 => "double3",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tangent {
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: f64,
    pub value: f64,
    pub in_tangent: Tangent,
    pub out_tangent: Tangent,
}

impl Keyframe {
    pub fn linear(position: f64, value: f64) -> Self {
        Self {
            position,
            value,
            in_tangent: Tangent::Linear,
            out_tangent: Tangent::Linear,
        }
    }
}

/// How a curve evaluates outside its keyed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    #[default]
    Constant,
    Cyclic,
}

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("unknown node \"{0}\"")]
    UnknownNode(String),

    #[error("unknown attribute \"{0}\"")]
    UnknownAttribute(Plug),

    #[error("attribute \"{0}\" is locked")]
    Locked(Plug),

    #[error("\"{0}\" already has an incoming connection")]
    AlreadyConnected(Plug),

    #[error("\"{0}\" is driven by a connection")]
    Driven(Plug),

    #[error("node \"{node}\" is a {found}, expected {expected}")]
    WrongNodeKind {
        node: String,
        found: String,
        expected: &'static str,
    },

    #[error("cannot evaluate \"{0}\": {1}")]
    Evaluation(Plug, String),

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// The host scene-graph capability the compiler drives.
///
/// Every call the compiler makes against the scene goes through this trait, so a
/// host binding and the in-memory [`MemoryGraph`](crate::MemoryGraph) are
/// interchangeable.
pub trait GraphBuilder {
    /// Create a node and return its host-assigned name.
    fn create_node(&mut self, kind: NodeKind) -> Result<NodeHandle, GraphError>;

    fn get_attribute(&self, plug: &Plug) -> Result<Value, GraphError>;

    fn set_attribute(&mut self, plug: &Plug, value: Value) -> Result<(), GraphError>;

    /// Connect `source` into `dest`. With `force`, an existing incoming
    /// connection on `dest` is replaced.
    fn connect(&mut self, source: &Plug, dest: &Plug, force: bool) -> Result<(), GraphError>;

    /// Remove the incoming connection of `dest`, if any.
    fn disconnect(&mut self, dest: &Plug) -> Result<(), GraphError>;

    fn is_locked(&self, plug: &Plug) -> Result<bool, GraphError>;

    fn set_locked(&mut self, plug: &Plug, locked: bool) -> Result<(), GraphError>;

    fn create_keyframe(&mut self, curve: &NodeHandle, key: Keyframe) -> Result<(), GraphError>;

    fn set_extrapolation(
        &mut self,
        curve: &NodeHandle,
        pre: Extrapolation,
        post: Extrapolation,
    ) -> Result<(), GraphError>;

    fn delete_node(&mut self, node: &NodeHandle) -> Result<(), GraphError>;

    /// All nodes of the given host type, in host listing order.
    fn list_constructs(&self, kind: &str) -> Result<Vec<NodeHandle>, GraphError>;

    /// Sources connected into `plug` or any of its elements; `None` when there are none.
    fn list_incoming_connections(&self, plug: &Plug) -> Result<Option<Vec<Plug>>, GraphError>;

    fn clear_selection(&mut self) -> Result<(), GraphError>;
}
