use crate::foundation::error::{ConvertError, ConvertResult};
use crate::graph::builder::{Extrapolation, GraphBuilder, GraphError, Keyframe, Value};
use crate::graph::plug::{NodeHandle, Plug};
use crate::graph::primitives::{
    NodeKind, clamp, euler_to_quat, mult_double_linear, multiply_divide, plus_minus_average,
    ramp_curve,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One mutating [`GraphBuilder`] call, as recorded by [`MemoryGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphOp {
    CreateNode {
        node: NodeHandle,
        kind: NodeKind,
    },
    SetAttribute {
        plug: Plug,
        value: Value,
    },
    Connect {
        source: Plug,
        dest: Plug,
        force: bool,
    },
    Disconnect {
        dest: Plug,
    },
    SetLocked {
        plug: Plug,
        locked: bool,
    },
    CreateKeyframe {
        curve: NodeHandle,
        key: Keyframe,
    },
    SetExtrapolation {
        curve: NodeHandle,
        pre: Extrapolation,
        post: Extrapolation,
    },
    DeleteNode {
        node: NodeHandle,
    },
    ClearSelection,
}

/// JSON description of a scene used to seed a [`MemoryGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDef {
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    /// `[source, dest]` pairs.
    #[serde(default)]
    pub connections: Vec<(Plug, Plug)>,
    #[serde(default)]
    pub selection: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub locked: Vec<String>,
}

#[derive(Debug, Clone)]
struct MemoryNode {
    kind: NodeKind,
    attributes: BTreeMap<String, Value>,
    locked: BTreeSet<String>,
    keys: Vec<Keyframe>,
    pre: Extrapolation,
    post: Extrapolation,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        let attributes = kind
            .default_attributes()
            .into_iter()
            .map(|(name, v)| (name.to_owned(), v))
            .collect();
        Self {
            kind,
            attributes,
            locked: BTreeSet::new(),
            keys: Vec::new(),
            pre: Extrapolation::default(),
            post: Extrapolation::default(),
        }
    }
}

/// In-memory scene graph for tests and offline conversion.
///
/// Nodes created through [`GraphBuilder`] are named `<hostType><n>` and start with
/// their kind's default attributes. Array elements (`attr[i]`) spring into
/// existence on first use, any other unknown attribute is an error. Every
/// mutating builder call is appended to [`MemoryGraph::ops`].
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: BTreeMap<String, MemoryNode>,
    /// dest -> source
    connections: BTreeMap<Plug, Plug>,
    selection: Vec<String>,
    ops: Vec<GraphOp>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a [`SceneDef`] JSON document.
    pub fn from_json(s: &str) -> ConvertResult<Self> {
        let def: SceneDef =
            serde_json::from_str(s).map_err(|e| ConvertError::serde(e.to_string()))?;
        Self::from_scene(&def)
    }

    pub fn from_scene(def: &SceneDef) -> ConvertResult<Self> {
        let mut g = Self::new();
        for n in &def.nodes {
            let node = g.add_node(&n.name, n.kind.clone());
            for (attr, v) in &n.attributes {
                g.add_attribute(&node.plug(attr.as_str()), v.clone());
            }
            for attr in &n.locked {
                g.lock(&node.plug(attr.as_str()))?;
            }
        }
        for (source, dest) in &def.connections {
            g.add_connection(source, dest)?;
        }
        for name in &def.selection {
            g.select(name)?;
        }
        Ok(g)
    }

    /// Scene setup: add a node under an exact name. Not recorded.
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeHandle {
        self.nodes.insert(name.to_owned(), MemoryNode::new(kind));
        NodeHandle::new(name)
    }

    /// Scene setup: add or overwrite an attribute. Not recorded.
    pub fn add_attribute(&mut self, plug: &Plug, value: Value) {
        if let Some(n) = self.nodes.get_mut(&plug.node) {
            n.attributes.insert(plug.attribute.clone(), value);
        }
    }

    /// Scene setup: lock an attribute. Not recorded.
    pub fn lock(&mut self, plug: &Plug) -> Result<(), GraphError> {
        self.check_attr(plug)?;
        self.node_mut(&plug.node)?.locked.insert(plug.attribute.clone());
        Ok(())
    }

    /// Scene setup: connect two existing plugs. Not recorded.
    pub fn add_connection(&mut self, source: &Plug, dest: &Plug) -> Result<(), GraphError> {
        self.check_attr(source)?;
        self.check_attr(dest)?;
        self.connections.insert(dest.clone(), source.clone());
        Ok(())
    }

    /// Scene setup: add a node to the active selection. Not recorded.
    pub fn select(&mut self, name: &str) -> Result<(), GraphError> {
        self.node(name)?;
        self.selection.push(name.to_owned());
        Ok(())
    }

    pub fn ops(&self) -> &[GraphOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn contains(&self, node: &NodeHandle) -> bool {
        self.nodes.contains_key(node.name())
    }

    pub fn kind_of(&self, node: &NodeHandle) -> Option<&NodeKind> {
        self.nodes.get(node.name()).map(|n| &n.kind)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_of_kind(&self, kind: &NodeKind) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter(|(_, n)| &n.kind == kind)
            .map(|(name, _)| NodeHandle::new(name.as_str()))
            .collect()
    }

    /// Stored value of an attribute, ignoring connections.
    pub fn value(&self, plug: &Plug) -> Option<&Value> {
        self.nodes.get(&plug.node)?.attributes.get(&plug.attribute)
    }

    /// The source connected into `dest`, if any.
    pub fn source_of(&self, dest: &Plug) -> Option<&Plug> {
        self.connections.get(dest)
    }

    pub fn keyframes(&self, curve: &NodeHandle) -> Option<&[Keyframe]> {
        self.nodes.get(curve.name()).map(|n| n.keys.as_slice())
    }

    pub fn extrapolation(&self, curve: &NodeHandle) -> Option<(Extrapolation, Extrapolation)> {
        self.nodes.get(curve.name()).map(|n| (n.pre, n.post))
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Pull a numeric value through the graph: follow incoming connections and
    /// compute primitive node outputs from their inputs.
    pub fn evaluate(&self, plug: &Plug) -> Result<f64, GraphError> {
        self.eval_at(plug, &mut BTreeSet::new())
    }

    /// `path` holds the plugs being evaluated above this one.
    fn eval_at(&self, plug: &Plug, path: &mut BTreeSet<Plug>) -> Result<f64, GraphError> {
        if !path.insert(plug.clone()) {
            return Err(GraphError::Evaluation(
                plug.clone(),
                "dependency cycle".to_owned(),
            ));
        }
        let value = self.eval_plug(plug, path);
        path.remove(plug);
        value
    }

    fn eval_plug(&self, plug: &Plug, path: &mut BTreeSet<Plug>) -> Result<f64, GraphError> {
        if let Some(source) = self.connections.get(plug) {
            return self.eval_at(source, path);
        }

        let node = self.node(&plug.node)?;
        let mut input = |attr: &str| self.eval_at(&Plug::new(plug.node.clone(), attr), path);
        let attr = plug.attribute.as_str();

        match &node.kind {
            NodeKind::MultiplyDivide if attr == multiply_divide::OUTPUT => {
                let a = input(multiply_divide::INPUT1)?;
                let b = input(multiply_divide::INPUT2)?;
                Ok(match operation(node, multiply_divide::OPERATION) {
                    multiply_divide::DIVIDE => a / b,
                    _ => a * b,
                })
            }
            NodeKind::PlusMinusAverage if attr == plus_minus_average::OUTPUT => {
                let a = input(plus_minus_average::INPUT1)?;
                let b = input(plus_minus_average::INPUT2)?;
                Ok(match operation(node, plus_minus_average::OPERATION) {
                    plus_minus_average::SUBTRACT => a - b,
                    _ => a + b,
                })
            }
            NodeKind::Clamp if attr == clamp::OUTPUT => {
                let v = input(clamp::INPUT)?;
                let lo = input(clamp::MIN)?;
                let hi = input(clamp::MAX)?;
                Ok(v.max(lo).min(hi))
            }
            NodeKind::RampCurve if attr == ramp_curve::OUTPUT => {
                let x = input(ramp_curve::INPUT)?;
                Ok(sample_curve(&node.keys, node.pre, node.post, x))
            }
            NodeKind::MultDoubleLinear if attr == mult_double_linear::OUTPUT => {
                Ok(input(mult_double_linear::INPUT1)? * input(mult_double_linear::INPUT2)?)
            }
            NodeKind::EulerToQuat
                if attr == euler_to_quat::QUAT_X || attr == euler_to_quat::QUAT_W =>
            {
                // XYZ rotation order, radians.
                let (sx, cx) = (input(euler_to_quat::ROTATE_X)? / 2.0).sin_cos();
                let (sy, cy) = (input(euler_to_quat::ROTATE_Y)? / 2.0).sin_cos();
                let (sz, cz) = (input(euler_to_quat::ROTATE_Z)? / 2.0).sin_cos();
                Ok(if attr == euler_to_quat::QUAT_X {
                    sx * cy * cz - cx * sy * sz
                } else {
                    cx * cy * cz + sx * sy * sz
                })
            }
            _ => {
                let v = node
                    .attributes
                    .get(attr)
                    .ok_or_else(|| GraphError::UnknownAttribute(plug.clone()))?;
                v.as_f64().ok_or_else(|| {
                    GraphError::Evaluation(plug.clone(), format!("{} is not numeric", v.kind()))
                })
            }
        }
    }

    fn node(&self, name: &str) -> Result<&MemoryNode, GraphError> {
        self.nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_owned()))
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut MemoryNode, GraphError> {
        self.nodes
            .get_mut(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_owned()))
    }

    fn check_attr(&self, plug: &Plug) -> Result<&MemoryNode, GraphError> {
        let node = self.node(&plug.node)?;
        if node.attributes.contains_key(&plug.attribute) || plug.attribute.contains('[') {
            Ok(node)
        } else {
            Err(GraphError::UnknownAttribute(plug.clone()))
        }
    }

    fn check_unlocked(&self, plug: &Plug) -> Result<(), GraphError> {
        if self.check_attr(plug)?.locked.contains(&plug.attribute) {
            return Err(GraphError::Locked(plug.clone()));
        }
        Ok(())
    }

    fn curve_mut(&mut self, curve: &NodeHandle) -> Result<&mut MemoryNode, GraphError> {
        let node = self.node_mut(curve.name())?;
        if node.kind != NodeKind::RampCurve {
            return Err(GraphError::WrongNodeKind {
                node: curve.name().to_owned(),
                found: node.kind.host_type().to_owned(),
                expected: "animCurveUU",
            });
        }
        Ok(node)
    }

    fn unique_name(&self, kind: &NodeKind) -> String {
        let base = kind.host_type();
        (1u32..)
            .map(|n| format!("{base}{n}"))
            .find(|name| !self.nodes.contains_key(name))
            .unwrap_or_else(|| base.to_owned())
    }
}

fn operation(node: &MemoryNode, attr: &str) -> i64 {
    node.attributes
        .get(attr)
        .and_then(Value::as_f64)
        .map(|v| v as i64)
        .unwrap_or(1)
}

fn sample_curve(keys: &[Keyframe], pre: Extrapolation, post: Extrapolation, x: f64) -> f64 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 0.0;
    };
    let period = last.position - first.position;
    if period <= 0.0 {
        return first.value;
    }

    let mut x = x;
    if x < first.position {
        match pre {
            Extrapolation::Constant => return first.value,
            Extrapolation::Cyclic => x = first.position + (x - first.position).rem_euclid(period),
        }
    } else if x > last.position {
        match post {
            Extrapolation::Constant => return last.value,
            Extrapolation::Cyclic => x = first.position + (x - first.position).rem_euclid(period),
        }
    }

    for w in keys.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        if x <= b.position {
            let span = b.position - a.position;
            if span <= 0.0 {
                return b.value;
            }
            let t = (x - a.position) / span;
            return a.value + (b.value - a.value) * t;
        }
    }
    last.value
}

impl GraphBuilder for MemoryGraph {
    fn create_node(&mut self, kind: NodeKind) -> Result<NodeHandle, GraphError> {
        let name = self.unique_name(&kind);
        let node = self.add_node(&name, kind.clone());
        self.ops.push(GraphOp::CreateNode {
            node: node.clone(),
            kind,
        });
        Ok(node)
    }

    fn get_attribute(&self, plug: &Plug) -> Result<Value, GraphError> {
        let node = self.check_attr(plug)?;
        Ok(node
            .attributes
            .get(&plug.attribute)
            .cloned()
            .unwrap_or(Value::Double(0.0)))
    }

    fn set_attribute(&mut self, plug: &Plug, value: Value) -> Result<(), GraphError> {
        self.check_unlocked(plug)?;
        if self.connections.contains_key(plug) {
            return Err(GraphError::Driven(plug.clone()));
        }
        let node = self.node_mut(&plug.node)?;
        // Numeric writes keep the attribute's declared unit.
        let stored = match (node.attributes.get(&plug.attribute), &value) {
            (Some(Value::DoubleLinear(_)), Value::Double(v)) => Value::DoubleLinear(*v),
            (Some(Value::Double(_)), Value::DoubleLinear(v)) => Value::Double(*v),
            _ => value.clone(),
        };
        node.attributes.insert(plug.attribute.clone(), stored);
        self.ops.push(GraphOp::SetAttribute {
            plug: plug.clone(),
            value,
        });
        Ok(())
    }

    fn connect(&mut self, source: &Plug, dest: &Plug, force: bool) -> Result<(), GraphError> {
        self.check_attr(source)?;
        self.check_unlocked(dest)?;
        if !force && self.connections.contains_key(dest) {
            return Err(GraphError::AlreadyConnected(dest.clone()));
        }
        self.connections.insert(dest.clone(), source.clone());
        self.ops.push(GraphOp::Connect {
            source: source.clone(),
            dest: dest.clone(),
            force,
        });
        Ok(())
    }

    fn disconnect(&mut self, dest: &Plug) -> Result<(), GraphError> {
        self.check_unlocked(dest)?;
        if self.connections.remove(dest).is_some() {
            self.ops.push(GraphOp::Disconnect { dest: dest.clone() });
        }
        Ok(())
    }

    fn is_locked(&self, plug: &Plug) -> Result<bool, GraphError> {
        Ok(self.check_attr(plug)?.locked.contains(&plug.attribute))
    }

    fn set_locked(&mut self, plug: &Plug, locked: bool) -> Result<(), GraphError> {
        self.check_attr(plug)?;
        let node = self.node_mut(&plug.node)?;
        if locked {
            node.locked.insert(plug.attribute.clone());
        } else {
            node.locked.remove(&plug.attribute);
        }
        self.ops.push(GraphOp::SetLocked {
            plug: plug.clone(),
            locked,
        });
        Ok(())
    }

    fn create_keyframe(&mut self, curve: &NodeHandle, key: Keyframe) -> Result<(), GraphError> {
        let node = self.curve_mut(curve)?;
        node.keys.retain(|k| k.position != key.position);
        let at = node.keys.partition_point(|k| k.position < key.position);
        node.keys.insert(at, key);
        self.ops.push(GraphOp::CreateKeyframe {
            curve: curve.clone(),
            key,
        });
        Ok(())
    }

    fn set_extrapolation(
        &mut self,
        curve: &NodeHandle,
        pre: Extrapolation,
        post: Extrapolation,
    ) -> Result<(), GraphError> {
        let node = self.curve_mut(curve)?;
        node.pre = pre;
        node.post = post;
        self.ops.push(GraphOp::SetExtrapolation {
            curve: curve.clone(),
            pre,
            post,
        });
        Ok(())
    }

    fn delete_node(&mut self, node: &NodeHandle) -> Result<(), GraphError> {
        if self.nodes.remove(node.name()).is_none() {
            return Err(GraphError::UnknownNode(node.name().to_owned()));
        }
        self.connections
            .retain(|dest, source| dest.node != node.name() && source.node != node.name());
        self.selection.retain(|s| s != node.name());
        self.ops.push(GraphOp::DeleteNode { node: node.clone() });
        Ok(())
    }

    fn list_constructs(&self, kind: &str) -> Result<Vec<NodeHandle>, GraphError> {
        Ok(self
            .nodes
            .iter()
            .filter(|(_, n)| n.kind.host_type() == kind)
            .map(|(name, _)| NodeHandle::new(name.as_str()))
            .collect())
    }

    fn list_incoming_connections(&self, plug: &Plug) -> Result<Option<Vec<Plug>>, GraphError> {
        self.node(&plug.node)?;
        let sources: Vec<Plug> = self
            .connections
            .iter()
            .filter(|(dest, _)| dest.is_within(plug))
            .map(|(_, source)| source.clone())
            .collect();
        Ok(if sources.is_empty() {
            None
        } else {
            Some(sources)
        })
    }

    fn clear_selection(&mut self) -> Result<(), GraphError> {
        self.selection.clear();
        self.ops.push(GraphOp::ClearSelection);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/memory.rs"]
mod tests;
