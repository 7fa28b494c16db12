//! The fixed vocabulary of host node kinds that expressions compile to, and the
//! port names the code generator wires.

use crate::graph::builder::Value;
use serde::{Deserialize, Serialize};

/// Host node kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NodeKind {
    /// Binary multiply, or divide with `operation = 2`.
    MultiplyDivide,
    /// Two-slot list sum, or difference with `operation = 2`.
    PlusMinusAverage,
    Clamp,
    /// Unitless-to-unitless keyed curve; cyclic extrapolation turns it into a ramp.
    RampCurve,
    /// Multiply by a constant factor.
    MultDoubleLinear,
    /// Rotation-to-quaternion conversion.
    EulerToQuat,
    /// Any other host type (scene transforms, script constructs, ...).
    Other(String),
}

impl NodeKind {
    pub fn host_type(&self) -> &str {
        match self {
            NodeKind::MultiplyDivide => "multiplyDivide",
            NodeKind::PlusMinusAverage => "plusMinusAverage",
            NodeKind::Clamp => "clamp",
            NodeKind::RampCurve => "animCurveUU",
            NodeKind::MultDoubleLinear => "multDoubleLinear",
            NodeKind::EulerToQuat => "eulerToQuat",
            NodeKind::Other(t) => t,
        }
    }

    pub fn from_host_type(t: &str) -> Self {
        match t {
            "multiplyDivide" => NodeKind::MultiplyDivide,
            "plusMinusAverage" => NodeKind::PlusMinusAverage,
            "clamp" => NodeKind::Clamp,
            "animCurveUU" => NodeKind::RampCurve,
            "multDoubleLinear" => NodeKind::MultDoubleLinear,
            "eulerToQuat" => NodeKind::EulerToQuat,
            other => NodeKind::Other(other.to_owned()),
        }
    }

    /// Attributes a freshly created node of this kind carries.
    pub(crate) fn default_attributes(&self) -> Vec<(&'static str, Value)> {
        match self {
            NodeKind::MultiplyDivide => vec![
                (multiply_divide::OPERATION, Value::Int(multiply_divide::MULTIPLY)),
                (multiply_divide::INPUT1, Value::Double(0.0)),
                (multiply_divide::INPUT2, Value::Double(1.0)),
                (multiply_divide::OUTPUT, Value::Double(0.0)),
            ],
            NodeKind::PlusMinusAverage => vec![
                (plus_minus_average::OPERATION, Value::Int(plus_minus_average::SUM)),
                (plus_minus_average::INPUT1, Value::Double(0.0)),
                (plus_minus_average::INPUT2, Value::Double(0.0)),
                (plus_minus_average::OUTPUT, Value::Double(0.0)),
            ],
            NodeKind::Clamp => vec![
                (clamp::INPUT, Value::Double(0.0)),
                (clamp::MIN, Value::Double(0.0)),
                (clamp::MAX, Value::Double(0.0)),
                (clamp::OUTPUT, Value::Double(0.0)),
            ],
            NodeKind::RampCurve => vec![
                (ramp_curve::INPUT, Value::Double(0.0)),
                (ramp_curve::OUTPUT, Value::Double(0.0)),
            ],
            NodeKind::MultDoubleLinear => vec![
                (mult_double_linear::INPUT1, Value::DoubleLinear(0.0)),
                (mult_double_linear::INPUT2, Value::DoubleLinear(1.0)),
                (mult_double_linear::OUTPUT, Value::DoubleLinear(0.0)),
            ],
            NodeKind::EulerToQuat => vec![
                (euler_to_quat::ROTATE_X, Value::Double(0.0)),
                (euler_to_quat::ROTATE_Y, Value::Double(0.0)),
                (euler_to_quat::ROTATE_Z, Value::Double(0.0)),
                (euler_to_quat::QUAT_X, Value::Double(0.0)),
                (euler_to_quat::QUAT_W, Value::Double(1.0)),
            ],
            NodeKind::Other(_) => Vec::new(),
        }
    }
}

impl From<NodeKind> for String {
    fn from(k: NodeKind) -> Self {
        k.host_type().to_owned()
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        NodeKind::from_host_type(&s)
    }
}

pub mod multiply_divide {
    pub const OPERATION: &str = "operation";
    pub const INPUT1: &str = "input1X";
    pub const INPUT2: &str = "input2X";
    pub const OUTPUT: &str = "outputX";
    pub const MULTIPLY: i64 = 1;
    pub const DIVIDE: i64 = 2;
}

pub mod plus_minus_average {
    pub const OPERATION: &str = "operation";
    pub const INPUT1: &str = "input1D[0]";
    pub const INPUT2: &str = "input1D[1]";
    pub const OUTPUT: &str = "output1D";
    pub const SUM: i64 = 1;
    pub const SUBTRACT: i64 = 2;
}

pub mod clamp {
    pub const INPUT: &str = "inputR";
    pub const MIN: &str = "minR";
    pub const MAX: &str = "maxR";
    pub const OUTPUT: &str = "outputR";
}

pub mod ramp_curve {
    pub const INPUT: &str = "input";
    pub const OUTPUT: &str = "output";
}

pub mod mult_double_linear {
    pub const INPUT1: &str = "input1";
    pub const INPUT2: &str = "input2";
    pub const OUTPUT: &str = "output";
}

pub mod euler_to_quat {
    pub const ROTATE_X: &str = "inputRotateX";
    pub const ROTATE_Y: &str = "inputRotateY";
    pub const ROTATE_Z: &str = "inputRotateZ";
    pub const QUAT_X: &str = "outputQuat.outputQuatX";
    pub const QUAT_W: &str = "outputQuat.outputQuatW";
}
