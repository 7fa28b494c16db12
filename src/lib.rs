//! exprflow compiles scripted scene-graph expressions into static dataflow graphs.
//!
//! Each script construct in a scene holds a small arithmetic language
//! (`a.x = b.y * 2 + min(.I[0], 5);`). The compiler rewrites every sentence into
//! primitive operator nodes and connections through a [`GraphBuilder`], then
//! deletes the script so the rig keeps its behavior without a script runtime.
//!
//! - Parse a unit with [`parse_program`]
//! - Drive a whole scene with [`convert_all`], or one script with [`compile_script`]
//! - Test or run offline against the recording [`MemoryGraph`]
#![forbid(unsafe_code)]

pub(crate) mod compile;
pub(crate) mod convert;
pub(crate) mod expression;
mod foundation;
pub(crate) mod graph;

pub use crate::foundation::error::{ConvertError, ConvertResult};

pub use crate::expression::ast::{
    Atom, BinaryOp, Condition, Expr, Program, Segment, Sentence, UnaryOp,
};
pub use crate::expression::error::SyntaxError;
pub use crate::expression::parser::{parse_expr, parse_program};

pub use crate::graph::builder::{
    AttrKind, Extrapolation, GraphBuilder, GraphError, Keyframe, Tangent, Value,
};
pub use crate::graph::memory::{GraphOp, MemoryGraph, NodeDef, SceneDef};
pub use crate::graph::plug::{NodeHandle, Plug};
pub use crate::graph::primitives::NodeKind;

pub use crate::convert::driver::{ConvertReport, compile_script, convert_all, convert_construct};
pub use crate::convert::opts::{ConvertOpts, RollbackPolicy};

/// Port names of the primitive node kinds.
pub mod ports {
    pub use crate::graph::primitives::{
        clamp, euler_to_quat, mult_double_linear, multiply_divide, plus_minus_average,
        ramp_curve,
    };
}
