use crate::expression::error::SyntaxError;
use crate::graph::builder::{AttrKind, GraphError};
use crate::graph::plug::Plug;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("structural invariant violated: {0}")]
    StructuralInvariant(String),

    #[error("attribute type error: \"{plug}\" is {kind}, expected {expected}")]
    AttributeType {
        plug: Plug,
        kind: AttrKind,
        expected: &'static str,
    },

    #[error("unknown function \"{0}\"")]
    UnknownFunction(String),

    #[error("non-constant operand: right-hand side of '{op}' must be a numeric literal")]
    NonConstantOperand { op: &'static str },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("failed converting expression \"{construct}\": {source}")]
    Conversion {
        construct: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::StructuralInvariant(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn conversion(construct: impl Into<String>, source: ConvertError) -> Self {
        Self::Conversion {
            construct: construct.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through [`ConvertError::Conversion`].
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Conversion { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
