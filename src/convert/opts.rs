use crate::foundation::error::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};

/// What happens to graph nodes created for a construct whose conversion fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Leave every node in place.
    None,
    /// Delete the primitive nodes created while compiling the failing construct.
    /// Constructs committed earlier in the batch are kept.
    #[default]
    FailedConstruct,
}

/// Options controlling a conversion batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOpts {
    /// Host type of the script constructs to convert.
    pub construct_kind: String,
    /// Port whose incoming connections mark a construct as live.
    pub input_port: String,
    /// Port namespace addressed by the `O[` marker.
    pub output_port: String,
    /// Construct attribute holding the script text.
    pub script_attribute: String,
    /// The modulo ramp's upper key sits at `divisor - modulo_epsilon`.
    pub modulo_epsilon: f64,
    pub rollback: RollbackPolicy,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            construct_kind: "expression".to_owned(),
            input_port: "input".to_owned(),
            output_port: "output".to_owned(),
            script_attribute: "expression".to_owned(),
            modulo_epsilon: 1e-10,
            rollback: RollbackPolicy::default(),
        }
    }
}

impl ConvertOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> ConvertResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| ConvertError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.construct_kind.is_empty() {
            return Err(ConvertError::serde("construct_kind must not be empty"));
        }
        if self.input_port.is_empty() || self.output_port.is_empty() {
            return Err(ConvertError::serde("port names must not be empty"));
        }
        if self.script_attribute.is_empty() {
            return Err(ConvertError::serde("script_attribute must not be empty"));
        }
        if !(self.modulo_epsilon.is_finite() && self.modulo_epsilon > 0.0) {
            return Err(ConvertError::serde("modulo_epsilon must be positive and finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/opts.rs"]
mod tests;
