use crate::convert::opts::ConvertOpts;
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::graph::builder::GraphBuilder;
use crate::graph::plug::Plug;

/// Per-unit compilation context. Lives only for one construct's compilation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompileCtx<'a> {
    /// Name of the construct being compiled; anchors self-relative paths.
    pub(crate) identity: &'a str,
    pub(crate) opts: &'a ConvertOpts,
}

impl<'a> CompileCtx<'a> {
    pub(crate) fn new(identity: &'a str, opts: &'a ConvertOpts) -> Self {
        Self { identity, opts }
    }
}

/// Map a variable path onto a concrete plug.
///
/// `node.attr` passes through as an external reference. A path with an empty
/// namespace (`.attr`) is self-relative: `O[` and `I[` select the construct's
/// output and input port arrays, anything else names a plain attribute of the
/// construct itself.
pub(crate) fn resolve_variable(path: &str, ctx: &CompileCtx<'_>) -> ConvertResult<Plug> {
    if let Some(rest) = path.strip_prefix('.') {
        if rest.is_empty() {
            return Err(ConvertError::structural(format!(
                "self-relative path {path:?} names no attribute"
            )));
        }
        let attribute = if let Some(index) = rest.strip_prefix("O[") {
            format!("{}[{index}", ctx.opts.output_port)
        } else if let Some(index) = rest.strip_prefix("I[") {
            format!("{}[{index}", ctx.opts.input_port)
        } else {
            rest.to_owned()
        };
        return Ok(Plug::new(ctx.identity, attribute));
    }

    Plug::parse(path)
        .ok_or_else(|| ConvertError::structural(format!("malformed variable path {path:?}")))
}

/// Resolve a sentence target and check that it can hold a scalar.
pub(crate) fn resolve_destination<G: GraphBuilder + ?Sized>(
    target: &str,
    ctx: &CompileCtx<'_>,
    graph: &G,
) -> ConvertResult<Plug> {
    let plug = resolve_variable(target, ctx)?;
    let kind = graph.get_attribute(&plug)?.kind();
    if !kind.is_scalar() {
        return Err(ConvertError::AttributeType {
            plug,
            kind,
            expected: "double or doubleLinear",
        });
    }
    Ok(plug)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/resolve.rs"]
mod tests;
