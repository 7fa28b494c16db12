use crate::compile::lower::CodeGen;
use crate::compile::resolve::CompileCtx;
use crate::convert::opts::{ConvertOpts, RollbackPolicy};
use crate::expression::parser::parse_program;
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::graph::builder::{GraphBuilder, GraphError, Value};
use crate::graph::plug::NodeHandle;
use serde::Serialize;

/// Outcome of a successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    /// Constructs compiled and deleted, in processing order.
    pub converted: Vec<String>,
    /// Constructs left alone because nothing drives their input port.
    pub skipped: Vec<String>,
    pub nodes_created: usize,
}

/// Convert every live script construct in the scene into primitive nodes.
///
/// Constructs are processed in host listing order. The first failure aborts the
/// batch with [`ConvertError::Conversion`] naming the construct; constructs
/// committed before it stay converted. The selection is cleared on the way out
/// either way.
#[tracing::instrument(skip_all, fields(kind = %opts.construct_kind))]
pub fn convert_all<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    opts: &ConvertOpts,
) -> ConvertResult<ConvertReport> {
    let result = convert_constructs(graph, opts);
    let cleared = graph.clear_selection();
    let report = result?;
    cleared?;
    tracing::info!(
        converted = report.converted.len(),
        skipped = report.skipped.len(),
        nodes_created = report.nodes_created,
        "conversion batch finished"
    );
    Ok(report)
}

fn convert_constructs<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    opts: &ConvertOpts,
) -> ConvertResult<ConvertReport> {
    let mut report = ConvertReport::default();

    for construct in graph.list_constructs(&opts.construct_kind)? {
        let input = construct.plug(opts.input_port.as_str());
        if graph
            .list_incoming_connections(&input)?
            .is_none_or(|sources| sources.is_empty())
        {
            tracing::debug!(construct = %construct, "skipping construct with no live input");
            report.skipped.push(construct.name().to_owned());
            continue;
        }

        let created = construct_nodes(graph, &construct, opts)
            .and_then(|created| {
                commit(graph, &construct, &created, opts)?;
                Ok(created.len())
            })
            .map_err(|e| ConvertError::conversion(construct.name(), e))?;

        tracing::info!(construct = %construct, nodes = created, "converted construct");
        report.converted.push(construct.name().to_owned());
        report.nodes_created += created;
    }

    Ok(report)
}

/// Compile one construct's script into the graph and return how many nodes it
/// created. The construct itself is left in place.
pub fn convert_construct<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    construct: &NodeHandle,
    opts: &ConvertOpts,
) -> ConvertResult<usize> {
    Ok(construct_nodes(graph, construct, opts)?.len())
}

/// Compile `script` as if it belonged to the construct named `identity`.
///
/// On failure the nodes created so far are handled per [`ConvertOpts::rollback`].
pub fn compile_script<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    identity: &str,
    script: &str,
    opts: &ConvertOpts,
) -> ConvertResult<usize> {
    Ok(compile_nodes(graph, identity, script, opts)?.len())
}

#[tracing::instrument(skip_all, fields(construct = %construct))]
fn construct_nodes<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    construct: &NodeHandle,
    opts: &ConvertOpts,
) -> ConvertResult<Vec<NodeHandle>> {
    let script = read_script(&*graph, construct, opts)?;
    compile_nodes(graph, construct.name(), &script, opts)
}

fn compile_nodes<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    identity: &str,
    script: &str,
    opts: &ConvertOpts,
) -> ConvertResult<Vec<NodeHandle>> {
    // The grammar expects line comments to be newline terminated.
    let text = format!("{script}\n");
    let program = parse_program(&text)?;

    let mut codegen = CodeGen::new(graph, CompileCtx::new(identity, opts));
    let result = codegen.compile_program(&program);
    let created = codegen.into_created();

    match result {
        Ok(()) => Ok(created),
        Err(err) => {
            if let Err(e) = roll_back(graph, &created, opts.rollback) {
                tracing::warn!(error = %e, "rollback incomplete");
            }
            Err(err)
        }
    }
}

/// Delete the converted construct. If the host refuses, the construct's new
/// nodes are handled per the rollback policy.
fn commit<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    construct: &NodeHandle,
    created: &[NodeHandle],
    opts: &ConvertOpts,
) -> ConvertResult<()> {
    let Err(err) = graph.delete_node(construct) else {
        return Ok(());
    };
    if let Err(e) = roll_back(graph, created, opts.rollback) {
        tracing::warn!(error = %e, "rollback incomplete");
    }
    Err(err.into())
}

fn read_script<G: GraphBuilder + ?Sized>(
    graph: &G,
    construct: &NodeHandle,
    opts: &ConvertOpts,
) -> ConvertResult<String> {
    let plug = construct.plug(opts.script_attribute.as_str());
    match graph.get_attribute(&plug)? {
        Value::String(s) => Ok(s),
        other => Err(ConvertError::AttributeType {
            plug,
            kind: other.kind(),
            expected: "string",
        }),
    }
}

fn roll_back<G: GraphBuilder + ?Sized>(
    graph: &mut G,
    created: &[NodeHandle],
    policy: RollbackPolicy,
) -> Result<(), GraphError> {
    match policy {
        RollbackPolicy::None => Ok(()),
        RollbackPolicy::FailedConstruct => {
            if !created.is_empty() {
                tracing::warn!(nodes = created.len(), "rolling back partially converted construct");
            }
            for node in created.iter().rev() {
                graph.delete_node(node)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/driver.rs"]
mod tests;
