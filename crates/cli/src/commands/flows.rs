use std::path::PathBuf;

use ec_core::flow_graph::{FlowNode, WhenGraph};
use ec_core::FlowGraph;

use super::{compile_unit, report_diagnostics, to_json};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_flows(paths: Vec<PathBuf>, ctx: &Context) {
    let compilation = compile_unit(paths, ctx);
    let errors: Vec<_> = compilation.errors().cloned().collect();
    report_diagnostics(&errors, ctx);

    match ctx.output {
        OutputFormat::Json => println!("{}", to_json(&compilation.flows)),
        OutputFormat::Text => {
            for (i, flow) in compilation.flows.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", render_flow(flow));
            }
        }
    }
}

/// `Name@1.0.0 "label"`, with `?` marking a node the linker did not pin
/// to one definition.
fn node(n: &FlowNode) -> String {
    let mut s = n.name.clone();
    if let Some(v) = &n.version {
        s.push('@');
        s.push_str(v.as_str());
    }
    if n.kind.is_none() {
        s.push('?');
    }
    if let Some(label) = &n.label {
        s.push_str(&format!(" \"{}\"", label));
    }
    s
}

fn join(nodes: &[FlowNode], sep: &str) -> String {
    nodes.iter().map(node).collect::<Vec<_>>().join(sep)
}

fn render_when(out: &mut String, when: &WhenGraph) {
    out.push_str(&format!("  when {}\n", join(&when.triggers, " and ")));
    for action in &when.actions {
        out.push_str(&format!("    {}", node(&action.participant)));
        if action.is_terminal() {
            out.push_str(" (terminal)");
        }
        out.push('\n');
        for edge in &action.outputs {
            let label = edge
                .label
                .as_ref()
                .map(|l| format!("\"{}\": ", l))
                .unwrap_or_default();
            out.push_str(&format!("      -> {}{}\n", label, node(&edge.target)));
        }
    }
}

fn render_flow(flow: &FlowGraph) -> String {
    let mut out = format!("flow {}", flow.name);
    if let Some(v) = &flow.version {
        out.push_str(&format!("@{}", v));
    }
    out.push_str(&format!(" ({})\n", flow.file));
    for entry in &flow.entries {
        out.push_str(&format!(
            "  entry {} => {}\n",
            join(&entry.sources, ", "),
            join(&entry.targets, " -> ")
        ));
    }
    for when in &flow.branches {
        render_when(&mut out, when);
    }
    out
}
