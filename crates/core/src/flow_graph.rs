//! Structured view of linked flows: entry chains split into sources and
//! targets, when-blocks with ordered triggers and labeled outputs.

use crate::ast::{
    ChainNode, CrossReference, Definition, DefinitionKind, FlowEntryChain, FlowWhenBlock,
    Resolution, Statement, SymbolId, TriggerJoin, VersionLiteral,
};
use serde::Serialize;

/// One node of a flow graph with what the linker found for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub name: String,
    pub version: Option<VersionLiteral>,
    pub label: Option<String>,
    /// Resolved kind; `None` when unresolved or ambiguous.
    pub kind: Option<DefinitionKind>,
    pub target: Option<SymbolId>,
}

impl FlowNode {
    fn from_reference(reference: &CrossReference, label: Option<&String>) -> Self {
        let target = reference.target();
        FlowNode {
            name: reference.name.clone(),
            version: reference.version.clone(),
            label: label.cloned(),
            kind: target.map(|t| t.kind),
            target: target.map(|t| t.id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryGraph {
    /// Leading actors and external systems.
    pub sources: Vec<FlowNode>,
    /// Every later node, in authored order.
    pub targets: Vec<FlowNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEdge {
    pub label: Option<String>,
    pub target: FlowNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionNode {
    pub participant: FlowNode,
    /// Empty for a terminal action.
    pub outputs: Vec<OutputEdge>,
}

impl ActionNode {
    pub fn is_terminal(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhenGraph {
    /// In authored order; `join` records whether they were `and`-joined.
    pub triggers: Vec<FlowNode>,
    pub join: TriggerJoin,
    pub actions: Vec<ActionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub name: String,
    pub version: Option<VersionLiteral>,
    pub file: String,
    pub id: SymbolId,
    pub entries: Vec<EntryGraph>,
    pub branches: Vec<WhenGraph>,
}

fn is_source_kind(kind: DefinitionKind) -> bool {
    matches!(kind, DefinitionKind::Actor | DefinitionKind::ExternalSystem)
}

/// Whether a chain node at `position` still belongs to the leading source
/// run. An unlinked first node counts as a source so that catalogs that do
/// not declare their actors still split sensibly.
fn is_source(node: &ChainNode, position: usize) -> bool {
    match &node.target.resolution {
        Resolution::Resolved(t) => is_source_kind(t.kind),
        Resolution::Ambiguous(ts) => ts.iter().any(|t| is_source_kind(t.kind)),
        Resolution::Unresolved | Resolution::Pending => position == 0,
    }
}

/// Split a chain into its leading source run and the remaining targets.
pub fn split_chain(chain: &FlowEntryChain) -> EntryGraph {
    let lead = chain
        .nodes
        .iter()
        .enumerate()
        .take_while(|(i, n)| is_source(n, *i))
        .count();
    let to_node = |n: &ChainNode| FlowNode::from_reference(&n.target, n.label.as_ref());
    EntryGraph {
        sources: chain.nodes[..lead].iter().map(to_node).collect(),
        targets: chain.nodes[lead..].iter().map(to_node).collect(),
    }
}

pub fn when_graph(block: &FlowWhenBlock) -> WhenGraph {
    WhenGraph {
        triggers: block
            .triggers
            .iter()
            .map(|t| FlowNode::from_reference(t, None))
            .collect(),
        join: block.join,
        actions: block
            .actions
            .iter()
            .map(|a| ActionNode {
                participant: FlowNode::from_reference(&a.participant, a.label.as_ref()),
                outputs: a
                    .outputs
                    .iter()
                    .map(|o| OutputEdge {
                        label: o.label.clone(),
                        target: FlowNode::from_reference(&o.target, None),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn flow_graph(def: &Definition, file: &str, id: SymbolId) -> FlowGraph {
    let mut entries = Vec::new();
    let mut branches = Vec::new();
    for stmt in &def.body {
        match stmt {
            Statement::EntryChain(chain) => entries.push(split_chain(chain)),
            Statement::When(block) => branches.push(when_graph(block)),
            _ => {}
        }
    }
    FlowGraph {
        name: def.name.clone(),
        version: def.version.clone(),
        file: file.to_owned(),
        id,
        entries,
        branches,
    }
}

/// Flow graphs for every flow definition, nested ones included, in
/// declaration order.
pub fn build_flow_graphs<'p>(
    documents: impl IntoIterator<Item = (&'p str, &'p crate::ast::Program)>,
) -> Vec<FlowGraph> {
    let mut graphs = Vec::new();
    for (doc, (file, program)) in documents.into_iter().enumerate() {
        for (i, def) in program.definitions.iter().enumerate() {
            collect(def, file, SymbolId { document: doc, path: vec![i] }, &mut graphs);
        }
    }
    graphs
}

fn collect(def: &Definition, file: &str, id: SymbolId, out: &mut Vec<FlowGraph>) {
    if def.kind == DefinitionKind::Flow {
        out.push(flow_graph(def, file, id.clone()));
    }
    for (j, stmt) in def.body.iter().enumerate() {
        if let Statement::Definition(inner) = stmt {
            let mut child = id.clone();
            child.path.push(j);
            collect(inner, file, child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Program;
    use crate::index::SymbolIndex;
    use crate::link::{link_program, LatestDeclared};
    use crate::parser::parse;

    fn linked(src: &str) -> Program {
        let mut program = parse(src, "f.ec").program;
        let index = SymbolIndex::build([("f.ec", &program)]);
        link_program(&mut program, "f.ec", &index, &LatestDeclared);
        program
    }

    fn graphs(src: &str) -> Vec<FlowGraph> {
        let program = linked(src);
        build_flow_graphs([("f.ec", &program)])
    }

    #[test]
    fn leading_actors_become_sources() {
        let g = graphs(
            r#"
actor Customer
external-system Stripe
flow Checkout {
  version 1.0.0
  Customer "pays" -> Stripe -> Payments -> Paid
}
"#,
        );
        let entry = &g[0].entries[0];
        let sources: Vec<_> = entry.sources.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(sources, ["Customer", "Stripe"]);
        assert_eq!(entry.sources[0].label.as_deref(), Some("pays"));
        assert_eq!(entry.sources[1].kind, Some(DefinitionKind::ExternalSystem));
        let targets: Vec<_> = entry.targets.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(targets, ["Payments", "Paid"]);
    }

    #[test]
    fn resolved_non_actor_first_node_has_no_sources() {
        let g = graphs(
            r#"
service Orders {
  version 1.0.0
}
flow F {
  version 1.0.0
  Orders -> Placed
}
"#,
        );
        assert!(g[0].entries[0].sources.is_empty());
        assert_eq!(g[0].entries[0].targets.len(), 2);
    }

    #[test]
    fn unresolved_first_node_is_still_a_source() {
        let g = graphs("flow F {\n  version 1.0.0\n  Visitor -> Browse -> Leave\n}");
        assert_eq!(g[0].entries[0].sources.len(), 1);
        assert!(g[0].entries[0].sources[0].kind.is_none());
        assert_eq!(g[0].entries[0].targets.len(), 2);
    }

    #[test]
    fn when_graph_keeps_triggers_and_terminal_actions() {
        let g = graphs(
            r#"
flow F {
  version 1.0.0
  when A and B
    Worker -> "ok": Done -> "ko": Failed
    Logger
}
"#,
        );
        let branch = &g[0].branches[0];
        assert_eq!(branch.join, TriggerJoin::All);
        assert_eq!(branch.triggers[1].name, "B");
        assert_eq!(branch.actions[0].outputs[1].label.as_deref(), Some("ko"));
        assert!(branch.actions[1].is_terminal());
        assert_eq!(branch.actions[1].outputs, Vec::new());
    }

    #[test]
    fn nested_flows_are_found() {
        let g = graphs(
            r#"
domain Sales {
  version 1.0.0
  flow Refund {
    version 1.0.0
    Customer -> RefundRequested
  }
}
"#,
        );
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].id.path, vec![0, 1]);
    }
}
