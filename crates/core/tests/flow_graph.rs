//! Flow graphs built from linked compilation units.

use ec_core::ast::TriggerJoin;
use ec_core::flow_graph::FlowNode;
use ec_core::{compile, CompileOptions, DefinitionKind, FlowGraph, SourceFile};

const PARTICIPANTS: &str = "\
actor Customer
command PlaceOrder
service OrderService
event OrderCreated
event PaymentTaken
event PaymentFailed
service Billing
service Notifier
";

fn flows(flow_src: &str) -> Vec<FlowGraph> {
    let sources = [
        SourceFile::new("participants.ec", PARTICIPANTS),
        SourceFile::new("flow.ec", flow_src),
    ];
    let c = compile(&sources, &CompileOptions::default());
    assert!(!c.has_errors(), "{:?}", c.diagnostics);
    c.flows
}

fn names(nodes: &[FlowNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn entry_chain_splits_into_sources_and_targets() {
    let graphs = flows(
        "flow Checkout {\n  version 1.0.0\n  Customer \"places an order\" -> PlaceOrder -> OrderService \"creates the order\" -> OrderCreated\n}",
    );
    let entry = &graphs[0].entries[0];
    assert_eq!(names(&entry.sources), ["Customer"]);
    assert_eq!(entry.sources[0].label.as_deref(), Some("places an order"));
    assert_eq!(entry.sources[0].kind, Some(DefinitionKind::Actor));
    assert_eq!(
        names(&entry.targets),
        ["PlaceOrder", "OrderService", "OrderCreated"]
    );
    assert_eq!(entry.targets[1].label.as_deref(), Some("creates the order"));
}

#[test]
fn when_block_keeps_trigger_and_output_order() {
    let graphs = flows(
        "flow Payment {\n  version 1.0.0\n  when OrderCreated and PaymentTaken\n    Billing -> \"success\": PaymentTaken -> \"failure\": PaymentFailed\n    Notifier\n}",
    );
    let when = &graphs[0].branches[0];
    assert_eq!(names(&when.triggers), ["OrderCreated", "PaymentTaken"]);
    assert_eq!(when.join, TriggerJoin::All);

    let billing = &when.actions[0];
    assert_eq!(billing.participant.name, "Billing");
    let labels: Vec<_> = billing
        .outputs
        .iter()
        .map(|o| o.label.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(labels, ["success", "failure"]);
    assert_eq!(billing.outputs[1].target.name, "PaymentFailed");

    let notifier = &when.actions[1];
    assert!(notifier.is_terminal());
    assert!(notifier.outputs.is_empty());
}

#[test]
fn single_trigger_has_single_join() {
    let graphs = flows("flow F {\n  version 1.0.0\n  when OrderCreated\n    Notifier\n}");
    assert_eq!(graphs[0].branches[0].join, TriggerJoin::Single);
}

#[test]
fn nodes_carry_their_linked_targets() {
    let graphs = flows("flow F {\n  version 1.0.0\n  Customer -> OrderService\n}");
    let target = &graphs[0].entries[0].targets[0];
    assert_eq!(target.kind, Some(DefinitionKind::Service));
    let id = target.target.as_ref().unwrap();
    assert_eq!(id.document, 0);
}

#[test]
fn flows_nested_in_domains_are_included() {
    let graphs = flows(
        "domain Sales {\n  version 1.0.0\n  flow Inner {\n    version 1.0.0\n    Customer -> PlaceOrder\n  }\n}\n\nflow Outer {\n  version 2.0.0\n  Customer -> OrderCreated\n}",
    );
    let found: Vec<_> = graphs.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(found, ["Inner", "Outer"]);
    assert_eq!(graphs[0].id.path, [0, 1]);
    assert_eq!(graphs[1].version.as_ref().unwrap().as_str(), "2.0.0");
    assert_eq!(graphs[1].file, "flow.ec");
}

#[test]
fn undeclared_first_node_still_counts_as_source() {
    let sources = [SourceFile::new(
        "f.ec",
        "flow F {\n  version 1.0.0\n  Visitor -> Browse -> Buy\n}",
    )];
    let c = compile(&sources, &CompileOptions::default());
    let entry = &c.flows[0].entries[0];
    assert_eq!(names(&entry.sources), ["Visitor"]);
    assert_eq!(names(&entry.targets), ["Browse", "Buy"]);
    assert!(entry.sources[0].kind.is_none());
}

#[test]
fn several_leading_sources() {
    let sources = [SourceFile::new(
        "f.ec",
        "actor Customer\nexternal-system Stripe\nservice Payments\n\nflow F {\n  version 1.0.0\n  Customer -> Stripe -> Payments\n}",
    )];
    let c = compile(&sources, &CompileOptions::default());
    let entry = &c.flows[0].entries[0];
    assert_eq!(names(&entry.sources), ["Customer", "Stripe"]);
    assert_eq!(names(&entry.targets), ["Payments"]);
}
