//! Cross-document linking, version selection, ambiguity and the
//! incremental workspace.

use ec_core::ast::Statement;
use ec_core::{
    compile, load_unit, BodyQuery, Compilation, CompileOptions, DefinitionKind, DiagnosticKind,
    InMemoryProvider, MessageKind, Resolution, Severity, SourceFile, SymbolNode,
    VersionPolicyKind, Workspace,
};
use std::path::PathBuf;

fn unit(files: &[(&str, &str)]) -> Compilation {
    unit_with(files, &CompileOptions::default())
}

fn unit_with(files: &[(&str, &str)], options: &CompileOptions) -> Compilation {
    let sources: Vec<_> = files.iter().map(|(p, t)| SourceFile::new(*p, *t)).collect();
    compile(&sources, options)
}

fn first_owner(c: &Compilation, doc: usize) -> &ec_core::CrossReference {
    c.documents[doc].program.definitions[0].owners()[0]
}

#[test]
fn references_resolve_across_documents() {
    let c = unit(&[
        ("svc.ec", "service Orders {\n  version 1.0.0\n  owner core\n}"),
        ("team.ec", "team core"),
    ]);
    assert!(!c.has_errors());
    let owner = first_owner(&c, 0);
    let target = owner.target().expect("resolved");
    assert_eq!(target.kind, DefinitionKind::Team);
    assert_eq!(target.id.document, 1);
    let node = c.node(&target.id).unwrap();
    assert_eq!(node.name(), "core");
}

#[test]
fn unresolved_reference_is_a_warning_not_an_error() {
    let c = unit(&[("svc.ec", "service Orders {\n  version 1.0.0\n  owner ghost\n}")]);
    assert!(!c.has_errors());
    let d = c
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::UnresolvedReference)
        .unwrap();
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.span.line, 3);
    assert_eq!(first_owner(&c, 0).resolution, Resolution::Unresolved);
}

#[test]
fn owner_binds_to_team_or_user() {
    let c = unit(&[(
        "a.ec",
        "user jdoe\n\nservice S {\n  version 1.0.0\n  owner jdoe\n}",
    )]);
    let owner = c.documents[0].program.definitions[1].owners()[0];
    assert_eq!(owner.target().unwrap().kind, DefinitionKind::User);
}

#[test]
fn name_declared_under_two_kinds_is_ambiguous() {
    let c = unit(&[(
        "a.ec",
        "team shared\nuser shared\n\nservice S {\n  version 1.0.0\n  owner shared\n}",
    )]);
    let owner = c.documents[0].program.definitions[2].owners()[0];
    let Resolution::Ambiguous(targets) = &owner.resolution else {
        panic!("expected ambiguity, got {:?}", owner.resolution);
    };
    let kinds: Vec<_> = targets.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, [DefinitionKind::Team, DefinitionKind::User]);
    assert!(c
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::AmbiguousReference && !d.is_error()));
}

#[test]
fn chain_nodes_link_to_any_participant_kind() {
    let c = unit(&[(
        "f.ec",
        "actor Customer\ncommand PlaceOrder\n\nflow F {\n  version 1.0.0\n  Customer -> PlaceOrder\n}",
    )]);
    assert!(!c.has_errors());
    let flow = &c.documents[0].program.definitions[2];
    let chain = flow.entry_chains()[0];
    assert_eq!(
        chain.nodes[0].target.target().unwrap().kind,
        DefinitionKind::Actor
    );
    assert_eq!(
        chain.nodes[1].target.target().unwrap().kind,
        DefinitionKind::Message(MessageKind::Command)
    );
}

const VERSIONS: &str = "\
event Placed {
  version 1.0.0
}

event Placed {
  version 3.0.0
}

event Placed {
  version 2.0.0
}
";

fn resolved_version(c: &Compilation, doc: usize) -> String {
    let svc = &c.documents[doc].program.definitions[0];
    let flow = svc.receives()[0];
    flow.message
        .target()
        .and_then(|t| t.version.as_ref())
        .map(|v| v.as_str().to_owned())
        .unwrap_or_default()
}

#[test]
fn versionless_reference_takes_latest_declared_by_default() {
    let c = unit(&[
        ("svc.ec", "service S {\n  version 1.0.0\n  receives event Placed\n}"),
        ("events.ec", VERSIONS),
    ]);
    assert_eq!(resolved_version(&c, 0), "2.0.0");
}

#[test]
fn highest_version_policy_orders_segments() {
    let options = CompileOptions {
        version_policy: VersionPolicyKind::HighestVersion,
        ..CompileOptions::default()
    };
    let c = unit_with(
        &[
            ("svc.ec", "service S {\n  version 1.0.0\n  receives event Placed\n}"),
            ("events.ec", VERSIONS),
        ],
        &options,
    );
    assert_eq!(resolved_version(&c, 0), "3.0.0");
}

#[test]
fn explicit_version_selects_exact_match() {
    let c = unit(&[
        ("svc.ec", "service S {\n  version 1.0.0\n  receives event Placed@1.0.0\n}"),
        ("events.ec", VERSIONS),
    ]);
    assert_eq!(resolved_version(&c, 0), "1.0.0");

    let missing = unit(&[
        ("svc.ec", "service S {\n  version 1.0.0\n  receives event Placed@9.9.9\n}"),
        ("events.ec", VERSIONS),
    ]);
    let d = missing
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::UnresolvedReference)
        .unwrap();
    assert!(d.message.contains("9.9.9"), "{}", d.message);
}

#[test]
fn inline_message_bodies_are_indexed() {
    let c = unit(&[
        (
            "svc.ec",
            "service S {\n  version 1.0.0\n  sends event Placed {\n    version 1.1.0\n    summary \"inline\"\n  }\n}",
        ),
        ("other.ec", "service T {\n  version 1.0.0\n  receives event Placed\n}"),
    ]);
    let target = c.documents[1].program.definitions[0].receives()[0]
        .message
        .target()
        .unwrap()
        .clone();
    assert_eq!(target.version.as_ref().unwrap().as_str(), "1.1.0");
    match c.node(&target.id).unwrap() {
        SymbolNode::InlineMessage(flow) => assert_eq!(flow.message.name, "Placed"),
        other => panic!("expected inline message, got {:?}", other),
    }
}

#[test]
fn nested_definitions_are_indexed_and_reachable() {
    let c = unit(&[(
        "d.ec",
        "domain Sales {\n  version 1.0.0\n  service Orders {\n    version 1.0.0\n  }\n}\n\nvisualizer Main {\n  service Orders\n}",
    )]);
    let viz = &c.documents[0].program.definitions[1];
    let Statement::Reference { target, .. } = &viz.body[0] else {
        panic!("expected reference");
    };
    let id = &target.target().unwrap().id;
    assert_eq!(id.path, [0, 1]);
    let SymbolNode::Definition(def) = c.node(id).unwrap() else {
        panic!("expected definition");
    };
    assert_eq!(def.kind, DefinitionKind::Service);
}

#[test]
fn missing_version_is_reported_after_linking() {
    let c = unit(&[("a.ec", "service S {\n  summary \"no version\"\n}\n\nactor A")]);
    let kinds: Vec<_> = c.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, [DiagnosticKind::MissingVersion]);
}

#[test]
fn resource_keys_follow_declaration_order() {
    let c = unit(&[
        ("a.ec", "event A {\n  version 1.0.0\n}"),
        ("b.ec", "actor B"),
    ]);
    let keys = c.resource_keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].name, "A");
    assert_eq!(keys[0].version.as_ref().unwrap().as_str(), "1.0.0");
    assert_eq!(keys[1].kind, DefinitionKind::Actor);
    assert!(keys[1].version.is_none());
}

#[test]
fn unit_loads_through_a_provider() {
    let provider = InMemoryProvider::new()
        .with_file("cat/b.ec", "team core")
        .with_file("cat/a.ec", "service S {\n  version 1.0.0\n  owner core\n}")
        .with_file("cat/readme.md", "ignored");
    let sources = load_unit(&[PathBuf::from("cat")], &provider, "ec").unwrap();
    let paths: Vec<_> = sources.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, ["cat/a.ec", "cat/b.ec"]);
    let c = compile(&sources, &CompileOptions::default());
    assert!(c.diagnostics.is_empty(), "{:?}", c.diagnostics);
}

#[test]
fn workspace_relinks_after_an_edit() {
    let mut ws = Workspace::new(CompileOptions::default());
    ws.update("svc.ec", 1, "service S {\n  version 1.0.0\n  owner core\n}");
    ws.update("team.ec", 1, "team core");
    assert!(ws.compile().diagnostics.is_empty());

    ws.update("team.ec", 2, "team platform");
    let c = ws.compile();
    assert_eq!(c.diagnostics.len(), 1);
    assert_eq!(c.diagnostics[0].kind, DiagnosticKind::UnresolvedReference);

    // A late, older revision must not win.
    assert!(!ws.update("team.ec", 1, "team core"));
    assert_eq!(ws.compile().diagnostics.len(), 1);
}
