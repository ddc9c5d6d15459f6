//! Canonical DSL rendering of a [`Program`].
//!
//! Output re-parses to a structurally identical program: two-space
//! indentation, one statement per line, strings re-escaped, versions
//! verbatim.

use crate::ast::{
    Annotation, AnnotationValue, ChannelClause, CrossReference, DataPort, Definition,
    FlowEntryChain, FlowWhenBlock, MessageFlow, ParameterDecl, Program, Statement, TextField,
};
use crate::lexer;
use std::fmt::Write;

const INDENT: &str = "  ";

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for (i, def) in program.definitions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_definition(&mut out, def, 0);
    }
    out
}

pub fn print_definition(out: &mut String, def: &Definition, level: usize) {
    indent(out, level);
    out.push_str(def.kind.keyword());
    out.push(' ');
    out.push_str(&def.name);
    if def.inline {
        out.push('\n');
        return;
    }
    out.push_str(" {\n");
    print_body(out, &def.body, level + 1);
    indent(out, level);
    out.push_str("}\n");
}

fn print_body(out: &mut String, body: &[Statement], level: usize) {
    for stmt in body {
        print_statement(out, stmt, level);
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Quote and escape `s` the way the lexer reads it back.
pub fn quote(s: &str) -> String {
    let mut q = String::with_capacity(s.len() + 2);
    q.push('"');
    for c in s.chars() {
        match c {
            '"' => q.push_str("\\\""),
            '\\' => q.push_str("\\\\"),
            '\n' => q.push_str("\\n"),
            '\t' => q.push_str("\\t"),
            other => q.push(other),
        }
    }
    q.push('"');
    q
}

/// Whether `s` lexes back as a single non-keyword word token.
fn is_bare_word(s: &str) -> bool {
    if lexer::is_keyword(s) {
        return false;
    }
    let mut chars = s.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    starts_well
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !s.contains("->")
}

fn reference(r: &CrossReference) -> String {
    r.display_name()
}

fn text_value(field: TextField, value: &str) -> String {
    if !field.is_quoted() && is_bare_word(value) {
        value.to_owned()
    } else {
        quote(value)
    }
}

fn print_statement(out: &mut String, stmt: &Statement, level: usize) {
    if let Statement::Definition(def) = stmt {
        print_definition(out, def, level);
        return;
    }
    indent(out, level);
    // Writing to a String cannot fail.
    let _ = match stmt {
        Statement::Version { value, .. } => writeln!(out, "version {}", value),
        Statement::Text { field, value, .. } => {
            writeln!(out, "{} {}", field.keyword(), text_value(*field, value))
        }
        Statement::Flag { field, value, .. } => writeln!(out, "{} {}", field.keyword(), value),
        Statement::Owner { owner, .. } => writeln!(out, "owner {}", reference(owner)),
        Statement::Member { member, .. } => writeln!(out, "member {}", reference(member)),
        Statement::Annotation(a) => writeln!(out, "{}", annotation(a)),
        Statement::Sends(flow) => {
            print_message_flow(out, "sends", flow, level);
            Ok(())
        }
        Statement::Receives(flow) => {
            print_message_flow(out, "receives", flow, level);
            Ok(())
        }
        Statement::WritesTo { container, .. } => {
            writeln!(out, "writes-to container {}", reference(container))
        }
        Statement::ReadsFrom { container, .. } => {
            writeln!(out, "reads-from container {}", reference(container))
        }
        Statement::Reference { kind, target, .. } => {
            writeln!(out, "{} {}", kind.keyword(), reference(target))
        }
        Statement::Parameter(p) => {
            print_parameter(out, p, level);
            Ok(())
        }
        Statement::Route { target, .. } => writeln!(out, "route {}", reference(target)),
        Statement::Input(port) => {
            print_data_port(out, "input", port, level);
            Ok(())
        }
        Statement::Output(port) => {
            print_data_port(out, "output", port, level);
            Ok(())
        }
        Statement::EntryChain(chain) => writeln!(out, "{}", entry_chain(chain)),
        Statement::When(block) => {
            print_when(out, block, level);
            Ok(())
        }
        Statement::Definition(_) => Ok(()),
    };
}

fn annotation(a: &Annotation) -> String {
    let mut s = format!("@{}", a.name);
    if a.args.is_empty() {
        return s;
    }
    let args: Vec<String> = a
        .args
        .iter()
        .map(|arg| {
            let value = annotation_value(&arg.value);
            match &arg.key {
                Some(key) => format!("{}: {}", key, value),
                None => value,
            }
        })
        .collect();
    s.push('(');
    s.push_str(&args.join(", "));
    s.push(')');
    s
}

fn annotation_value(v: &AnnotationValue) -> String {
    match v {
        AnnotationValue::Str(s) => quote(s),
        AnnotationValue::Ident(s) => s.clone(),
        AnnotationValue::Int(n) => n.to_string(),
        AnnotationValue::Bool(b) => b.to_string(),
        AnnotationValue::Version(v) => v.to_string(),
    }
}

fn channel_clause(clause: &ChannelClause) -> String {
    let channels: Vec<String> = clause.channels.iter().map(reference).collect();
    let mut s = format!("{} {}", clause.direction.keyword(), channels.join(", "));
    if let Some(mode) = clause.delivery {
        s.push_str(" delivery ");
        s.push_str(mode.keyword());
    }
    s
}

fn print_message_flow(out: &mut String, keyword: &str, flow: &MessageFlow, level: usize) {
    out.push_str(keyword);
    out.push(' ');
    out.push_str(flow.message_kind.keyword());
    out.push(' ');
    out.push_str(&reference(&flow.message));
    if let Some(clause) = &flow.channels {
        out.push(' ');
        out.push_str(&channel_clause(clause));
    }
    match &flow.body {
        Some(body) => {
            out.push_str(" {\n");
            print_body(out, body, level + 1);
            indent(out, level);
            out.push_str("}\n");
        }
        None => out.push('\n'),
    }
}

fn print_parameter(out: &mut String, p: &ParameterDecl, level: usize) {
    out.push_str("parameter ");
    out.push_str(&p.name);
    let empty = p.description.is_none()
        && p.default.is_none()
        && p.enum_values.is_empty()
        && p.examples.is_empty();
    if empty {
        out.push('\n');
        return;
    }
    out.push_str(" {\n");
    let list = |items: &[String]| {
        let quoted: Vec<String> = items.iter().map(|i| quote(i)).collect();
        format!("[{}]", quoted.join(", "))
    };
    if let Some(d) = &p.description {
        indent(out, level + 1);
        out.push_str(&format!("description {}\n", quote(d)));
    }
    if let Some(d) = &p.default {
        indent(out, level + 1);
        out.push_str(&format!("default {}\n", quote(d)));
    }
    if !p.enum_values.is_empty() {
        indent(out, level + 1);
        out.push_str(&format!("enum {}\n", list(&p.enum_values)));
    }
    if !p.examples.is_empty() {
        indent(out, level + 1);
        out.push_str(&format!("examples {}\n", list(&p.examples)));
    }
    indent(out, level);
    out.push_str("}\n");
}

fn print_data_port(out: &mut String, keyword: &str, port: &DataPort, level: usize) {
    out.push_str(&format!(
        "{} {} {}",
        keyword,
        port.message_kind.keyword(),
        reference(&port.message)
    ));
    let Some(contract) = &port.contract else {
        out.push('\n');
        return;
    };
    out.push_str(" {\n");
    indent(out, level + 1);
    out.push_str("contract {\n");
    for (key, value) in [
        ("path", &contract.path),
        ("name", &contract.name),
        ("type", &contract.type_),
    ] {
        if let Some(v) = value {
            indent(out, level + 2);
            out.push_str(&format!("{} {}\n", key, quote(v)));
        }
    }
    indent(out, level + 1);
    out.push_str("}\n");
    indent(out, level);
    out.push_str("}\n");
}

fn labeled(r: &CrossReference, label: Option<&String>) -> String {
    match label {
        Some(l) => format!("{} {}", reference(r), quote(l)),
        None => reference(r),
    }
}

fn entry_chain(chain: &FlowEntryChain) -> String {
    let nodes: Vec<String> = chain
        .nodes
        .iter()
        .map(|n| labeled(&n.target, n.label.as_ref()))
        .collect();
    nodes.join(" -> ")
}

fn print_when(out: &mut String, block: &FlowWhenBlock, level: usize) {
    let triggers: Vec<String> = block.triggers.iter().map(reference).collect();
    out.push_str("when ");
    out.push_str(&triggers.join(" and "));
    out.push('\n');
    for action in &block.actions {
        indent(out, level + 1);
        out.push_str(&labeled(&action.participant, action.label.as_ref()));
        out.push('\n');
        for output in &action.outputs {
            indent(out, level + 2);
            out.push_str("-> ");
            if let Some(label) = &output.label {
                out.push_str(&quote(label));
                out.push_str(": ");
            }
            out.push_str(&reference(&output.target));
            out.push('\n');
        }
    }
}
