//! Semantic checks that run after linking. Everything reported here is a
//! warning; the catalog stays renderable.

use crate::ast::{Definition, MessageFlow, Program, Statement};
use crate::error::{Diagnostic, DiagnosticKind, Severity};

/// Braced definitions of versionable kinds must state a version.
pub fn check_versions(program: &Program, file: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for def in &program.definitions {
        check_definition(def, file, &mut out);
    }
    out
}

fn check_definition(def: &Definition, file: &str, out: &mut Vec<Diagnostic>) {
    if def.kind.is_versionable() && !def.inline && def.version.is_none() {
        out.push(missing_version(file, def.name_span, def.kind.keyword(), &def.name));
    }
    for stmt in &def.body {
        match stmt {
            Statement::Definition(inner) => check_definition(inner, file, out),
            Statement::Sends(flow) | Statement::Receives(flow) => check_inline_message(flow, file, out),
            _ => {}
        }
    }
}

fn check_inline_message(flow: &MessageFlow, file: &str, out: &mut Vec<Diagnostic>) {
    let Some(body) = &flow.body else {
        return;
    };
    let versioned = flow.message.version.is_some()
        || body.iter().any(|s| matches!(s, Statement::Version { .. }));
    if !versioned {
        out.push(missing_version(
            file,
            flow.message.span,
            flow.message_kind.keyword(),
            &flow.message.name,
        ));
    }
}

fn missing_version(
    file: &str,
    span: crate::ast::Span,
    keyword: &str,
    name: &str,
) -> Diagnostic {
    Diagnostic::new(
        Severity::Warning,
        DiagnosticKind::MissingVersion,
        file,
        span,
        format!("{} '{}' has no version", keyword, name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn warnings(src: &str) -> Vec<Diagnostic> {
        let out = parse(src, "v.ec");
        assert!(!out.has_errors(), "{:?}", out.diagnostics);
        check_versions(&out.program, "v.ec")
    }

    #[test]
    fn braced_service_without_version_warns() {
        let diags = warnings("service Orders {\n  summary \"x\"\n}");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert!(diags[0].message.contains("service 'Orders'"));
    }

    #[test]
    fn inline_declarations_and_unversioned_kinds_are_exempt() {
        assert!(warnings("event Placed\nactor Customer {\n  summary \"x\"\n}\nteam Core {}").is_empty());
    }

    #[test]
    fn nested_and_inline_message_bodies_are_checked() {
        let diags = warnings(
            r#"domain Sales {
  version 1.0.0
  subdomain Billing {
    summary "no version"
  }
  sends event Placed {
    summary "inline"
  }
  sends event Shipped@1.0.0 {
    summary "versioned by reference"
  }
}"#,
        );
        let names: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            names,
            ["subdomain 'Billing' has no version", "event 'Placed' has no version"]
        );
    }
}
