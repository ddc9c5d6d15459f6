//! Read-only accessors over a definition body.
//!
//! Single-valued getters return the first matching statement; list getters
//! keep declaration order.

use crate::ast::{
    Annotation, CrossReference, DataPort, Definition, DefinitionKind, FlagField, FlowEntryChain,
    FlowWhenBlock, MessageFlow, ParameterDecl, Statement, TextField, VersionLiteral,
};

pub trait BodyQuery {
    fn statements(&self) -> &[Statement];

    fn text(&self, field: TextField) -> Option<&str> {
        self.statements().iter().find_map(|s| match s {
            Statement::Text { field: f, value, .. } if *f == field => Some(value.as_str()),
            _ => None,
        })
    }

    fn texts(&self, field: TextField) -> Vec<&str> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Text { field: f, value, .. } if *f == field => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    fn flag(&self, field: FlagField) -> Option<bool> {
        self.statements().iter().find_map(|s| match s {
            Statement::Flag { field: f, value, .. } if *f == field => Some(*value),
            _ => None,
        })
    }

    fn version(&self) -> Option<&VersionLiteral> {
        self.statements().iter().find_map(|s| match s {
            Statement::Version { value, .. } => Some(value),
            _ => None,
        })
    }

    fn name(&self) -> Option<&str> {
        self.text(TextField::Name)
    }

    fn summary(&self) -> Option<&str> {
        self.text(TextField::Summary)
    }

    fn schema(&self) -> Option<&str> {
        self.text(TextField::Schema)
    }

    fn owners(&self) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Owner { owner, .. } => Some(owner),
                _ => None,
            })
            .collect()
    }

    fn draft(&self) -> bool {
        self.flag(FlagField::Draft).unwrap_or(false)
    }

    fn deprecated(&self) -> bool {
        self.flag(FlagField::Deprecated).unwrap_or(false)
    }

    fn annotations(&self) -> Vec<&Annotation> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Annotation(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn sends(&self) -> Vec<&MessageFlow> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Sends(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn receives(&self) -> Vec<&MessageFlow> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Receives(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn writes_to(&self) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::WritesTo { container, .. } => Some(container),
                _ => None,
            })
            .collect()
    }

    fn reads_from(&self) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::ReadsFrom { container, .. } => Some(container),
                _ => None,
            })
            .collect()
    }

    /// Braced definitions of `kind` nested directly in this body.
    fn definitions(&self, kind: DefinitionKind) -> Vec<&Definition> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Definition(d) if d.kind == kind => Some(&**d),
                _ => None,
            })
            .collect()
    }

    fn services(&self) -> Vec<&Definition> {
        self.definitions(DefinitionKind::Service)
    }

    fn subdomains(&self) -> Vec<&Definition> {
        self.definitions(DefinitionKind::Subdomain)
    }

    /// Brace-less `<kind> <name>[@version]` statements.
    fn references(&self, kind: DefinitionKind) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Reference { kind: k, target, .. } if *k == kind => Some(target),
                _ => None,
            })
            .collect()
    }

    fn service_refs(&self) -> Vec<&CrossReference> {
        self.references(DefinitionKind::Service)
    }

    fn address(&self) -> Option<&str> {
        self.text(TextField::Address)
    }

    fn protocols(&self) -> Vec<&str> {
        self.texts(TextField::Protocol)
    }

    fn parameters(&self) -> Vec<&ParameterDecl> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Parameter(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn routes(&self) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Route { target, .. } => Some(target),
                _ => None,
            })
            .collect()
    }

    fn container_type(&self) -> Option<&str> {
        self.text(TextField::ContainerType)
    }

    fn technology(&self) -> Option<&str> {
        self.text(TextField::Technology)
    }

    fn access_mode(&self) -> Option<&str> {
        self.text(TextField::AccessMode)
    }

    fn classification(&self) -> Option<&str> {
        self.text(TextField::Classification)
    }

    fn authoritative(&self) -> Option<bool> {
        self.flag(FlagField::Authoritative)
    }

    fn residency(&self) -> Option<&str> {
        self.text(TextField::Residency)
    }

    fn retention(&self) -> Option<&str> {
        self.text(TextField::Retention)
    }

    fn inputs(&self) -> Vec<&DataPort> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Input(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn outputs(&self) -> Vec<&DataPort> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Output(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn members(&self) -> Vec<&CrossReference> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Member { member, .. } => Some(member),
                _ => None,
            })
            .collect()
    }

    fn email(&self) -> Option<&str> {
        self.text(TextField::Email)
    }

    fn role(&self) -> Option<&str> {
        self.text(TextField::Role)
    }

    fn slack(&self) -> Option<&str> {
        self.text(TextField::Slack)
    }

    fn avatar(&self) -> Option<&str> {
        self.text(TextField::Avatar)
    }

    fn animated(&self) -> Option<bool> {
        self.flag(FlagField::Animated)
    }

    fn legend(&self) -> Option<bool> {
        self.flag(FlagField::Legend)
    }

    fn search(&self) -> Option<bool> {
        self.flag(FlagField::Search)
    }

    fn toolbar(&self) -> Option<bool> {
        self.flag(FlagField::Toolbar)
    }

    fn focus_mode(&self) -> Option<bool> {
        self.flag(FlagField::FocusMode)
    }

    fn style(&self) -> Option<&str> {
        self.text(TextField::Style)
    }

    fn entry_chains(&self) -> Vec<&FlowEntryChain> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::EntryChain(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn when_blocks(&self) -> Vec<&FlowWhenBlock> {
        self.statements()
            .iter()
            .filter_map(|s| match s {
                Statement::When(w) => Some(w),
                _ => None,
            })
            .collect()
    }
}

impl BodyQuery for [Statement] {
    fn statements(&self) -> &[Statement] {
        self
    }
}

impl BodyQuery for Vec<Statement> {
    fn statements(&self) -> &[Statement] {
        self
    }
}

impl BodyQuery for Definition {
    fn statements(&self) -> &[Statement] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn first(src: &str) -> Definition {
        let out = parse(src, "q.ec");
        assert!(!out.has_errors(), "{:?}", out.diagnostics);
        out.program.definitions.into_iter().next().unwrap()
    }

    #[test]
    fn domain_version_and_summary() {
        let d = first("domain Sales {\n  version 1.2.3\n  summary \"Sales domain\"\n}");
        assert_eq!(d.version().map(|v| v.as_str()), Some("1.2.3"));
        assert_eq!(d.summary(), Some("Sales domain"));
        assert!(!d.draft());
    }

    #[test]
    fn first_match_wins_for_single_valued_getters() {
        let d = first("service S {\n  version 1.0.0\n  version 2.0.0\n  deprecated true\n}");
        assert_eq!(d.version().unwrap().as_str(), "1.0.0");
        assert!(d.deprecated());
    }

    #[test]
    fn duplicate_owners_are_preserved() {
        let d = first("service S {\n  version 1.0.0\n  owner core\n  owner core\n}");
        assert_eq!(d.owners().len(), 2);
    }

    #[test]
    fn routes_keep_order_and_versions() {
        let d = first("channel c {\n  version 1.0.0\n  route A\n  route B@2.0.0\n}");
        let routes = d.routes();
        assert_eq!(routes[0].name, "A");
        assert!(routes[0].version.is_none());
        assert_eq!(routes[1].version.as_ref().unwrap().as_str(), "2.0.0");
    }

    #[test]
    fn visualizer_display_flags() {
        let d = first("visualizer Main {\n  animated true\n  legend false\n  style wide\n  domain Sales\n}");
        assert_eq!(d.animated(), Some(true));
        assert_eq!(d.legend(), Some(false));
        assert_eq!(d.search(), None);
        assert_eq!(d.style(), Some("wide"));
        assert_eq!(d.references(DefinitionKind::Domain).len(), 1);
    }

    #[test]
    fn user_contact_fields() {
        let d = first("user jdoe {\n  name \"Jane\"\n  email \"jane@example.com\"\n  role \"Lead\"\n}");
        assert_eq!(d.email(), Some("jane@example.com"));
        assert_eq!(d.role(), Some("Lead"));
        assert_eq!(d.slack(), None);
    }
}
