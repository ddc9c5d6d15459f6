//! Which statements may appear in which body.
//!
//! The parser consults [`is_allowed`] after classifying a statement by its
//! leading keyword and before parsing the rest of it.

use crate::ast::{DefinitionKind, FlagField, MessageKind, StatementKind, TextField};

use DefinitionKind as D;
use StatementKind as S;

const METADATA: &[StatementKind] = &[
    S::Version,
    S::Text(TextField::Name),
    S::Text(TextField::Summary),
    S::Owner,
    S::Flag(FlagField::Draft),
    S::Flag(FlagField::Deprecated),
    S::Annotation,
];

const DOMAIN: &[StatementKind] = &[
    S::Definition(D::Subdomain),
    S::Definition(D::Service),
    S::Definition(D::Channel),
    S::Definition(D::Container),
    S::Definition(D::DataProduct),
    S::Definition(D::Flow),
    S::Reference(D::Service),
    S::Reference(D::Container),
    S::Reference(D::Flow),
    S::Reference(D::DataProduct),
    S::Sends,
    S::Receives,
];

const SERVICE: &[StatementKind] = &[
    S::Text(TextField::Schema),
    S::Sends,
    S::Receives,
    S::WritesTo,
    S::ReadsFrom,
    S::Reference(D::Flow),
    S::Reference(D::Container),
];

const MESSAGE: &[StatementKind] = &[S::Text(TextField::Schema)];

const CHANNEL: &[StatementKind] = &[
    S::Text(TextField::Address),
    S::Text(TextField::Protocol),
    S::Parameter,
    S::Route,
];

const CONTAINER: &[StatementKind] = &[
    S::Text(TextField::ContainerType),
    S::Text(TextField::Technology),
    S::Text(TextField::AccessMode),
    S::Text(TextField::Classification),
    S::Flag(FlagField::Authoritative),
    S::Text(TextField::Residency),
    S::Text(TextField::Retention),
];

const DATA_PRODUCT: &[StatementKind] = &[S::Input, S::Output];

const FLOW: &[StatementKind] = &[S::EntryChain, S::When];

const USER: &[StatementKind] = &[
    S::Text(TextField::Name),
    S::Text(TextField::Summary),
    S::Text(TextField::Email),
    S::Text(TextField::Role),
    S::Text(TextField::Slack),
    S::Text(TextField::Avatar),
    S::Annotation,
];

const TEAM: &[StatementKind] = &[
    S::Text(TextField::Name),
    S::Text(TextField::Summary),
    S::Text(TextField::Email),
    S::Text(TextField::Slack),
    S::Text(TextField::Avatar),
    S::Member,
    S::Annotation,
];

const PARTICIPANT: &[StatementKind] = &[
    S::Text(TextField::Name),
    S::Text(TextField::Summary),
    S::Annotation,
];

const VISUALIZER: &[StatementKind] = &[
    S::Text(TextField::Name),
    S::Text(TextField::Summary),
    S::Annotation,
    S::Flag(FlagField::Animated),
    S::Flag(FlagField::Legend),
    S::Flag(FlagField::Search),
    S::Flag(FlagField::Toolbar),
    S::Flag(FlagField::FocusMode),
    S::Text(TextField::Style),
    S::Definition(D::Domain),
    S::Definition(D::Service),
    S::Definition(D::Channel),
    S::Definition(D::Container),
    S::Definition(D::DataProduct),
    S::Definition(D::Flow),
    S::Definition(D::Actor),
    S::Definition(D::ExternalSystem),
    S::Definition(D::Message(MessageKind::Event)),
    S::Definition(D::Message(MessageKind::Command)),
    S::Definition(D::Message(MessageKind::Query)),
    S::Reference(D::Domain),
    S::Reference(D::Service),
    S::Reference(D::Channel),
    S::Reference(D::Container),
    S::Reference(D::DataProduct),
    S::Reference(D::Flow),
    S::Reference(D::Actor),
    S::Reference(D::ExternalSystem),
    S::Reference(D::Message(MessageKind::Event)),
    S::Reference(D::Message(MessageKind::Command)),
    S::Reference(D::Message(MessageKind::Query)),
];

/// Kind-specific statements for `body`. Versionable kinds also accept
/// [`METADATA`].
fn specific(body: DefinitionKind) -> &'static [StatementKind] {
    match body {
        D::Domain | D::Subdomain => DOMAIN,
        D::Service => SERVICE,
        D::Message(_) => MESSAGE,
        D::Channel => CHANNEL,
        D::Container => CONTAINER,
        D::DataProduct => DATA_PRODUCT,
        D::Flow => FLOW,
        D::Diagram => &[],
        D::User => USER,
        D::Team => TEAM,
        D::Actor | D::ExternalSystem => PARTICIPANT,
        D::Visualizer => VISUALIZER,
    }
}

fn takes_metadata(body: DefinitionKind) -> bool {
    body.is_versionable()
}

/// Whether `stmt` may appear directly inside a `body` definition.
pub fn is_allowed(body: DefinitionKind, stmt: StatementKind) -> bool {
    (takes_metadata(body) && METADATA.contains(&stmt)) || specific(body).contains(&stmt)
}

/// Every statement kind legal in `body`, metadata first.
pub fn allowed(body: DefinitionKind) -> Vec<StatementKind> {
    let mut all = Vec::new();
    if takes_metadata(body) {
        all.extend_from_slice(METADATA);
    }
    for stmt in specific(body) {
        if !all.contains(stmt) {
            all.push(*stmt);
        }
    }
    all
}

/// Top level accepts every definition kind except `subdomain`, which is
/// only meaningful nested in a domain.
pub fn is_allowed_at_top_level(kind: DefinitionKind) -> bool {
    kind != D::Subdomain
}
