//! AST types shared by every pass.
//!
//! Nodes are built once by the parser and never change afterwards, with one
//! exception: the `resolution` slot of each [`CrossReference`], which the
//! linker fills in (and may refill when the symbol index is rebuilt).

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

// ──────────────────────────────────────────────
// Spans
// ──────────────────────────────────────────────

/// Byte range into the source text plus the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32) -> Self {
        Span { start, end, line }
    }

    /// Span covering `self` through `other`, keeping `self`'s line.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
        }
    }
}

// ──────────────────────────────────────────────
// Kinds
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Event,
    Command,
    Query,
}

impl MessageKind {
    pub fn keyword(self) -> &'static str {
        match self {
            MessageKind::Event => "event",
            MessageKind::Command => "command",
            MessageKind::Query => "query",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "event" => Some(MessageKind::Event),
            "command" => Some(MessageKind::Command),
            "query" => Some(MessageKind::Query),
            _ => None,
        }
    }
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.keyword())
    }
}

/// The kind of a definition, and of the symbols it contributes to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    Domain,
    Subdomain,
    Service,
    Channel,
    Container,
    Flow,
    User,
    Team,
    DataProduct,
    Diagram,
    Message(MessageKind),
    Actor,
    ExternalSystem,
    Visualizer,
}

/// The set of kinds a reference site accepts.
pub type KindSet = &'static [DefinitionKind];

/// Kind sets used by the parser when it creates reference sites.
pub mod kinds {
    use super::DefinitionKind::*;
    use super::KindSet;
    use super::MessageKind::*;

    pub const MESSAGES: KindSet = &[Message(Event), Message(Command), Message(Query)];
    pub const CHANNELS: KindSet = &[Channel];
    pub const CONTAINERS: KindSet = &[Container];
    pub const OWNERS: KindSet = &[Team, User];
    pub const USERS: KindSet = &[User];
    /// Who can act in a when-block.
    pub const PARTICIPANTS: KindSet = &[Actor, Service, ExternalSystem];
    /// Anything an entry chain may pass through.
    pub const CHAIN_NODES: KindSet = &[
        Actor,
        ExternalSystem,
        Service,
        Message(Event),
        Message(Command),
        Message(Query),
        Container,
        Channel,
        DataProduct,
        Flow,
    ];
}

impl DefinitionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DefinitionKind::Domain => "domain",
            DefinitionKind::Subdomain => "subdomain",
            DefinitionKind::Service => "service",
            DefinitionKind::Channel => "channel",
            DefinitionKind::Container => "container",
            DefinitionKind::Flow => "flow",
            DefinitionKind::User => "user",
            DefinitionKind::Team => "team",
            DefinitionKind::DataProduct => "data-product",
            DefinitionKind::Diagram => "diagram",
            DefinitionKind::Message(m) => m.keyword(),
            DefinitionKind::Actor => "actor",
            DefinitionKind::ExternalSystem => "external-system",
            DefinitionKind::Visualizer => "visualizer",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "domain" => DefinitionKind::Domain,
            "subdomain" => DefinitionKind::Subdomain,
            "service" => DefinitionKind::Service,
            "channel" => DefinitionKind::Channel,
            "container" => DefinitionKind::Container,
            "flow" => DefinitionKind::Flow,
            "user" => DefinitionKind::User,
            "team" => DefinitionKind::Team,
            "data-product" => DefinitionKind::DataProduct,
            "diagram" => DefinitionKind::Diagram,
            "actor" => DefinitionKind::Actor,
            "external-system" => DefinitionKind::ExternalSystem,
            "visualizer" => DefinitionKind::Visualizer,
            other => DefinitionKind::Message(MessageKind::from_keyword(other)?),
        })
    }

    /// Kinds that carry a version statement.
    pub fn is_versionable(self) -> bool {
        matches!(
            self,
            DefinitionKind::Domain
                | DefinitionKind::Subdomain
                | DefinitionKind::Service
                | DefinitionKind::Channel
                | DefinitionKind::Container
                | DefinitionKind::Flow
                | DefinitionKind::Message(_)
                | DefinitionKind::DataProduct
                | DefinitionKind::Diagram
        )
    }

    pub fn is_message(self) -> bool {
        matches!(self, DefinitionKind::Message(_))
    }

    /// The singleton kind set for a reference statement naming this kind.
    pub fn as_set(self) -> KindSet {
        match self {
            DefinitionKind::Domain => &[DefinitionKind::Domain],
            DefinitionKind::Subdomain => &[DefinitionKind::Subdomain],
            DefinitionKind::Service => &[DefinitionKind::Service],
            DefinitionKind::Channel => &[DefinitionKind::Channel],
            DefinitionKind::Container => &[DefinitionKind::Container],
            DefinitionKind::Flow => &[DefinitionKind::Flow],
            DefinitionKind::User => &[DefinitionKind::User],
            DefinitionKind::Team => &[DefinitionKind::Team],
            DefinitionKind::DataProduct => &[DefinitionKind::DataProduct],
            DefinitionKind::Diagram => &[DefinitionKind::Diagram],
            DefinitionKind::Message(MessageKind::Event) => {
                &[DefinitionKind::Message(MessageKind::Event)]
            }
            DefinitionKind::Message(MessageKind::Command) => {
                &[DefinitionKind::Message(MessageKind::Command)]
            }
            DefinitionKind::Message(MessageKind::Query) => {
                &[DefinitionKind::Message(MessageKind::Query)]
            }
            DefinitionKind::Actor => &[DefinitionKind::Actor],
            DefinitionKind::ExternalSystem => &[DefinitionKind::ExternalSystem],
            DefinitionKind::Visualizer => &[DefinitionKind::Visualizer],
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl Serialize for DefinitionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.keyword())
    }
}

// ──────────────────────────────────────────────
// Versions
// ──────────────────────────────────────────────

/// A syntactically valid version literal: dot-separated, non-empty,
/// ASCII-alphanumeric segments, optionally followed by a `-` prerelease
/// suffix of the same shape (`1.0.0-beta.2`). No semantic ordering is
/// implied by the parser; see [`VersionLiteral::cmp_segments`] for the ordering used by
/// the `highest-version` policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionLiteral(String);

impl VersionLiteral {
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.is_empty() {
            return Err("empty version literal".to_owned());
        }
        let dotted = |part: &str| {
            part.split('.')
                .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric()))
        };
        let well_formed = match text.split_once('-') {
            Some((core, pre)) => dotted(core) && dotted(pre),
            None => dotted(text),
        };
        if !well_formed {
            return Err(format!("malformed version literal '{}'", text));
        }
        Ok(VersionLiteral(text.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dot-separated segments before any prerelease suffix.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.release().split('.')
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.0.split_once('-').map(|(_, pre)| pre)
    }

    fn release(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(core, _)| core)
    }

    /// Segment-wise ordering: numeric segments compare numerically and sort
    /// before alphanumeric ones, which compare lexically; a strict prefix is
    /// lower. Equal release segments put a prerelease below the plain
    /// release, and two prereleases compare the same way segment by segment.
    pub fn cmp_segments(&self, other: &VersionLiteral) -> Ordering {
        cmp_dotted(self.segments(), other.segments()).then_with(|| {
            match (self.prerelease(), other.prerelease()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp_dotted(a.split('.'), b.split('.')),
            }
        })
    }
}

fn cmp_dotted<'s>(
    mut left: impl Iterator<Item = &'s str>,
    mut right: impl Iterator<Item = &'s str>,
) -> Ordering {
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => {
                let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => a.cmp(b),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

impl fmt::Display for VersionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ──────────────────────────────────────────────
// Cross-references
// ──────────────────────────────────────────────

/// Stable handle to an indexed symbol: the document's position in the
/// compilation unit, then the index path through nested bodies (top-level
/// definition index first, then statement indices).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId {
    pub document: usize,
    pub path: Vec<usize>,
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)?;
        for step in &self.path {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

/// A resolved reference target, tagged with the kind it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub kind: DefinitionKind,
    pub id: SymbolId,
    pub version: Option<VersionLiteral>,
}

/// Outcome of linking one reference site.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "targets", rename_all = "kebab-case")]
pub enum Resolution {
    /// The linker has not visited this reference yet.
    #[default]
    Pending,
    Resolved(Target),
    /// Several kinds in the reference's kind set declare the name.
    Ambiguous(Vec<Target>),
    Unresolved,
}

/// A `(name, optional version)` slot plus the kinds it may bind to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossReference {
    pub name: String,
    pub version: Option<VersionLiteral>,
    pub expected: KindSet,
    pub span: Span,
    pub resolution: Resolution,
}

impl CrossReference {
    pub fn new(
        name: impl Into<String>,
        version: Option<VersionLiteral>,
        expected: KindSet,
        span: Span,
    ) -> Self {
        CrossReference {
            name: name.into(),
            version,
            expected,
            span,
            resolution: Resolution::Pending,
        }
    }

    pub fn target(&self) -> Option<&Target> {
        match &self.resolution {
            Resolution::Resolved(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target().is_some()
    }

    /// `name` or `name@version`, as written.
    pub fn display_name(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.clone(),
        }
    }
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

/// Single-valued text statements. Some take a quoted string, the rest a
/// bare identifier (see [`TextField::is_quoted`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextField {
    Name,
    Summary,
    Schema,
    Address,
    Protocol,
    Technology,
    Residency,
    Retention,
    Email,
    Role,
    Slack,
    Avatar,
    ContainerType,
    AccessMode,
    Classification,
    Style,
}

impl TextField {
    pub const ALL: [TextField; 16] = [
        TextField::Name,
        TextField::Summary,
        TextField::Schema,
        TextField::Address,
        TextField::Protocol,
        TextField::Technology,
        TextField::Residency,
        TextField::Retention,
        TextField::Email,
        TextField::Role,
        TextField::Slack,
        TextField::Avatar,
        TextField::ContainerType,
        TextField::AccessMode,
        TextField::Classification,
        TextField::Style,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Summary => "summary",
            TextField::Schema => "schema",
            TextField::Address => "address",
            TextField::Protocol => "protocol",
            TextField::Technology => "technology",
            TextField::Residency => "residency",
            TextField::Retention => "retention",
            TextField::Email => "email",
            TextField::Role => "role",
            TextField::Slack => "slack",
            TextField::Avatar => "avatar",
            TextField::ContainerType => "container-type",
            TextField::AccessMode => "access-mode",
            TextField::Classification => "classification",
            TextField::Style => "style",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        TextField::ALL.into_iter().find(|f| f.keyword() == word)
    }

    /// Whether the value is written as a quoted string.
    pub fn is_quoted(self) -> bool {
        !matches!(
            self,
            TextField::ContainerType
                | TextField::AccessMode
                | TextField::Classification
                | TextField::Style
        )
    }
}

/// Boolean statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagField {
    Draft,
    Deprecated,
    Authoritative,
    Animated,
    Legend,
    Search,
    Toolbar,
    FocusMode,
}

impl FlagField {
    pub const ALL: [FlagField; 8] = [
        FlagField::Draft,
        FlagField::Deprecated,
        FlagField::Authoritative,
        FlagField::Animated,
        FlagField::Legend,
        FlagField::Search,
        FlagField::Toolbar,
        FlagField::FocusMode,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            FlagField::Draft => "draft",
            FlagField::Deprecated => "deprecated",
            FlagField::Authoritative => "authoritative",
            FlagField::Animated => "animated",
            FlagField::Legend => "legend",
            FlagField::Search => "search",
            FlagField::Toolbar => "toolbar",
            FlagField::FocusMode => "focus-mode",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        FlagField::ALL.into_iter().find(|f| f.keyword() == word)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnnotationValue {
    Str(String),
    Ident(String),
    Int(i64),
    Bool(bool),
    Version(VersionLiteral),
}

/// One annotation argument; positional when `key` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationArg {
    pub key: Option<String>,
    pub value: AnnotationValue,
}

impl AnnotationArg {
    pub fn is_positional(&self) -> bool {
        self.key.is_none()
    }
}

/// `@name(arg, key: value, ...)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<AnnotationArg>,
    pub span: Span,
}

impl Annotation {
    pub fn positional(&self) -> impl Iterator<Item = &AnnotationValue> {
        self.args
            .iter()
            .filter(|a| a.is_positional())
            .map(|a| &a.value)
    }

    pub fn named(&self, key: &str) -> Option<&AnnotationValue> {
        self.args
            .iter()
            .find(|a| a.key.as_deref() == Some(key))
            .map(|a| &a.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelDirection {
    To,
    From,
}

impl ChannelDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            ChannelDirection::To => "to",
            ChannelDirection::From => "from",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Push,
    Pull,
}

impl DeliveryMode {
    pub fn keyword(self) -> &'static str {
        match self {
            DeliveryMode::Push => "push",
            DeliveryMode::Pull => "pull",
        }
    }
}

/// `to|from a[@v], b[@v] [delivery push|pull]`. The delivery mode belongs
/// to the whole clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelClause {
    pub direction: ChannelDirection,
    pub channels: Vec<CrossReference>,
    pub delivery: Option<DeliveryMode>,
    pub span: Span,
}

/// Body of a `sends` or `receives` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageFlow {
    pub message_kind: MessageKind,
    pub message: CrossReference,
    pub channels: Option<ChannelClause>,
    /// Inline message definition, when a braced body follows.
    pub body: Option<Vec<Statement>>,
    pub span: Span,
}

/// Channel `parameter name { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDecl {
    pub name: String,
    pub description: Option<String>,
    pub default: Option<String>,
    pub enum_values: Vec<String>,
    pub examples: Vec<String>,
    pub span: Span,
}

/// Data product output `contract { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub path: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub span: Span,
}

/// Data product `input` / `output`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPort {
    pub message_kind: MessageKind,
    pub message: CrossReference,
    pub contract: Option<Contract>,
    pub span: Span,
}

/// One node of an entry chain, with its optional quoted label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainNode {
    pub target: CrossReference,
    pub label: Option<String>,
}

/// `A "label" -> B -> C` as written. The split into sources and targets
/// is computed after linking by the flow graph builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEntryChain {
    pub nodes: Vec<ChainNode>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerJoin {
    /// One trigger.
    Single,
    /// Triggers joined with `and`; all must have occurred.
    All,
}

/// `-> ["label":] Target`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowOutput {
    pub label: Option<String>,
    pub target: CrossReference,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowAction {
    pub participant: CrossReference,
    pub label: Option<String>,
    /// Empty for a terminal action.
    pub outputs: Vec<FlowOutput>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowWhenBlock {
    pub triggers: Vec<CrossReference>,
    pub join: TriggerJoin,
    pub actions: Vec<FlowAction>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Version {
        value: VersionLiteral,
        span: Span,
    },
    Text {
        field: TextField,
        value: String,
        span: Span,
    },
    Flag {
        field: FlagField,
        value: bool,
        span: Span,
    },
    Owner {
        owner: CrossReference,
        span: Span,
    },
    Member {
        member: CrossReference,
        span: Span,
    },
    Annotation(Annotation),
    Sends(MessageFlow),
    Receives(MessageFlow),
    WritesTo {
        container: CrossReference,
        span: Span,
    },
    ReadsFrom {
        container: CrossReference,
        span: Span,
    },
    /// Brace-less `<kind> <name>[@version]` nested in a body.
    Reference {
        kind: DefinitionKind,
        target: CrossReference,
        span: Span,
    },
    /// Braced definition nested in a body (subdomains, inline services, ...).
    Definition(Box<Definition>),
    Parameter(ParameterDecl),
    Route {
        target: CrossReference,
        span: Span,
    },
    Input(DataPort),
    Output(DataPort),
    EntryChain(FlowEntryChain),
    When(FlowWhenBlock),
}

/// Statement discriminant, used by the legality table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Version,
    Text(TextField),
    Flag(FlagField),
    Owner,
    Member,
    Annotation,
    Sends,
    Receives,
    WritesTo,
    ReadsFrom,
    Reference(DefinitionKind),
    Definition(DefinitionKind),
    Parameter,
    Route,
    Input,
    Output,
    EntryChain,
    When,
}

impl StatementKind {
    /// The keyword that introduces the statement, for diagnostics.
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Version => "version",
            StatementKind::Text(f) => f.keyword(),
            StatementKind::Flag(f) => f.keyword(),
            StatementKind::Owner => "owner",
            StatementKind::Member => "member",
            StatementKind::Annotation => "@annotation",
            StatementKind::Sends => "sends",
            StatementKind::Receives => "receives",
            StatementKind::WritesTo => "writes-to",
            StatementKind::ReadsFrom => "reads-from",
            StatementKind::Reference(k) | StatementKind::Definition(k) => k.keyword(),
            StatementKind::Parameter => "parameter",
            StatementKind::Route => "route",
            StatementKind::Input => "input",
            StatementKind::Output => "output",
            StatementKind::EntryChain => "->",
            StatementKind::When => "when",
        }
    }
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Version { .. } => StatementKind::Version,
            Statement::Text { field, .. } => StatementKind::Text(*field),
            Statement::Flag { field, .. } => StatementKind::Flag(*field),
            Statement::Owner { .. } => StatementKind::Owner,
            Statement::Member { .. } => StatementKind::Member,
            Statement::Annotation(_) => StatementKind::Annotation,
            Statement::Sends(_) => StatementKind::Sends,
            Statement::Receives(_) => StatementKind::Receives,
            Statement::WritesTo { .. } => StatementKind::WritesTo,
            Statement::ReadsFrom { .. } => StatementKind::ReadsFrom,
            Statement::Reference { kind, .. } => StatementKind::Reference(*kind),
            Statement::Definition(def) => StatementKind::Definition(def.kind),
            Statement::Parameter(_) => StatementKind::Parameter,
            Statement::Route { .. } => StatementKind::Route,
            Statement::Input(_) => StatementKind::Input,
            Statement::Output(_) => StatementKind::Output,
            Statement::EntryChain(_) => StatementKind::EntryChain,
            Statement::When(_) => StatementKind::When,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Version { span, .. }
            | Statement::Text { span, .. }
            | Statement::Flag { span, .. }
            | Statement::Owner { span, .. }
            | Statement::Member { span, .. }
            | Statement::WritesTo { span, .. }
            | Statement::ReadsFrom { span, .. }
            | Statement::Reference { span, .. }
            | Statement::Route { span, .. } => *span,
            Statement::Annotation(a) => a.span,
            Statement::Sends(m) | Statement::Receives(m) => m.span,
            Statement::Definition(d) => d.span,
            Statement::Parameter(p) => p.span,
            Statement::Input(p) | Statement::Output(p) => p.span,
            Statement::EntryChain(c) => c.span,
            Statement::When(w) => w.span,
        }
    }
}

// ──────────────────────────────────────────────
// Definitions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    /// Value of the first `version` statement in the body, if any.
    pub version: Option<VersionLiteral>,
    pub body: Vec<Statement>,
    /// Brace-less declaration such as `actor Customer`.
    pub inline: bool,
    pub span: Span,
    pub name_span: Span,
}

/// One parsed document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub definitions: Vec<Definition>,
}

impl Program {
    /// Span-free, resolution-free JSON view used to compare two programs
    /// structurally (for example a program and its printed-then-reparsed
    /// copy).
    pub fn structure(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        strip_positions(&mut value);
        value
    }

    /// Visit every reference site in declaration order.
    pub fn for_each_reference(&self, f: &mut dyn FnMut(&CrossReference)) {
        for def in &self.definitions {
            for stmt in &def.body {
                visit_statement(stmt, f);
            }
        }
    }

    /// Visit every reference site mutably, in declaration order.
    pub fn for_each_reference_mut(&mut self, f: &mut dyn FnMut(&mut CrossReference)) {
        for def in &mut self.definitions {
            for stmt in &mut def.body {
                visit_statement_mut(stmt, f);
            }
        }
    }
}

fn strip_positions(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("span");
            map.remove("name_span");
            map.remove("resolution");
            for v in map.values_mut() {
                strip_positions(v);
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                strip_positions(v);
            }
        }
        _ => {}
    }
}

fn visit_statement(stmt: &Statement, f: &mut dyn FnMut(&CrossReference)) {
    match stmt {
        Statement::Owner { owner: r, .. }
        | Statement::Member { member: r, .. }
        | Statement::WritesTo { container: r, .. }
        | Statement::ReadsFrom { container: r, .. }
        | Statement::Reference { target: r, .. }
        | Statement::Route { target: r, .. } => f(r),
        Statement::Sends(flow) | Statement::Receives(flow) => {
            f(&flow.message);
            if let Some(clause) = &flow.channels {
                clause.channels.iter().for_each(|c| f(c));
            }
            for inner in flow.body.iter().flatten() {
                visit_statement(inner, f);
            }
        }
        Statement::Definition(def) => {
            for inner in &def.body {
                visit_statement(inner, f);
            }
        }
        Statement::Input(port) | Statement::Output(port) => f(&port.message),
        Statement::EntryChain(chain) => chain.nodes.iter().for_each(|n| f(&n.target)),
        Statement::When(block) => {
            block.triggers.iter().for_each(|t| f(t));
            for action in &block.actions {
                f(&action.participant);
                action.outputs.iter().for_each(|o| f(&o.target));
            }
        }
        Statement::Version { .. }
        | Statement::Text { .. }
        | Statement::Flag { .. }
        | Statement::Annotation(_)
        | Statement::Parameter(_) => {}
    }
}

fn visit_statement_mut(stmt: &mut Statement, f: &mut dyn FnMut(&mut CrossReference)) {
    match stmt {
        Statement::Owner { owner: r, .. }
        | Statement::Member { member: r, .. }
        | Statement::WritesTo { container: r, .. }
        | Statement::ReadsFrom { container: r, .. }
        | Statement::Reference { target: r, .. }
        | Statement::Route { target: r, .. } => f(r),
        Statement::Sends(flow) | Statement::Receives(flow) => {
            f(&mut flow.message);
            if let Some(clause) = &mut flow.channels {
                clause.channels.iter_mut().for_each(|c| f(c));
            }
            for inner in flow.body.iter_mut().flatten() {
                visit_statement_mut(inner, f);
            }
        }
        Statement::Definition(def) => {
            for inner in &mut def.body {
                visit_statement_mut(inner, f);
            }
        }
        Statement::Input(port) | Statement::Output(port) => f(&mut port.message),
        Statement::EntryChain(chain) => chain.nodes.iter_mut().for_each(|n| f(&mut n.target)),
        Statement::When(block) => {
            block.triggers.iter_mut().for_each(|t| f(t));
            for action in &mut block.actions {
                f(&mut action.participant);
                action.outputs.iter_mut().for_each(|o| f(&mut o.target));
            }
        }
        Statement::Version { .. }
        | Statement::Text { .. }
        | Statement::Flag { .. }
        | Statement::Annotation(_)
        | Statement::Parameter(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_literal_accepts_dotted_alphanumeric_segments() {
        assert!(VersionLiteral::parse("1.0.0").is_ok());
        assert!(VersionLiteral::parse("2").is_ok());
        assert!(VersionLiteral::parse("1.0.rc1").is_ok());
    }

    #[test]
    fn version_literal_accepts_prerelease_suffix() {
        let v = VersionLiteral::parse("1.0.0-beta.2").unwrap();
        assert_eq!(v.segments().collect::<Vec<_>>(), ["1", "0", "0"]);
        assert_eq!(v.prerelease(), Some("beta.2"));
        assert!(VersionLiteral::parse("1.0.0-").is_err());
        assert!(VersionLiteral::parse("1.0.0-beta..1").is_err());
        assert!(VersionLiteral::parse("1.0.0-beta-1").is_err());
    }

    #[test]
    fn version_literal_rejects_empty_segments_and_punctuation() {
        assert!(VersionLiteral::parse("1..0").is_err());
        assert!(VersionLiteral::parse("1.0.").is_err());
        assert!(VersionLiteral::parse("1.0.0_beta").is_err());
        assert!(VersionLiteral::parse("").is_err());
    }

    #[test]
    fn segment_ordering_is_numeric_where_possible() {
        let v = |s: &str| VersionLiteral::parse(s).unwrap();
        assert_eq!(v("10.0.0").cmp_segments(&v("9.0.0")), Ordering::Greater);
        assert_eq!(v("1.0").cmp_segments(&v("1.0.0")), Ordering::Less);
        assert_eq!(v("1.0.1").cmp_segments(&v("1.0.1")), Ordering::Equal);
        assert_eq!(v("1.0.rc1").cmp_segments(&v("1.0.0")), Ordering::Greater);
    }

    #[test]
    fn prerelease_sorts_below_its_release() {
        let v = |s: &str| VersionLiteral::parse(s).unwrap();
        assert_eq!(v("1.0.0-beta").cmp_segments(&v("1.0.0")), Ordering::Less);
        assert_eq!(v("1.0.0-beta").cmp_segments(&v("0.9.9")), Ordering::Greater);
        assert_eq!(v("1.0.0-rc.10").cmp_segments(&v("1.0.0-rc.9")), Ordering::Greater);
        assert_eq!(v("1.0.0-alpha").cmp_segments(&v("1.0.0-beta")), Ordering::Less);
    }

    #[test]
    fn keywords_round_trip_through_definition_kind() {
        for word in ["domain", "event", "data-product", "external-system", "query"] {
            let kind = DefinitionKind::from_keyword(word).unwrap();
            assert_eq!(kind.keyword(), word);
        }
        assert!(DefinitionKind::from_keyword("message").is_none());
    }

    #[test]
    fn kind_set_of_a_kind_contains_only_that_kind() {
        let kind = DefinitionKind::Message(MessageKind::Command);
        assert_eq!(kind.as_set(), &[kind]);
    }
}
