//! ec-core: front end for the event-catalog architecture DSL.
//!
//! Turns `.ec` source text into a linked AST plus flow graphs:
//!
//! ```text
//! source ─lexer─▶ tokens ─parser─▶ Program ─index/link─▶ linked Program ─▶ FlowGraph
//! ```
//!
//! # Public API
//!
//! - [`compile()`] -- parse, index, link, validate and build flow graphs for
//!   a compilation unit
//! - [`parse()`] / [`parse_source()`] -- parse one document
//! - [`Workspace`] -- incremental reparsing with last-writer-wins updates
//! - [`load_unit()`] -- assemble a unit from files or directories through a
//!   [`SourceProvider`]
//! - [`BodyQuery`] -- read-only accessors over definition bodies
//! - [`print_program()`] / [`format_source()`] -- canonical printer and
//!   source formatter

pub mod ast;
pub mod compile;
pub mod error;
pub mod flow_graph;
pub mod format;
pub mod index;
pub mod legality;
pub mod lexer;
pub mod link;
pub mod options;
pub mod parser;
pub mod printer;
pub mod query;
pub mod source;
pub mod unit;
pub mod validate;
pub mod workspace;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    CrossReference, Definition, DefinitionKind, MessageKind, Program, Resolution, Span,
    Statement, SymbolId, Target, VersionLiteral,
};
pub use compile::{Compilation, Document, SymbolNode};
pub use error::{Diagnostic, DiagnosticKind, LoadError, Severity};
pub use flow_graph::FlowGraph;
pub use index::{ResourceKey, Symbol, SymbolIndex};
pub use link::{HighestVersion, LatestDeclared, VersionPolicy};
pub use options::{CompileOptions, VersionPolicyKind};
pub use query::BodyQuery;
pub use source::{FileSystemProvider, InMemoryProvider, SourceFile, SourceProvider};
pub use workspace::Workspace;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::compile;
pub use format::format_source;
pub use parser::{parse, parse_source, ParseOutput};
pub use printer::print_program;
pub use unit::load_unit;
