//! Compilation pipeline: parse all → index → link → validate → flow graphs.
//!
//! This is a thin orchestrator over the pass modules. It never fails: every
//! problem in the sources ends up in [`Compilation::diagnostics`].

use crate::ast::{Definition, MessageFlow, Program, Statement, SymbolId};
use crate::error::Diagnostic;
use crate::flow_graph::{build_flow_graphs, FlowGraph};
use crate::index::{ResourceKey, SymbolIndex};
use crate::link::link_program;
use crate::options::CompileOptions;
use crate::parser::parse_source;
use crate::source::SourceFile;
use crate::validate::check_versions;

/// A parsed document and its syntax diagnostics.
#[derive(Debug, Clone)]
pub struct Document {
    pub file: String,
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn parse(file: &str, text: &str, max_errors: usize) -> Self {
        let out = parse_source(text, file, max_errors);
        Document {
            file: file.to_owned(),
            program: out.program,
            diagnostics: out.diagnostics,
        }
    }
}

/// The AST node an indexed symbol points at.
#[derive(Debug, Clone, Copy)]
pub enum SymbolNode<'a> {
    Definition(&'a Definition),
    /// A message declared by the braced body of a sends/receives statement.
    InlineMessage(&'a MessageFlow),
}

impl<'a> SymbolNode<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            SymbolNode::Definition(d) => &d.name,
            SymbolNode::InlineMessage(m) => &m.message.name,
        }
    }

    pub fn body(&self) -> &'a [Statement] {
        match self {
            SymbolNode::Definition(d) => &d.body,
            SymbolNode::InlineMessage(m) => m.body.as_deref().unwrap_or_default(),
        }
    }
}

/// Linked documents plus everything derived from them.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub documents: Vec<Document>,
    pub index: SymbolIndex,
    pub flows: Vec<FlowGraph>,
    /// Per document, in load order: syntax, then link-time, then semantic.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Walk a symbol id back to its node.
    pub fn node(&self, id: &SymbolId) -> Option<SymbolNode<'_>> {
        let program = &self.documents.get(id.document)?.program;
        let (first, rest) = id.path.split_first()?;
        let mut def = program.definitions.get(*first)?;
        for (n, step) in rest.iter().enumerate() {
            match def.body.get(*step)? {
                Statement::Definition(inner) => def = &**inner,
                Statement::Sends(flow) | Statement::Receives(flow)
                    if n + 1 == rest.len() && flow.body.is_some() =>
                {
                    return Some(SymbolNode::InlineMessage(flow));
                }
                _ => return None,
            }
        }
        Some(SymbolNode::Definition(def))
    }

    pub fn resource_keys(&self) -> Vec<ResourceKey> {
        self.index.resource_keys()
    }
}

/// Parse and link a whole compilation unit.
pub fn compile(sources: &[SourceFile], options: &CompileOptions) -> Compilation {
    let documents = sources
        .iter()
        .map(|s| Document::parse(&s.path, &s.text, options.max_errors))
        .collect();
    link_documents(documents, options)
}

/// Rebuild the index over already-parsed documents and relink them. Any
/// resolution left from a previous link is overwritten.
pub fn link_documents(mut documents: Vec<Document>, options: &CompileOptions) -> Compilation {
    let index = SymbolIndex::build(documents.iter().map(|d| (d.file.as_str(), &d.program)));
    let policy = options.version_policy.policy();

    let mut diagnostics = Vec::new();
    for doc in &mut documents {
        diagnostics.extend(doc.diagnostics.iter().cloned());
        diagnostics.extend(link_program(&mut doc.program, &doc.file, &index, policy));
        diagnostics.extend(check_versions(&doc.program, &doc.file));
    }

    let flows = build_flow_graphs(documents.iter().map(|d| (d.file.as_str(), &d.program)));
    tracing::debug!(
        documents = documents.len(),
        symbols = index.len(),
        flows = flows.len(),
        diagnostics = diagnostics.len(),
        policy = policy.name(),
        "compiled unit"
    );
    Compilation {
        documents,
        index,
        flows,
        diagnostics,
    }
}
