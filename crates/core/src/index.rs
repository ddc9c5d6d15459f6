//! Symbol index: `(kind, name) -> [symbols in declaration order]`.
//!
//! Built once per compilation unit after every document is parsed. The index
//! owns no AST nodes; each [`Symbol`] carries a [`SymbolId`] that can be
//! walked back to its node through the owning documents.

use crate::ast::{DefinitionKind, Program, Span, Statement, SymbolId, VersionLiteral};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub kind: DefinitionKind,
    pub name: String,
    pub version: Option<VersionLiteral>,
    pub id: SymbolId,
    pub file: String,
    pub span: Span,
    /// Position in compilation-unit declaration order.
    pub seq: usize,
}

/// `(kind, name, version)` handed to the content store for hydration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceKey {
    pub kind: DefinitionKind,
    pub name: String,
    pub version: Option<VersionLiteral>,
}

impl Symbol {
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey {
            kind: self.kind,
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

/// Append-only table of every definition in a compilation unit.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: Vec<Symbol>,
    by_key: HashMap<(DefinitionKind, String), Vec<usize>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every definition of every document, in document order and then
    /// pre-order through nested bodies.
    pub fn build<'p>(documents: impl IntoIterator<Item = (&'p str, &'p Program)>) -> Self {
        let mut index = SymbolIndex::new();
        let mut count = 0usize;
        for (doc, (file, program)) in documents.into_iter().enumerate() {
            for (i, def) in program.definitions.iter().enumerate() {
                let id = SymbolId {
                    document: doc,
                    path: vec![i],
                };
                index.push(def.kind, &def.name, def.version.clone(), id.clone(), file, def.name_span);
                index.index_body(&def.body, &id, file);
            }
            count += 1;
        }
        tracing::debug!(
            documents = count,
            symbols = index.len(),
            "built symbol index"
        );
        index
    }

    fn index_body(&mut self, body: &[Statement], parent: &SymbolId, file: &str) {
        for (j, stmt) in body.iter().enumerate() {
            let mut id = parent.clone();
            id.path.push(j);
            match stmt {
                Statement::Definition(def) => {
                    self.push(def.kind, &def.name, def.version.clone(), id.clone(), file, def.name_span);
                    self.index_body(&def.body, &id, file);
                }
                Statement::Sends(flow) | Statement::Receives(flow) => {
                    if let Some(inner) = &flow.body {
                        let version = inner
                            .iter()
                            .find_map(|s| match s {
                                Statement::Version { value, .. } => Some(value.clone()),
                                _ => None,
                            })
                            .or_else(|| flow.message.version.clone());
                        self.push(
                            DefinitionKind::Message(flow.message_kind),
                            &flow.message.name,
                            version,
                            id,
                            file,
                            flow.message.span,
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn push(
        &mut self,
        kind: DefinitionKind,
        name: &str,
        version: Option<VersionLiteral>,
        id: SymbolId,
        file: &str,
        span: Span,
    ) {
        let seq = self.symbols.len();
        self.symbols.push(Symbol {
            kind,
            name: name.to_owned(),
            version,
            id,
            file: file.to_owned(),
            span,
            seq,
        });
        self.by_key
            .entry((kind, name.to_owned()))
            .or_default()
            .push(seq);
    }

    /// Every symbol declared as `(kind, name)`, in declaration order.
    pub fn lookup(&self, kind: DefinitionKind, name: &str) -> Vec<&Symbol> {
        self.by_key
            .get(&(kind, name.to_owned()))
            .map(|seqs| seqs.iter().map(|&i| &self.symbols[i]).collect())
            .unwrap_or_default()
    }

    /// All symbols in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn resource_keys(&self) -> Vec<ResourceKey> {
        self.symbols.iter().map(Symbol::resource_key).collect()
    }
}
