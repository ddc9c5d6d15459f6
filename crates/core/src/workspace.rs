//! Incremental compilation for editors.
//!
//! Documents are reparsed one at a time as they change; the symbol index is
//! rebuilt and every document relinked in one step by
//! [`Workspace::compile`]. Taking `&mut self` there keeps index rebuilds
//! and linking from overlapping.

use crate::compile::{link_documents, Compilation, Document};
use crate::options::CompileOptions;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    revision: u64,
    document: Document,
}

/// Open documents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    options: CompileOptions,
    /// Load order is the order of first insertion.
    order: Vec<String>,
    entries: BTreeMap<String, Entry>,
}

impl Workspace {
    pub fn new(options: CompileOptions) -> Self {
        Workspace {
            options,
            order: Vec::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Reparse `path` at `revision`. Returns `false` and keeps the stored
    /// document when `revision` is not newer than the one already held.
    pub fn update(&mut self, path: &str, revision: u64, text: &str) -> bool {
        if let Some(existing) = self.entries.get(path) {
            if revision <= existing.revision {
                tracing::debug!(
                    path,
                    revision,
                    current = existing.revision,
                    "ignoring stale update"
                );
                return false;
            }
        } else {
            self.order.push(path.to_owned());
        }
        let document = Document::parse(path, text, self.options.max_errors);
        self.entries
            .insert(path.to_owned(), Entry { revision, document });
        true
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.order.retain(|p| p != path);
        self.entries.remove(path).is_some()
    }

    pub fn revision(&self, path: &str) -> Option<u64> {
        self.entries.get(path).map(|e| e.revision)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the index and relink every open document.
    pub fn compile(&mut self) -> Compilation {
        let documents: Vec<Document> = self
            .order
            .iter()
            .filter_map(|p| self.entries.get(p))
            .map(|e| e.document.clone())
            .collect();
        let compilation = link_documents(documents, &self.options);
        // Keep the linked trees so the stored resolutions are current.
        for doc in &compilation.documents {
            if let Some(entry) = self.entries.get_mut(&doc.file) {
                entry.document = doc.clone();
            }
        }
        compilation
    }
}
