//! Assembling a compilation unit from paths.

use crate::error::LoadError;
use crate::source::{SourceFile, SourceProvider};
use std::collections::HashSet;
use std::path::PathBuf;

/// Expand `paths` (files or directories) into the unit's source files.
/// Order follows `paths`, then the provider's sorted listing; a file named
/// twice is loaded once, at its first position.
pub fn load_unit(
    paths: &[PathBuf],
    provider: &dyn SourceProvider,
    extension: &str,
) -> Result<Vec<SourceFile>, LoadError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for root in paths {
        let listed = provider
            .list_sources(root, extension)
            .map_err(|source| LoadError::List {
                path: root.clone(),
                source,
            })?;
        for path in listed {
            if !seen.insert(path.clone()) {
                continue;
            }
            let text = provider
                .read_source(&path)
                .map_err(|source| LoadError::Read {
                    path: path.clone(),
                    source,
                })?;
            files.push(SourceFile::new(path.display().to_string(), text));
        }
    }
    if files.is_empty() {
        return Err(LoadError::Empty {
            extension: extension.to_owned(),
        });
    }
    tracing::debug!(documents = files.len(), "loaded compilation unit");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryProvider;

    fn provider() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_file("/cat/services/orders.ec", "service Orders")
            .with_file("/cat/events.ec", "event Placed")
            .with_file("/cat/notes.md", "# notes")
    }

    #[test]
    fn directories_expand_in_sorted_order() {
        let files = load_unit(&[PathBuf::from("/cat")], &provider(), "ec").unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["/cat/events.ec", "/cat/services/orders.ec"]);
    }

    #[test]
    fn files_named_twice_load_once() {
        let files = load_unit(
            &[
                PathBuf::from("/cat/services/orders.ec"),
                PathBuf::from("/cat"),
            ],
            &provider(),
            "ec",
        )
        .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["/cat/services/orders.ec", "/cat/events.ec"]);
    }

    #[test]
    fn missing_path_is_a_list_error() {
        let err = load_unit(&[PathBuf::from("/nope")], &provider(), "ec").unwrap_err();
        assert!(matches!(err, LoadError::List { .. }));
    }

    #[test]
    fn no_matching_sources_is_an_error() {
        let provider = InMemoryProvider::new().with_file("/docs/readme.md", "");
        let err = load_unit(&[PathBuf::from("/docs")], &provider, "ec").unwrap_err();
        assert!(err.to_string().contains(".ec"));
    }
}
