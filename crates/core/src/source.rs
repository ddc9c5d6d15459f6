//! Source provider abstraction for filesystem-independent compilation.
//!
//! The [`SourceProvider`] trait abstracts file I/O so a compilation unit can
//! be assembled from disk or from memory (tests, editors holding unsaved
//! buffers).

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// One document of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display path, used in diagnostics and symbol records.
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Trait that abstracts file I/O for loading a compilation unit.
pub trait SourceProvider {
    /// Read the source text for a given path.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Source files under `path` with the given extension, in a stable
    /// (sorted) order. A path naming a single file yields just that file.
    fn list_sources(&self, path: &Path, extension: &str) -> Result<Vec<PathBuf>, std::io::Error>;
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Default filesystem-backed source provider.
pub struct FileSystemProvider;

impl FileSystemProvider {
    fn walk(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::walk(&path, extension, out)?;
            } else if has_extension(&path, extension) {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn list_sources(&self, path: &Path, extension: &str) -> Result<Vec<PathBuf>, std::io::Error> {
        if !path.is_dir() {
            // Surface a missing file as NotFound instead of an empty listing.
            std::fs::metadata(path)?;
            return Ok(vec![path.to_path_buf()]);
        }
        let mut out = Vec::new();
        Self::walk(path, extension, &mut out)?;
        out.sort();
        Ok(out)
    }
}

/// In-memory source provider for tests and editor buffers.
///
/// Maps paths to source text. Paths are normalized without touching the
/// filesystem.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    files: BTreeMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files
            .insert(Self::normalize_path(path.as_ref()), text.into());
    }

    /// Normalize a path by resolving `.` and `..` components without
    /// touching the filesystem.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }

    fn list_sources(&self, path: &Path, extension: &str) -> Result<Vec<PathBuf>, std::io::Error> {
        let normalized = Self::normalize_path(path);
        if self.files.contains_key(&normalized) {
            return Ok(vec![normalized]);
        }
        let found: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|k| k.starts_with(&normalized) && has_extension(k, extension))
            .cloned()
            .collect();
        if found.is_empty() && !self.files.keys().any(|k| k.starts_with(&normalized)) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("path not found in memory provider: {}", normalized.display()),
            ));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_resolves_dot_and_dotdot() {
        let p = Path::new("/a/b/../c/./d");
        assert_eq!(InMemoryProvider::normalize_path(p), PathBuf::from("/a/c/d"));
    }

    #[test]
    fn in_memory_read_source_found() {
        let provider = InMemoryProvider::new().with_file("/cat/orders.ec", "event Placed");
        let content = provider.read_source(Path::new("/cat/./orders.ec")).unwrap();
        assert_eq!(content, "event Placed");
    }

    #[test]
    fn in_memory_read_source_not_found() {
        let err = InMemoryProvider::new()
            .read_source(Path::new("/missing.ec"))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn in_memory_listing_is_sorted_and_filtered() {
        let provider = InMemoryProvider::new()
            .with_file("/cat/z.ec", "")
            .with_file("/cat/a/b.ec", "")
            .with_file("/cat/readme.md", "")
            .with_file("/other/x.ec", "");
        let listed = provider.list_sources(Path::new("/cat"), "ec").unwrap();
        assert_eq!(
            listed,
            vec![PathBuf::from("/cat/a/b.ec"), PathBuf::from("/cat/z.ec")]
        );
    }

    #[test]
    fn in_memory_listing_unknown_directory_is_not_found() {
        let err = InMemoryProvider::new()
            .list_sources(Path::new("/nowhere"), "ec")
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn filesystem_listing_walks_directories_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.ec"), "").unwrap();
        std::fs::write(dir.path().join("nested/a.ec"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let listed = FileSystemProvider.list_sources(dir.path(), "ec").unwrap();
        assert_eq!(
            listed,
            vec![dir.path().join("b.ec"), dir.path().join("nested/a.ec")]
        );
    }
}
