use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::resolve::ResolveError;

/// Supplies document text by path.
///
/// Returning `Ok(None)` means the document does not exist; the resolver turns
/// that into `IncludeNotFound`.
pub trait DocumentSource: Send + Sync + fmt::Debug {
    fn read(&self, path: &Path) -> Result<Option<String>, ResolveError>;
}

/// Reads documents from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl DocumentSource for FileSource {
    fn read(&self, path: &Path) -> Result<Option<String>, ResolveError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "read document");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ResolveError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Serves documents from memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.documents.insert(normalize(path.as_ref()), text.into());
        self
    }
}

impl DocumentSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Option<String>, ResolveError> {
        Ok(self.documents.get(&normalize(path)).cloned())
    }
}

/// Lexically removes `.` and `..` components so the same document reached via
/// different relative paths gets the same identity.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves an include target relative to the directory of the including document.
pub fn include_path(including: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        normalize(target)
    } else {
        let base = including.parent().unwrap_or_else(|| Path::new(""));
        normalize(&base.join(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_reads_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "properties: []").unwrap();

        let text = FileSource.read(file.path()).unwrap();
        assert_eq!(text.as_deref(), Some("properties: []\n"));
    }

    #[test]
    fn test_file_source_missing_file() {
        let text = FileSource.read(Path::new("/nonexistent/path/config.yaml")).unwrap();
        assert!(text.is_none());
    }

    #[test]
    fn test_memory_source_normalizes_keys() {
        let source = MemorySource::new().with_document("conf/./base.yaml", "x");
        assert!(source.read(Path::new("conf/sub/../base.yaml")).unwrap().is_some());
    }

    #[test]
    fn test_include_path_is_relative_to_including_document() {
        assert_eq!(
            include_path(Path::new("conf/main.yaml"), Path::new("../shared/inc.yaml")),
            PathBuf::from("shared/inc.yaml")
        );
        assert_eq!(
            include_path(Path::new("main.yaml"), Path::new("inc.yaml")),
            PathBuf::from("inc.yaml")
        );
    }
}
