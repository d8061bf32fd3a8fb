use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::property::PropertyType;

/// Input defects found while parsing, merging or evaluating documents.
///
/// None of these are transient; every one points at something to fix in the
/// configuration documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("{}:{line}: {reason}", document.display())]
    Syntax {
        document: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("property '{name}' is declared more than once in {} (line {line})", document.display())]
    DuplicateDeclaration {
        name: String,
        document: PathBuf,
        line: usize,
    },

    #[error("property '{name}' expects a {expected} value, found {found}")]
    TypeMismatch {
        name: String,
        expected: PropertyType,
        found: String,
    },

    #[error("included document not found: {}", target.display())]
    IncludeNotFound { target: PathBuf },

    #[error("circular include: {}", join_paths(path))]
    CircularInclude { path: Vec<PathBuf> },

    #[error("property '{referenced_by}' references undeclared property '{name}'")]
    UnresolvedReference { name: String, referenced_by: String },

    #[error("circular reference: {}", cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    #[error("property '{referenced_by}' cannot interpolate regex property '{name}'")]
    UnsupportedReference { name: String, referenced_by: String },

    #[error("property '{name}' uses an unsupported expression '{expression}' (only '+' is supported)")]
    UnsupportedOperator { name: String, expression: String },

    #[error("failed to read document '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn join_paths(path: &[PathBuf]) -> String {
    path.iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// An ordered batch of resolution errors from a single run.
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<ResolveError>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ResolveError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolveError> {
        self.0.iter()
    }

    /// Turns the batch into `Err(self)` if it holds anything.
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ResolveError> for Diagnostics {
    fn from(error: ResolveError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for Diagnostics {
    type Item = ResolveError;
    type IntoIter = std::vec::IntoIter<ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a ResolveError;
    type IntoIter = std::slice::Iter<'a, ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
