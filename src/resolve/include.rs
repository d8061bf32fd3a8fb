//! Include expansion and override-by-name merging.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use super::{Diagnostics, ResolveError};
use crate::document::{self, include_path, normalize, DocumentSource, Item};
use crate::generate::GenerationTarget;
use crate::property::PropertyDeclaration;

/// Where an overriding declaration ends up in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePosition {
    /// The new declaration takes the slot of the one it replaces.
    #[default]
    Original,
    /// The replaced declaration is removed and the new one appended.
    Latest,
}

/// Output of include resolution: every declaration with its raw value still
/// unevaluated, plus the targets requested by the root document.
#[derive(Debug, Clone)]
pub struct Merged {
    pub root: PathBuf,
    pub declarations: Vec<PropertyDeclaration>,
    pub targets: Vec<GenerationTarget>,
}

/// Expands includes depth-first and folds all declarations into one ordered list.
#[derive(Debug)]
pub struct IncludeResolver<'a> {
    source: &'a dyn DocumentSource,
    position: OverridePosition,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self {
            source,
            position: OverridePosition::default(),
        }
    }

    #[must_use]
    pub fn with_override_position(mut self, position: OverridePosition) -> Self {
        self.position = position;
        self
    }

    /// Resolves `root` and everything it includes.
    ///
    /// Errors from independent documents are collected; the result is only `Ok`
    /// if every document in the tree parsed and every include was found.
    pub fn resolve(&self, root: &Path) -> Result<Merged, Diagnostics> {
        let root = normalize(root);
        let mut merged = Accumulator::new(self.position);
        let mut diagnostics = Diagnostics::new();
        let mut stack = vec![root.clone()];

        let targets = self
            .expand(&root, &mut stack, &mut merged, &mut diagnostics)
            .unwrap_or_default();

        info!(
            root = %root.display(),
            properties = merged.entries.len(),
            "resolved includes"
        );
        diagnostics.into_result(Merged {
            root,
            declarations: merged.entries,
            targets,
        })
    }

    /// Merges one document into `merged`, returning its generation targets.
    /// `stack` holds the documents on the current include path, `path` last.
    fn expand(
        &self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        merged: &mut Accumulator,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<GenerationTarget>> {
        let text = match self.source.read(path) {
            Ok(Some(text)) => text,
            Ok(None) => {
                diagnostics.push(ResolveError::IncludeNotFound {
                    target: path.to_path_buf(),
                });
                return None;
            }
            Err(e) => {
                diagnostics.push(e);
                return None;
            }
        };

        let parsed = match document::parse(path, &text) {
            Ok(parsed) => parsed,
            Err(errors) => {
                diagnostics.extend(errors);
                return None;
            }
        };
        debug!(document = %path.display(), items = parsed.items.len(), "parsed document");

        for item in parsed.items {
            match item {
                Item::Include(include) => {
                    let target = include_path(path, &include.target);
                    if stack.contains(&target) {
                        let mut cycle = stack.clone();
                        cycle.push(target);
                        diagnostics.push(ResolveError::CircularInclude { path: cycle });
                        continue;
                    }
                    debug!(from = %path.display(), include = %target.display(), "expanding include");
                    stack.push(target.clone());
                    self.expand(&target, stack, merged, diagnostics);
                    stack.pop();
                }
                Item::Declaration(declaration) => merged.merge(declaration),
            }
        }

        Some(parsed.targets)
    }
}

struct Accumulator {
    entries: Vec<PropertyDeclaration>,
    index: HashMap<String, usize>,
    position: OverridePosition,
}

impl Accumulator {
    fn new(position: OverridePosition) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            position,
        }
    }

    fn merge(&mut self, declaration: PropertyDeclaration) {
        let Some(&slot) = self.index.get(&declaration.name) else {
            self.index.insert(declaration.name.clone(), self.entries.len());
            self.entries.push(declaration);
            return;
        };

        debug!(
            property = %declaration.name,
            previous = %self.entries[slot].origin.document.display(),
            by = %declaration.origin.document.display(),
            "property overridden"
        );
        match self.position {
            OverridePosition::Original => self.entries[slot] = declaration,
            OverridePosition::Latest => {
                self.entries.remove(slot);
                self.entries.push(declaration);
                self.index = self
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, d)| (d.name.clone(), i))
                    .collect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemorySource;
    use crate::property::RawValue;

    fn names(merged: &Merged) -> Vec<&str> {
        merged.declarations.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_include_contents_come_first() {
        let source = MemorySource::new()
            .with_document(
                "main.yaml",
                "includes:\n  - path: inc.yaml\nproperties:\n  - { type: int, name: a, value: 1 }\n",
            )
            .with_document("inc.yaml", "properties:\n  - { type: int, name: b, value: 2 }\n");

        let merged = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap();
        assert_eq!(names(&merged), ["b", "a"]);
    }

    #[test]
    fn test_override_keeps_original_position() {
        let source = MemorySource::new()
            .with_document(
                "main.yaml",
                "includes:\n  - path: base.yaml\nproperties:\n  - { type: int, name: x, value: 2 }\n",
            )
            .with_document(
                "base.yaml",
                "properties:\n  - { type: int, name: x, value: 1 }\n  - { type: int, name: y, value: 3 }\n",
            );

        let merged = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap();
        assert_eq!(names(&merged), ["x", "y"]);
        assert_eq!(merged.declarations[0].raw, RawValue::Integer(2));

        let latest = IncludeResolver::new(&source)
            .with_override_position(OverridePosition::Latest)
            .resolve(Path::new("main.yaml"))
            .unwrap();
        assert_eq!(names(&latest), ["y", "x"]);
        assert_eq!(latest.declarations[1].raw, RawValue::Integer(2));
    }

    #[test]
    fn test_nested_relative_includes() {
        let source = MemorySource::new()
            .with_document("conf/main.yaml", "includes:\n  - path: shared/a.yaml\n")
            .with_document("conf/shared/a.yaml", "includes:\n  - path: ../b.yaml\n")
            .with_document("conf/b.yaml", "properties:\n  - { type: string, name: s, value: hi }\n");

        let merged = IncludeResolver::new(&source)
            .resolve(Path::new("conf/main.yaml"))
            .unwrap();
        assert_eq!(names(&merged), ["s"]);
    }

    #[test]
    fn test_self_include_is_circular() {
        let source =
            MemorySource::new().with_document("main.yaml", "includes:\n  - path: main.yaml\n");

        let errors: Vec<_> = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap_err()
            .into_iter()
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ResolveError::CircularInclude { path } if path.len() == 2));
    }

    #[test]
    fn test_transitive_include_cycle() {
        let source = MemorySource::new()
            .with_document("a.yaml", "includes:\n  - path: b.yaml\n")
            .with_document("b.yaml", "includes:\n  - path: c.yaml\n")
            .with_document("c.yaml", "includes:\n  - path: a.yaml\n");

        let errors: Vec<_> = IncludeResolver::new(&source)
            .resolve(Path::new("a.yaml"))
            .unwrap_err()
            .into_iter()
            .collect();
        match &errors[0] {
            ResolveError::CircularInclude { path } => {
                let expected: Vec<PathBuf> = ["a.yaml", "b.yaml", "c.yaml", "a.yaml"]
                    .into_iter()
                    .map(PathBuf::from)
                    .collect();
                assert_eq!(path, &expected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let source = MemorySource::new()
            .with_document("main.yaml", "includes:\n  - path: l.yaml\n  - path: r.yaml\n")
            .with_document("l.yaml", "includes:\n  - path: common.yaml\n")
            .with_document("r.yaml", "includes:\n  - path: common.yaml\n")
            .with_document("common.yaml", "properties:\n  - { type: bool, name: c, value: true }\n");

        let merged = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap();
        assert_eq!(names(&merged), ["c"]);
    }

    #[test]
    fn test_missing_include_and_parse_errors_are_collected() {
        let source = MemorySource::new()
            .with_document(
                "main.yaml",
                "includes:\n  - path: missing.yaml\n  - path: broken.yaml\n",
            )
            .with_document("broken.yaml", "properties:\n  - { type: nope, name: z, value: 1 }\n");

        let errors: Vec<_> = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap_err()
            .into_iter()
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ResolveError::IncludeNotFound { target } if target == Path::new("missing.yaml")));
        assert!(matches!(&errors[1], ResolveError::Syntax { .. }));
    }

    #[test]
    fn test_only_root_targets_are_kept() {
        let source = MemorySource::new()
            .with_document(
                "main.yaml",
                "includes:\n  - path: inc.yaml\nlanguages:\n  - language: python\n",
            )
            .with_document("inc.yaml", "languages:\n  - language: go\n");

        let merged = IncludeResolver::new(&source)
            .resolve(Path::new("main.yaml"))
            .unwrap();
        assert_eq!(merged.targets.len(), 1);
    }
}
