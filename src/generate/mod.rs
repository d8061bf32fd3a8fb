//! Pipeline orchestration: resolve a root document, render every target, write
//! the results.

mod target;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::document::DocumentSource;
use crate::property::{PropertyTable, PropertyType};
use crate::render::{Language, RenderError, TypeSupport};
use crate::resolve::{evaluate, Diagnostics, IncludeResolver};
use crate::settings::Settings;
use crate::Error;

pub use target::GenerationTarget;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A root document after includes and substitutions are resolved.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// File stem of the root document; the base for type and file names.
    pub config_name: String,
    pub table: PropertyTable,
    pub targets: Vec<GenerationTarget>,
}

/// Rendered output of one target, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub language: Language,
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug)]
pub struct TargetFailure {
    pub language: Language,
    pub error: RenderError,
}

/// What a run produced. Rendering failures are per target; every other target
/// still gets written.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<TargetFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct Generator<'a> {
    source: &'a dyn DocumentSource,
    settings: Settings,
}

impl<'a> Generator<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self {
            source,
            settings: Settings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs include resolution and substitution for `root`.
    ///
    /// Each stage reports every error it finds. Substitution only runs once all
    /// documents have parsed and every include was found.
    pub fn resolve(&self, root: &Path) -> Result<Resolved, Diagnostics> {
        let merged = IncludeResolver::new(self.source)
            .with_override_position(self.settings.resolve.override_position)
            .resolve(root)?;
        let table = evaluate(merged.declarations)?;

        let config_name = merged
            .root
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(config = %config_name, properties = table.len(), targets = merged.targets.len(), "resolved");

        Ok(Resolved {
            config_name,
            table,
            targets: merged.targets,
        })
    }

    /// Renders every target of `resolved` in parallel, in target order.
    pub fn render(&self, resolved: &Resolved) -> Vec<Result<RenderedFile, TargetFailure>> {
        let header = self
            .settings
            .render
            .header
            .then(|| format!("Generated with {NAME} v{VERSION}"));

        resolved
            .targets
            .par_iter()
            .map(|target| {
                render_target(
                    &resolved.table,
                    target,
                    &resolved.config_name,
                    self.settings.render.indent,
                    header.as_deref(),
                )
            })
            .collect()
    }

    /// Resolves, renders and writes `root`'s targets under the output directory.
    ///
    /// Nothing is written when resolution fails. Targets that fail to render
    /// are reported and skipped. The remaining files are written all together
    /// or not at all.
    pub fn generate(&self, root: &Path) -> Result<GenerationReport, Error> {
        let resolved = self.resolve(root).map_err(Error::Resolution)?;
        let mut report = GenerationReport::default();
        let mut staging = Staging::default();

        for result in self.render(&resolved) {
            match result {
                Ok(file) => {
                    let path = self.settings.output.directory.join(&file.path);
                    if let Err(e) = staging.stage(&path, &file.contents) {
                        staging.rollback();
                        return Err(e);
                    }
                    debug!(language = %file.language, path = %path.display(), "staged");
                    report.written.push(path);
                }
                Err(failure) => {
                    warn!(language = %failure.language, error = %failure.error, "target failed");
                    report.failures.push(failure);
                }
            }
        }

        if let Err(e) = staging.commit() {
            staging.rollback();
            return Err(e);
        }
        for path in &report.written {
            info!(path = %path.display(), "wrote");
        }
        Ok(report)
    }
}

fn render_target(
    table: &PropertyTable,
    target: &GenerationTarget,
    config_name: &str,
    default_indent: usize,
    header: Option<&str>,
) -> Result<RenderedFile, TargetFailure> {
    let renderer = target.language.renderer();
    warn_fallbacks(table, target.language);

    let options = target.render_options(config_name, default_indent, header);
    let contents = renderer
        .render(table, &options)
        .map_err(|error| TargetFailure {
            language: target.language,
            error,
        })?;
    debug!(language = %target.language, bytes = contents.len(), "rendered");

    Ok(RenderedFile {
        language: target.language,
        path: target.output_path(config_name),
        contents,
    })
}

fn warn_fallbacks(table: &PropertyTable, language: Language) {
    let renderer = language.renderer();
    for ty in PropertyType::ALL {
        if !table.visible().any(|p| p.declaration.ty == ty) {
            continue;
        }
        if let TypeSupport::Fallback(representation) = renderer.type_support(ty) {
            warn!(%language, property_type = %ty, representation, "no native representation");
        }
    }
}

/// Output files written next to their destinations under temporary names,
/// then renamed into place once every one of them was written.
#[derive(Debug, Default)]
struct Staging {
    staged: Vec<(NamedTempFile, PathBuf)>,
    committed: Vec<PathBuf>,
    /// Directories created for the outputs, outermost first.
    created_dirs: Vec<PathBuf>,
}

impl Staging {
    fn stage(&mut self, path: &Path, contents: &str) -> Result<(), Error> {
        let write_error = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        self.create_dirs(dir).map_err(write_error)?;

        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(contents.as_bytes()).map_err(write_error)?;
        self.staged.push((file, path.to_path_buf()));
        Ok(())
    }

    fn create_dirs(&mut self, dir: &Path) -> io::Result<()> {
        let missing: Vec<PathBuf> = dir
            .ancestors()
            .take_while(|d| !d.as_os_str().is_empty() && !d.exists())
            .map(Path::to_path_buf)
            .collect();
        fs::create_dir_all(dir)?;
        self.created_dirs.extend(missing.into_iter().rev());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        for (file, path) in self.staged.drain(..) {
            file.persist(&path).map_err(|e| Error::Write {
                path: path.clone(),
                source: e.error,
            })?;
            self.committed.push(path);
        }
        Ok(())
    }

    /// Removes everything this run put on disk.
    fn rollback(self) {
        let Staging {
            staged,
            committed,
            created_dirs,
        } = self;
        warn!(
            staged = staged.len(),
            committed = committed.len(),
            "write failed, removing generated files"
        );
        // Dropping a temporary file deletes it.
        drop(staged);
        for path in &committed {
            let _ = fs::remove_file(path);
        }
        for dir in created_dirs.iter().rev() {
            let _ = fs::remove_dir(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::document::MemorySource;
    use crate::property::PropertyValue;
    use crate::resolve::ResolveError;

    const MAIN: &str = "\
includes:
  - path: shared.yaml
languages:
  - language: python
    file_naming: snake
  - language: java
    output: java/{name}.{ext}
properties:
  - type: int
    name: b
    value: 2
  - type: int
    name: c
    value: ${a}+${b}
  - type: string
    name: greeting
    value: Hello ${name}!
";

    const SHARED: &str = "\
properties:
  - type: int
    name: a
    value: 40
  - type: string
    name: name
    value: World
    hidden: true
";

    fn source() -> MemorySource {
        MemorySource::new()
            .with_document("test-config.yaml", MAIN)
            .with_document("shared.yaml", SHARED)
    }

    fn settings(dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.output.directory = dir.path().to_path_buf();
        settings
    }

    #[test]
    fn test_resolve_evaluates_across_includes() {
        let source = source();
        let resolved = Generator::new(&source)
            .resolve(Path::new("test-config.yaml"))
            .unwrap();

        assert_eq!(resolved.config_name, "test-config");
        assert_eq!(
            resolved.table.names().collect::<Vec<_>>(),
            ["a", "name", "b", "c", "greeting"]
        );
        assert_eq!(resolved.table.get("c").unwrap().value, PropertyValue::Integer(42));
        assert_eq!(
            resolved.table.get("greeting").unwrap().value,
            PropertyValue::String("Hello World!".into())
        );
        assert_eq!(resolved.targets.len(), 2);
    }

    #[test]
    fn test_render_failures_do_not_block_siblings() {
        let source = source();
        let dir = TempDir::new().unwrap();
        let report = Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("test-config.yaml"))
            .unwrap();

        // Java needs a package option that this document does not give.
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].language, Language::Java);
        assert!(matches!(
            report.failures[0].error,
            RenderError::MissingOption { option: "package", .. }
        ));

        let python = dir.path().join("test_config.py");
        assert_eq!(report.written, [python.clone()]);
        let contents = fs::read_to_string(python).unwrap();
        assert!(contents.contains(&format!("Generated with {NAME} v{VERSION}")));
        assert!(contents.contains("c = 42"));
        assert!(contents.contains("greeting = 'Hello World!'"));
        // Hidden properties feed substitutions but are not emitted.
        assert!(!contents.contains("name ="));
        assert!(!dir.path().join("java").exists());
    }

    #[test]
    fn test_nested_output_directories_are_created() {
        let source = MemorySource::new().with_document(
            "app.yaml",
            "languages:\n  - language: java\n    package: com.example\n    output: src/{name}.{ext}\n\
             properties:\n  - { type: bool, name: enabled, value: true }\n",
        );
        let dir = TempDir::new().unwrap();
        let report = Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("app.yaml"))
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.written, [dir.path().join("src/App.java")]);
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let source = MemorySource::new().with_document(
            "app.yaml",
            "languages:\n  - language: python\n  - language: typescript\n    output: blocker/{name}.{ext}\n\
             properties:\n  - { type: int, name: port, value: 8080 }\n",
        );
        let dir = TempDir::new().unwrap();
        // A plain file where the typescript output needs a directory.
        fs::write(dir.path().join("blocker"), "").unwrap();

        let result = Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("app.yaml"));

        assert!(matches!(result, Err(Error::Write { .. })));
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["blocker"]);
    }

    #[test]
    fn test_created_directories_are_removed_on_failure() {
        let source = MemorySource::new().with_document(
            "app.yaml",
            "languages:\n  - language: python\n    output: gen/py/{name}.{ext}\n\
             \x20 - language: go\n    package: app\n    output: blocker/{name}.{ext}\n\
             properties:\n  - { type: bool, name: enabled, value: true }\n",
        );
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();

        let result = Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("app.yaml"));

        assert!(result.is_err());
        assert!(!dir.path().join("gen").exists());
    }

    #[test]
    fn test_no_temporary_files_remain_after_success() {
        let source = source();
        let dir = TempDir::new().unwrap();
        Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("test-config.yaml"))
            .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["test_config.py"]);
    }

    #[test]
    fn test_resolution_errors_abort_every_target() {
        let source = MemorySource::new().with_document(
            "broken.yaml",
            "languages:\n  - language: python\n  - language: go\n    package: broken\n\
             properties:\n  - { type: string, name: s, value: '${nonexistent}' }\n  \
             - { type: int, name: n, value: abc }\n",
        );
        let dir = TempDir::new().unwrap();
        let result = Generator::new(&source)
            .with_settings(settings(&dir))
            .generate(Path::new("broken.yaml"));

        let Err(Error::Resolution(diagnostics)) = result else {
            panic!("expected resolution errors");
        };
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .any(|e| matches!(e, ResolveError::UnresolvedReference { name, .. } if name == "nonexistent")));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_header_can_be_disabled() {
        let source = source();
        let mut settings = Settings::default();
        settings.render.header = false;
        let generator = Generator::new(&source).with_settings(settings);

        let resolved = generator.resolve(Path::new("test-config.yaml")).unwrap();
        let rendered = generator.render(&resolved);
        let python = rendered[0].as_ref().unwrap();
        assert_eq!(python.path, PathBuf::from("test_config.py"));
        assert!(!python.contents.contains("Generated with"));
    }
}
