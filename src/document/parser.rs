//! Turns one YAML document into includes, declarations and generation targets.
//!
//! Parsing is purely syntactic: include targets are not opened and `${...}`
//! expressions are carried forward untouched.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::generate::GenerationTarget;
use crate::naming::NamingConvention;
use crate::property::{is_valid_name, Origin, PropertyDeclaration, PropertyType, RawValue};
use crate::render::Language;
use crate::resolve::{Diagnostics, ResolveError};

/// A parsed document, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    /// Includes first, then declarations, matching the layout of the file.
    pub items: Vec<Item>,
    pub targets: Vec<GenerationTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Include(IncludeDirective),
    Declaration(PropertyDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Target path as written, relative to the including document.
    pub target: PathBuf,
    pub line: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    includes: Vec<RawInclude>,
    #[serde(default)]
    languages: Vec<RawLanguage>,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawInclude {
    path: String,
    #[serde(default)]
    ignore: bool,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    ty: Option<String>,
    name: Option<String>,
    value: Option<serde_yaml::Value>,
    comment: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    ignore: bool,
}

#[derive(Debug, Deserialize)]
struct RawLanguage {
    language: String,
    file_naming: Option<String>,
    property_naming: Option<String>,
    type_naming: Option<String>,
    indent: Option<usize>,
    output: Option<String>,
    #[serde(default)]
    ignore: bool,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// Parses `text`, collecting every malformed entry instead of stopping at the first.
pub fn parse(path: &Path, text: &str) -> Result<Document, Diagnostics> {
    let syntax = |line: usize, reason: String| ResolveError::Syntax {
        document: path.to_path_buf(),
        line,
        reason,
    };

    let raw: RawDocument = if is_blank(text) {
        RawDocument::default()
    } else {
        serde_yaml::from_str(text).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(1);
            syntax(line, e.to_string())
        })?
    };

    let mut diagnostics = Diagnostics::new();
    let mut items = Vec::new();

    let include_lines = Section::locate(text, "includes");
    for (i, include) in raw.includes.into_iter().enumerate() {
        if include.ignore {
            continue;
        }
        items.push(Item::Include(IncludeDirective {
            target: PathBuf::from(include.path),
            line: include_lines.line(i),
        }));
    }

    let property_lines = Section::locate(text, "properties");
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (i, property) in raw.properties.into_iter().enumerate() {
        if property.ignore {
            continue;
        }
        let line = property_lines.line(i);
        match declaration(path, line, property) {
            Ok(decl) => {
                if seen.insert(decl.name.clone(), line).is_some() {
                    diagnostics.push(ResolveError::DuplicateDeclaration {
                        name: decl.name,
                        document: path.to_path_buf(),
                        line,
                    });
                } else {
                    items.push(Item::Declaration(decl));
                }
            }
            Err(reason) => diagnostics.push(syntax(line, reason)),
        }
    }

    let language_lines = Section::locate(text, "languages");
    let mut targets = Vec::new();
    for (i, language) in raw.languages.into_iter().enumerate() {
        if language.ignore {
            continue;
        }
        match target(language) {
            Ok(target) => targets.push(target),
            Err(reason) => diagnostics.push(syntax(language_lines.line(i), reason)),
        }
    }

    diagnostics.into_result(Document {
        path: path.to_path_buf(),
        items,
        targets,
    })
}

fn declaration(path: &Path, line: usize, raw: RawProperty) -> Result<PropertyDeclaration, String> {
    let name = raw.name.ok_or("property is missing 'name'")?;
    if !is_valid_name(&name) {
        return Err(format!("'{name}' is not a valid property name"));
    }
    let ty = raw
        .ty
        .ok_or_else(|| format!("property '{name}' is missing 'type'"))?;
    let ty: PropertyType = ty
        .parse()
        .map_err(|_| format!("property '{name}' has unknown type '{ty}'"))?;
    let value = raw
        .value
        .ok_or_else(|| format!("property '{name}' is missing 'value'"))?;
    let raw_value =
        raw_value(value).ok_or_else(|| format!("property '{name}' must have a scalar value"))?;

    Ok(PropertyDeclaration {
        name,
        ty,
        raw: raw_value,
        comment: raw.comment,
        hidden: raw.hidden,
        origin: Origin {
            document: path.to_path_buf(),
            line,
        },
    })
}

fn raw_value(value: serde_yaml::Value) -> Option<RawValue> {
    match value {
        serde_yaml::Value::Bool(b) => Some(RawValue::Bool(b)),
        serde_yaml::Value::Number(n) => n
            .as_i64()
            .map(RawValue::Integer)
            .or_else(|| n.as_f64().map(RawValue::Float)),
        serde_yaml::Value::String(s) => Some(RawValue::Text(s)),
        _ => None,
    }
}

fn target(raw: RawLanguage) -> Result<GenerationTarget, String> {
    let language: Language = raw.language.parse().map_err(|e| format!("{e}"))?;
    let convention = |value: Option<String>| -> Result<Option<NamingConvention>, String> {
        value
            .map(|v| v.parse::<NamingConvention>().map_err(|e| e.to_string()))
            .transpose()
    };

    let mut target = GenerationTarget::new(language);
    target.file_naming = convention(raw.file_naming)?;
    target.property_naming = convention(raw.property_naming)?;
    target.type_naming = convention(raw.type_naming)?;
    target.indent = raw.indent;
    target.output = raw.output;

    for (key, value) in raw.extra {
        let text = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            _ => return Err(format!("{language} option '{key}' must be a scalar")),
        };
        target.options.insert(key, text);
    }
    Ok(target)
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Source lines of the list entries under a top-level key.
///
/// The YAML value tree carries no positions, so entries are located by
/// scanning for the `-` markers at the list's own indentation.
struct Section {
    key_line: usize,
    entries: Vec<usize>,
}

impl Section {
    fn locate(text: &str, key: &str) -> Self {
        let header = format!("{key}:");
        let mut lines = text.lines().enumerate();
        let Some((key_index, _)) = lines.by_ref().find(|(_, l)| l.starts_with(&header)) else {
            return Self {
                key_line: 1,
                entries: Vec::new(),
            };
        };

        let mut entries = Vec::new();
        let mut indent = None;
        for (index, line) in lines {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let depth = line.len() - trimmed.len();
            if depth == 0 && !trimmed.starts_with('-') {
                break;
            }
            if trimmed.starts_with('-') && *indent.get_or_insert(depth) == depth {
                entries.push(index + 1);
            }
        }

        Self {
            key_line: key_index + 1,
            entries,
        }
    }

    fn line(&self, entry: usize) -> usize {
        self.entries.get(entry).copied().unwrap_or(self.key_line)
    }
}
