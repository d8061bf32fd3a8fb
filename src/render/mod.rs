//! Language renderers.
//!
//! Every target language is one [`Renderer`] implementation. Renderers are pure:
//! the output depends only on the property table and the options passed in.

mod c;
mod error;
mod go;
mod java;
mod javascript;
mod python;
mod typescript;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub use c::CRenderer;
pub use error::RenderError;
pub use go::GoRenderer;
pub use java::JavaRenderer;
pub use javascript::JavaScriptRenderer;
pub use python::PythonRenderer;
pub use typescript::TypeScriptRenderer;

use crate::naming::NamingConvention;
use crate::property::{is_valid_name, Property, PropertyTable, PropertyType, RegexValue};

/// Supported target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Java,
    TypeScript,
    JavaScript,
    Python,
    Go,
    C,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Java,
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Go,
        Language::C,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Go => "go",
            Language::C => "c",
        }
    }

    /// The renderer responsible for this language.
    pub fn renderer(self) -> &'static dyn Renderer {
        match self {
            Language::Java => &JavaRenderer,
            Language::TypeScript => &TypeScriptRenderer,
            Language::JavaScript => &JavaScriptRenderer,
            Language::Python => &PythonRenderer,
            Language::Go => &GoRenderer,
            Language::C => &CRenderer,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language '{}'", self.0)
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "javascript" | "js" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "go" | "golang" => Ok(Language::Go),
            "c" => Ok(Language::C),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// How a renderer represents values of one property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSupport {
    Native,
    /// Rendered through another construct; the text says which.
    Fallback(&'static str),
}

/// Per-target inputs to a renderer, already validated by the caller.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Name of the generated class, struct or enum.
    pub type_name: String,
    /// Output file name without extension.
    pub file_stem: String,
    pub indent: usize,
    pub property_naming: Option<NamingConvention>,
    /// Text of the traceability comment, if one should be emitted.
    pub header: Option<String>,
    /// Language-specific options such as `package`.
    pub extra: BTreeMap<String, String>,
}

impl RenderOptions {
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            file_stem: type_name.clone(),
            type_name,
            indent: 4,
            property_naming: None,
            header: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn pad(&self) -> String {
        " ".repeat(self.indent)
    }
}

/// Shared capability set of all language renderers.
pub trait Renderer: Send + Sync + fmt::Debug {
    fn language(&self) -> Language;

    /// Extension of the generated file, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Convention applied to the output file name when the target does not
    /// choose one. Follows each language's own file naming habits.
    fn default_file_naming(&self) -> NamingConvention;

    /// Convention applied to the type name when the target does not choose one.
    fn default_type_naming(&self) -> NamingConvention {
        NamingConvention::Pascal
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport;

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError>;
}

/// A visible property paired with the identifier it is emitted under.
struct Constant<'a> {
    name: String,
    property: &'a Property,
}

impl Constant<'_> {
    fn comment(&self) -> Option<String> {
        self.property.comment().map(single_line)
    }
}

/// Collects the emitted constants, applying the property naming convention and
/// checking that the converted names are usable identifiers.
fn constants<'a>(
    language: Language,
    table: &'a PropertyTable,
    options: &RenderOptions,
) -> Result<Vec<Constant<'a>>, RenderError> {
    let mut seen = HashSet::new();
    let mut constants = Vec::new();

    for property in table.visible() {
        let name = match options.property_naming {
            Some(convention) => convention.convert(property.name()),
            None => property.name().to_string(),
        };
        if !is_valid_name(&name) || is_reserved(language, &name, true) {
            return Err(RenderError::InvalidIdentifier { language, name });
        }
        if !seen.insert(name.clone()) {
            return Err(RenderError::DuplicateConstant { language, name });
        }
        constants.push(Constant { name, property });
    }
    Ok(constants)
}

fn check_type_name(language: Language, options: &RenderOptions) -> Result<(), RenderError> {
    if is_valid_name(&options.type_name) && !is_reserved(language, &options.type_name, false) {
        Ok(())
    } else {
        Err(RenderError::InvalidIdentifier {
            language,
            name: options.type_name.clone(),
        })
    }
}

const JAVA_KEYWORDS: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

const JS_KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

const C_KEYWORDS: &[&str] = &[
    "_Bool", "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

/// Whether `name` is a reserved word of `language`. JavaScript and TypeScript
/// allow reserved words as class member names, so `member` exempts them there.
fn is_reserved(language: Language, name: &str, member: bool) -> bool {
    let keywords = match language {
        Language::Java => JAVA_KEYWORDS,
        Language::TypeScript | Language::JavaScript if member => return false,
        Language::TypeScript | Language::JavaScript => JS_KEYWORDS,
        Language::Python => PYTHON_KEYWORDS,
        Language::Go => GO_KEYWORDS,
        Language::C => C_KEYWORDS,
    };
    keywords.contains(&name)
}

fn single_line(comment: &str) -> String {
    comment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escapes `s` for a double- or single-quoted string literal in C-family syntax.
/// Control characters become `\uXXXX`, or three-digit octal when `octal_escapes` is set.
fn escape(s: &str, quote: char, octal_escapes: bool) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && octal_escapes => out.push_str(&format!("\\{:03o}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn quoted(s: &str, quote: char) -> String {
    format!("{quote}{}{quote}", escape(s, quote, false))
}

/// Turns a regex into a plain pattern string for languages without regex
/// literals, moving flags into an inline `(?flags)` group.
fn inline_flags(language: Language, name: &str, regex: &RegexValue) -> Result<String, RenderError> {
    if regex.flags.is_empty() {
        return Ok(regex.pattern.clone());
    }
    if regex.flags.chars().all(|c| matches!(c, 'i' | 'm' | 's')) {
        Ok(format!("(?{}){}", regex.flags, regex.pattern))
    } else {
        Err(RenderError::UnsupportedRegexFlags {
            language,
            name: name.to_string(),
            flags: regex.flags.clone(),
        })
    }
}

/// Flags a JavaScript regex literal may carry.
const JS_REGEX_FLAGS: &str = "dgimsuvy";

/// Builds a `/pattern/flags` literal, escaping bare slashes in the pattern.
fn regex_literal(language: Language, name: &str, regex: &RegexValue) -> Result<String, RenderError> {
    let mut seen = HashSet::new();
    let flags_ok = regex
        .flags
        .chars()
        .all(|c| JS_REGEX_FLAGS.contains(c) && seen.insert(c))
        && !(seen.contains(&'u') && seen.contains(&'v'));
    if !flags_ok {
        return Err(RenderError::UnsupportedRegexFlags {
            language,
            name: name.to_string(),
            flags: regex.flags.clone(),
        });
    }

    let trailing_backslashes = regex.pattern.chars().rev().take_while(|&c| c == '\\').count();
    if trailing_backslashes % 2 == 1 {
        return Err(RenderError::InvalidRegex {
            language,
            name: name.to_string(),
            reason: "pattern ends in an unescaped backslash",
        });
    }

    // `//` would start a line comment.
    if regex.pattern.is_empty() {
        return Ok(format!("/(?:)/{}", regex.flags));
    }

    let mut out = String::with_capacity(regex.pattern.len() + 2);
    out.push('/');
    let mut escaped = false;
    for ch in regex.pattern.chars() {
        match ch {
            '/' if !escaped => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
        escaped = ch == '\\' && !escaped;
    }
    out.push('/');
    out.push_str(&regex.flags);
    Ok(out)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use crate::property::{
        Origin, Property, PropertyDeclaration, PropertyTable, PropertyValue, RawValue, RegexValue,
    };

    fn property(name: &str, value: PropertyValue, comment: Option<&str>) -> Property {
        Property {
            declaration: PropertyDeclaration {
                name: name.to_string(),
                ty: value.property_type(),
                raw: RawValue::Text(String::new()),
                comment: comment.map(str::to_string),
                hidden: false,
                origin: Origin {
                    document: PathBuf::from("test-config.yaml"),
                    line: 1,
                },
            },
            value,
        }
    }

    /// The property set used by the renderer snapshot tests.
    pub fn sample_table() -> PropertyTable {
        PropertyTable::from_properties(vec![
            property("myBoolean", PropertyValue::Boolean(true), None),
            property("myInteger", PropertyValue::Integer(142), None),
            property("myFloat", PropertyValue::Float(322.0), None),
            property("myDouble", PropertyValue::Double(233.9), None),
            property(
                "myRegex",
                PropertyValue::Regex(RegexValue {
                    pattern: "Test Reg(E|e)x".into(),
                    flags: String::new(),
                }),
                Some("Just another RegEx."),
            ),
            property(
                "mySubstitutedString",
                PropertyValue::String("Sometimes I just want to scream Hello World!".into()),
                None,
            ),
        ])
    }

    pub fn table_with(name: &str, value: PropertyValue) -> PropertyTable {
        PropertyTable::from_properties(vec![property(name, value, None)])
    }
}
