use std::fmt::Write;

use super::{
    check_type_name, constants, inline_flags, quoted, Language, RenderError, RenderOptions,
    Renderer, TypeSupport,
};
use crate::naming::NamingConvention;
use crate::property::{format_float, PropertyTable, PropertyType, PropertyValue};

/// Emits a package-level variable of an anonymous struct type, with field
/// names aligned the way `gofmt` lays them out.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoRenderer;

impl Renderer for GoRenderer {
    fn language(&self) -> Language {
        Language::Go
    }

    fn file_extension(&self) -> &'static str {
        "go"
    }

    fn default_file_naming(&self) -> NamingConvention {
        NamingConvention::Snake
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport {
        match ty {
            PropertyType::Regex => {
                TypeSupport::Fallback("string holding the pattern; compile with regexp.MustCompile")
            }
            _ => TypeSupport::Native,
        }
    }

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError> {
        check_type_name(Language::Go, options)?;
        let package = package(options)?;
        let constants = constants(Language::Go, table, options)?;
        let pad = options.pad();
        let width = constants.iter().map(|c| c.name.len()).max().unwrap_or(0);

        let mut fields = String::new();
        let mut values = String::new();
        for constant in &constants {
            let (ty, value) = match &constant.property.value {
                PropertyValue::Boolean(b) => ("bool", b.to_string()),
                PropertyValue::Integer(i) => ("int64", i.to_string()),
                PropertyValue::Float(f) => ("float32", format_float(*f)),
                PropertyValue::Double(d) => ("float64", format_float(*d)),
                PropertyValue::Regex(r) => (
                    "string",
                    string_literal(&inline_flags(Language::Go, &constant.name, r)?),
                ),
                PropertyValue::String(s) => ("string", quoted(s, '"')),
            };
            let name = &constant.name;
            let _ = write!(fields, "{pad}{name:<width$} {ty}");
            if let Some(comment) = constant.comment() {
                let _ = write!(fields, " // {comment}");
            }
            fields.push('\n');

            let key = format!("{name}:");
            let _ = writeln!(values, "{pad}{key:<w$} {value},", w = width + 1);
        }

        let mut out = format!("package {package}\n\n");
        if let Some(header) = &options.header {
            let _ = writeln!(out, "// {header}");
        }
        let _ = writeln!(out, "var {} = struct {{", options.type_name);
        out.push_str(&fields);
        out.push_str("}{\n");
        out.push_str(&values);
        out.push_str("}\n");
        Ok(out)
    }
}

/// Prefers a backquoted raw string so patterns keep their backslashes readable.
fn string_literal(pattern: &str) -> String {
    if pattern.contains(['`', '\r']) {
        quoted(pattern, '"')
    } else {
        format!("`{pattern}`")
    }
}

fn package(options: &RenderOptions) -> Result<&str, RenderError> {
    let package = options
        .extra
        .get("package")
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .ok_or(RenderError::MissingOption {
            language: Language::Go,
            option: "package",
        })?;

    let mut chars = package.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && package.len() > 1
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(package)
    } else {
        Err(RenderError::InvalidOption {
            language: Language::Go,
            option: "package",
            value: package.to_string(),
            reason: "package names are short lowercase words (see https://go.dev/doc/effective_go#package-names)",
        })
    }
}
