use std::fmt::Write;

use super::{
    check_type_name, constants, inline_flags, quoted, Language, RenderError, RenderOptions,
    Renderer, TypeSupport,
};
use crate::naming::NamingConvention;
use crate::property::{format_float, PropertyTable, PropertyType, PropertyValue};

/// Emits a class of `public final static` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaRenderer;

impl Renderer for JavaRenderer {
    fn language(&self) -> Language {
        Language::Java
    }

    fn file_extension(&self) -> &'static str {
        "java"
    }

    fn default_file_naming(&self) -> NamingConvention {
        NamingConvention::Pascal
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport {
        match ty {
            PropertyType::Regex => {
                TypeSupport::Fallback("String holding the pattern; compile with java.util.regex.Pattern")
            }
            _ => TypeSupport::Native,
        }
    }

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError> {
        check_type_name(Language::Java, options)?;
        let package = package(options)?;
        let constants = constants(Language::Java, table, options)?;
        let pad = options.pad();

        let mut out = format!("package {package};\n\n");
        if let Some(header) = &options.header {
            let _ = writeln!(out, "// {header}");
        }
        let _ = writeln!(out, "public class {} {{", options.type_name);

        for constant in &constants {
            let (ty, value) = match &constant.property.value {
                PropertyValue::Boolean(b) => ("boolean", b.to_string()),
                PropertyValue::Integer(i) if i32::try_from(*i).is_ok() => ("int", i.to_string()),
                PropertyValue::Integer(i) => ("long", format!("{i}L")),
                PropertyValue::Float(f) => ("float", format!("{}f", format_float(*f))),
                PropertyValue::Double(d) => ("double", format!("{}d", format_float(*d))),
                PropertyValue::Regex(r) => (
                    "String",
                    quoted(&inline_flags(Language::Java, &constant.name, r)?, '"'),
                ),
                PropertyValue::String(s) => ("String", quoted(s, '"')),
            };
            let _ = write!(out, "{pad}public final static {ty} {} = {value};", constant.name);
            if let Some(comment) = constant.comment() {
                let _ = write!(out, " // {comment}");
            }
            out.push('\n');
        }

        out.push_str("}\n");
        Ok(out)
    }
}

fn package(options: &RenderOptions) -> Result<&str, RenderError> {
    let package = options
        .extra
        .get("package")
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .ok_or(RenderError::MissingOption {
            language: Language::Java,
            option: "package",
        })?;

    let valid = package.split('.').all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if valid {
        Ok(package)
    } else {
        Err(RenderError::InvalidOption {
            language: Language::Java,
            option: "package",
            value: package.to_string(),
            reason: "expected dot-separated identifiers",
        })
    }
}
