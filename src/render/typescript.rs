use std::fmt::Write;

use super::{
    check_type_name, constants, quoted, regex_literal, Constant, Language, RenderError,
    RenderOptions, Renderer, TypeSupport,
};
use crate::naming::NamingConvention;
use crate::property::{format_float, PropertyTable, PropertyType, PropertyValue};

/// Emits an exported class of `public static readonly` members.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptRenderer;

impl Renderer for TypeScriptRenderer {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn default_file_naming(&self) -> NamingConvention {
        NamingConvention::Kebab
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport {
        match ty {
            PropertyType::Float | PropertyType::Double => {
                TypeSupport::Fallback("number (IEEE-754 double)")
            }
            _ => TypeSupport::Native,
        }
    }

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError> {
        check_type_name(Language::TypeScript, options)?;
        let constants = constants(Language::TypeScript, table, options)?;
        let pad = options.pad();

        let mut out = String::new();
        if let Some(header) = &options.header {
            let _ = writeln!(out, "// {header}");
        }
        let _ = writeln!(out, "export class {} {{", options.type_name);

        for constant in &constants {
            let _ = write!(
                out,
                "{pad}public static readonly {} = {};",
                constant.name,
                literal(Language::TypeScript, constant)?
            );
            if let Some(comment) = constant.comment() {
                let _ = write!(out, " // {comment}");
            }
            out.push('\n');
        }

        out.push_str("}\n");
        Ok(out)
    }
}

/// Literal syntax shared by the TypeScript and JavaScript renderers.
pub(super) fn literal(language: Language, constant: &Constant<'_>) -> Result<String, RenderError> {
    let literal = match &constant.property.value {
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Integer(i) => i.to_string(),
        PropertyValue::Float(f) | PropertyValue::Double(f) => format_float(*f),
        PropertyValue::Regex(r) => regex_literal(language, &constant.name, r)?,
        PropertyValue::String(s) => quoted(s, '\''),
    };
    Ok(literal)
}
