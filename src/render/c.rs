use std::fmt::Write;

use super::{
    check_type_name, constants, escape, inline_flags, Language, RenderError, RenderOptions,
    Renderer, TypeSupport,
};
use crate::naming::NamingConvention;
use crate::property::{format_float, PropertyTable, PropertyType, PropertyValue};

/// Emits a header with an include guard and a single const anonymous struct.
#[derive(Debug, Clone, Copy, Default)]
pub struct CRenderer;

impl Renderer for CRenderer {
    fn language(&self) -> Language {
        Language::C
    }

    fn file_extension(&self) -> &'static str {
        "h"
    }

    fn default_file_naming(&self) -> NamingConvention {
        NamingConvention::Snake
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport {
        match ty {
            PropertyType::Boolean => TypeSupport::Fallback("unsigned char holding 1 or 0"),
            PropertyType::String => TypeSupport::Fallback("const char* literal"),
            PropertyType::Regex => TypeSupport::Fallback("const char* holding the pattern"),
            _ => TypeSupport::Native,
        }
    }

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError> {
        check_type_name(Language::C, options)?;
        let constants = constants(Language::C, table, options)?;
        if constants.is_empty() {
            return Err(RenderError::EmptyTable {
                language: Language::C,
            });
        }
        let pad = options.pad();
        let guard = format!(
            "{}_H",
            NamingConvention::ScreamingSnake.convert(&options.file_stem)
        );

        let mut out = format!("#ifndef {guard}\n#define {guard}\n\n");
        if let Some(header) = &options.header {
            let _ = writeln!(out, "/* {header} */");
        }
        out.push_str("const struct {\n");

        let mut values = String::new();
        for constant in &constants {
            let (ty, value) = match &constant.property.value {
                PropertyValue::Boolean(b) => ("unsigned char", u8::from(*b).to_string()),
                PropertyValue::Integer(i) if i32::try_from(*i).is_ok() => ("int", i.to_string()),
                // 9223372036854775808LL overflows before the minus applies.
                PropertyValue::Integer(i64::MIN) => {
                    ("long long", "(-9223372036854775807LL - 1)".to_string())
                }
                PropertyValue::Integer(i) => ("long long", format!("{i}LL")),
                PropertyValue::Float(f) => ("float", format!("{}f", format_float(*f))),
                PropertyValue::Double(d) => ("double", format_float(*d)),
                PropertyValue::Regex(r) => (
                    "const char*",
                    c_string(&inline_flags(Language::C, &constant.name, r)?),
                ),
                PropertyValue::String(s) => ("const char*", c_string(s)),
            };
            let _ = write!(out, "{pad}{ty} {};", constant.name);
            if let Some(comment) = constant.comment() {
                let _ = write!(out, " /* {} */", comment.replace("*/", "* /"));
            }
            out.push('\n');
            let _ = writeln!(values, "{pad}.{} = {value},", constant.name);
        }

        let _ = writeln!(out, "}} {} = {{", options.type_name);
        out.push_str(&values);
        out.push_str("};\n\n");
        let _ = writeln!(out, "#endif /* {guard} */");
        Ok(out)
    }
}

fn c_string(s: &str) -> String {
    format!("\"{}\"", escape(s, '"', true))
}
