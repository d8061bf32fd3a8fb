use std::fmt::Write;

use super::typescript::literal;
use super::{check_type_name, constants, Language, RenderError, RenderOptions, Renderer, TypeSupport};
use crate::naming::NamingConvention;
use crate::property::{PropertyTable, PropertyType};

/// Emits a CommonJS class exposing each property through a static getter.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptRenderer;

impl Renderer for JavaScriptRenderer {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn file_extension(&self) -> &'static str {
        "js"
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
        check_type_name(Language::JavaScript, options)?;
        let constants = constants(Language::JavaScript, table, options)?;
        let pad = options.pad();

        let mut out = String::new();
        if let Some(header) = &options.header {
            let _ = writeln!(out, "// {header}");
        }
        let _ = writeln!(out, "class {} {{", options.type_name);

        for constant in &constants {
            let _ = write!(
                out,
                "{pad}static get {}() {{ return {}; }}",
                constant.name,
                literal(Language::JavaScript, constant)?
            );
            if let Some(comment) = constant.comment() {
                let _ = write!(out, " // {comment}");
            }
            out.push('\n');
        }

        out.push_str("}\n");
        let _ = writeln!(out, "module.exports = {};", options.type_name);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::sample_table;

    #[test]
    fn test_render_sample() {
        let mut options = RenderOptions::new("TestConfig");
        options.header = Some("Generated with constforge v0.1.0".into());
        let output = JavaScriptRenderer.render(&sample_table(), &options).unwrap();
        assert_eq!(
            output,
            "// Generated with constforge v0.1.0\n\
             class TestConfig {\n\
             \x20   static get myBoolean() { return true; }\n\
             \x20   static get myInteger() { return 142; }\n\
             \x20   static get myFloat() { return 322.0; }\n\
             \x20   static get myDouble() { return 233.9; }\n\
             \x20   static get myRegex() { return /Test Reg(E|e)x/; } // Just another RegEx.\n\
             \x20   static get mySubstitutedString() { return 'Sometimes I just want to scream Hello World!'; }\n\
             }\n\
             module.exports = TestConfig;\n"
        );
    }
}
