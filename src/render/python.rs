use std::fmt::Write;

use super::{
    check_type_name, constants, inline_flags, quoted, Language, RenderError, RenderOptions,
    Renderer, TypeSupport,
};
use crate::naming::NamingConvention;
use crate::property::{format_float, PropertyTable, PropertyType, PropertyValue};

/// Emits an `Enum` subclass with one member per property.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonRenderer;

impl Renderer for PythonRenderer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extension(&self) -> &'static str {
        "py"
    }

    fn default_file_naming(&self) -> NamingConvention {
        NamingConvention::Snake
    }

    fn type_support(&self, ty: PropertyType) -> TypeSupport {
        match ty {
            PropertyType::Float => TypeSupport::Fallback("float (double precision)"),
            PropertyType::Regex => {
                TypeSupport::Fallback("raw string holding the pattern; compile with re.compile")
            }
            _ => TypeSupport::Native,
        }
    }

    fn render(&self, table: &PropertyTable, options: &RenderOptions) -> Result<String, RenderError> {
        check_type_name(Language::Python, options)?;
        let constants = constants(Language::Python, table, options)?;
        let pad = options.pad();

        let mut out = String::new();
        if let Some(header) = &options.header {
            let _ = writeln!(out, "# {header}");
        }
        out.push_str("from enum import Enum\n\n\n");
        let _ = writeln!(out, "class {}(Enum):", options.type_name);

        if constants.is_empty() {
            let _ = writeln!(out, "{pad}pass");
        }
        for constant in &constants {
            let value = match &constant.property.value {
                PropertyValue::Boolean(true) => "True".to_string(),
                PropertyValue::Boolean(false) => "False".to_string(),
                PropertyValue::Integer(i) => i.to_string(),
                PropertyValue::Float(f) | PropertyValue::Double(f) => format_float(*f),
                PropertyValue::Regex(r) => {
                    raw_string(&inline_flags(Language::Python, &constant.name, r)?)
                }
                PropertyValue::String(s) => quoted(s, '\''),
            };
            let _ = write!(out, "{pad}{} = {value}", constant.name);
            if let Some(comment) = constant.comment() {
                let _ = write!(out, "  # {comment}");
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Uses an `r'...'` literal unless the pattern cannot be spelled as one.
fn raw_string(pattern: &str) -> String {
    let trailing_backslashes = pattern.chars().rev().take_while(|&c| c == '\\').count();
    if pattern.contains(['\'', '\n', '\r']) || trailing_backslashes % 2 == 1 {
        quoted(pattern, '\'')
    } else {
        format!("r'{pattern}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyTable, RegexValue};
    use crate::render::test_support::{sample_table, table_with};

    #[test]
    fn test_render_sample() {
        let output = PythonRenderer
            .render(&sample_table(), &RenderOptions::new("TestConfig"))
            .unwrap();
        assert_eq!(
            output,
            "from enum import Enum\n\
             \n\
             \n\
             class TestConfig(Enum):\n\
             \x20   myBoolean = True\n\
             \x20   myInteger = 142\n\
             \x20   myFloat = 322.0\n\
             \x20   myDouble = 233.9\n\
             \x20   myRegex = r'Test Reg(E|e)x'  # Just another RegEx.\n\
             \x20   mySubstitutedString = 'Sometimes I just want to scream Hello World!'\n"
        );
    }

    #[test]
    fn test_empty_enum_gets_pass() {
        let output = PythonRenderer
            .render(&PropertyTable::default(), &RenderOptions::new("Empty"))
            .unwrap();
        assert!(output.ends_with("class Empty(Enum):\n    pass\n"));
    }

    #[test]
    fn test_regex_with_quote_falls_back_to_escaped_string() {
        let table = table_with(
            "quote",
            PropertyValue::Regex(RegexValue {
                pattern: "it's".into(),
                flags: "i".into(),
            }),
        );
        let output = PythonRenderer.render(&table, &RenderOptions::new("C")).unwrap();
        assert!(output.contains(r"quote = '(?i)it\'s'"));
    }

    #[test]
    fn test_raw_string() {
        assert_eq!(raw_string(r"\d+"), r"r'\d+'");
        assert_eq!(raw_string(r"ends\"), r"'ends\\'");
    }
}
