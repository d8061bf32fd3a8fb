use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::naming::NamingConvention;
use crate::render::{Language, RenderOptions};

const DEFAULT_OUTPUT: &str = "{name}.{ext}";

/// One requested output: a language plus its naming and layout options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTarget {
    pub language: Language,
    pub file_naming: Option<NamingConvention>,
    pub property_naming: Option<NamingConvention>,
    pub type_naming: Option<NamingConvention>,
    pub indent: Option<usize>,
    /// Output path relative to the output directory. `{name}` and `{ext}` are
    /// replaced with the file stem and the renderer's extension.
    pub output: Option<String>,
    /// Remaining language options, passed through to the renderer untouched.
    pub options: BTreeMap<String, String>,
}

impl GenerationTarget {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            file_naming: None,
            property_naming: None,
            type_naming: None,
            indent: None,
            output: None,
            options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Output file name without extension.
    pub fn file_stem(&self, config_name: &str) -> String {
        self.file_naming
            .unwrap_or_else(|| self.language.renderer().default_file_naming())
            .convert(config_name)
    }

    pub fn render_options(
        &self,
        config_name: &str,
        default_indent: usize,
        header: Option<&str>,
    ) -> RenderOptions {
        let renderer = self.language.renderer();
        let type_naming = self.type_naming.unwrap_or(renderer.default_type_naming());

        RenderOptions {
            type_name: type_naming.convert(config_name),
            file_stem: self.file_stem(config_name),
            indent: self.indent.unwrap_or(default_indent),
            property_naming: self.property_naming,
            header: header.map(str::to_string),
            extra: self.options.clone(),
        }
    }

    /// Path of the generated file relative to the output directory.
    pub fn output_path(&self, config_name: &str) -> PathBuf {
        let template = self.output.as_deref().unwrap_or(DEFAULT_OUTPUT);
        let path = template
            .replace("{name}", &self.file_stem(config_name))
            .replace("{ext}", self.language.renderer().file_extension());
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let target = GenerationTarget::new(Language::Java);
        let options = target.render_options("test-config", 4, None);
        assert_eq!(options.type_name, "TestConfig");
        assert_eq!(options.file_stem, "TestConfig");
        assert_eq!(target.output_path("test-config"), PathBuf::from("TestConfig.java"));
    }

    #[test]
    fn test_default_file_naming_per_language() {
        let expected = [
            (Language::Java, "MyConfig.java"),
            (Language::TypeScript, "my-config.ts"),
            (Language::JavaScript, "my-config.js"),
            (Language::Python, "my_config.py"),
            (Language::Go, "my_config.go"),
            (Language::C, "my_config.h"),
        ];
        for (language, file) in expected {
            let target = GenerationTarget::new(language);
            assert_eq!(target.output_path("myConfig"), PathBuf::from(file), "{language}");
        }
    }

    #[test]
    fn test_naming_and_template() {
        let mut target = GenerationTarget::new(Language::C);
        target.file_naming = Some(NamingConvention::Snake);
        target.type_naming = Some(NamingConvention::Camel);
        target.indent = Some(2);
        target.output = Some("include/{name}.{ext}".into());

        let options = target.render_options("TestConfig", 4, Some("hdr"));
        assert_eq!(options.type_name, "testConfig");
        assert_eq!(options.indent, 2);
        assert_eq!(options.header.as_deref(), Some("hdr"));
        assert_eq!(
            target.output_path("TestConfig"),
            PathBuf::from("include/test_config.h")
        );
    }
}
