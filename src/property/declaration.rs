use std::path::PathBuf;

use super::{PropertyType, RawValue};

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub document: PathBuf,
    /// 1-based line of the declaration's list entry.
    pub line: usize,
}

/// One property as written in a document, before any resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub ty: PropertyType,
    pub raw: RawValue,
    pub comment: Option<String>,
    /// Hidden properties take part in substitution but are not emitted.
    pub hidden: bool,
    pub origin: Origin,
}

/// Returns true if `name` can be used as an identifier in every target language.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("myBoolean"));
        assert!(is_valid_name("_private2"));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("with-dash"));
        assert!(!is_valid_name(""));
    }
}
