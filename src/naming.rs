//! Naming convention conversion for type, constant and file names.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    Snake,
    ScreamingSnake,
    Camel,
    Pascal,
    Kebab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConvention(pub String);

impl fmt::Display for UnknownConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown naming convention '{}' (expected snake, screaming_snake, camel, pascal or kebap)",
            self.0
        )
    }
}

impl FromStr for NamingConvention {
    type Err = UnknownConvention;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" => Ok(NamingConvention::Snake),
            "screaming_snake" => Ok(NamingConvention::ScreamingSnake),
            "camel" => Ok(NamingConvention::Camel),
            "pascal" => Ok(NamingConvention::Pascal),
            "kebap" | "kebab" => Ok(NamingConvention::Kebab),
            other => Err(UnknownConvention(other.to_string())),
        }
    }
}

impl NamingConvention {
    /// Converts `name` into this convention.
    ///
    /// Word boundaries are uppercase letters and runs of non-identifier
    /// characters, so `myHttpPort`, `my-http-port` and `my_http_port` all split
    /// into the same words.
    pub fn convert(self, name: &str) -> String {
        let words = split_words(name);
        match self {
            NamingConvention::Snake => words.join("_"),
            NamingConvention::ScreamingSnake => words.join("_").to_uppercase(),
            NamingConvention::Kebab => words.join("-"),
            NamingConvention::Camel | NamingConvention::Pascal => {
                let mut out = String::with_capacity(name.len());
                for (i, word) in words.iter().enumerate() {
                    if i == 0 && self == NamingConvention::Camel {
                        out.push_str(word);
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
        }
    }
}

/// Splits into lowercase words.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch.to_ascii_lowercase());
        } else if ch.is_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let cases = [
            (NamingConvention::Snake, "test_config"),
            (NamingConvention::ScreamingSnake, "TEST_CONFIG"),
            (NamingConvention::Camel, "testConfig"),
            (NamingConvention::Pascal, "TestConfig"),
            (NamingConvention::Kebab, "test-config"),
        ];
        for input in ["test-config", "TestConfig", "test_config", "testConfig"] {
            for (convention, expected) in cases {
                assert_eq!(convention.convert(input), expected, "{input} as {convention:?}");
            }
        }
    }

    #[test]
    fn test_runs_of_separators_collapse() {
        assert_eq!(NamingConvention::Snake.convert("a--b__c"), "a_b_c");
        assert_eq!(NamingConvention::Pascal.convert("my.config v2"), "MyConfigV2");
    }

    #[test]
    fn test_parse_conventions() {
        assert_eq!("kebap".parse(), Ok(NamingConvention::Kebab));
        assert_eq!("kebab".parse(), Ok(NamingConvention::Kebab));
        assert!("title".parse::<NamingConvention>().is_err());
    }
}
