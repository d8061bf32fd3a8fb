use thiserror::Error;

use super::Language;

/// Failure to render one target. Sibling targets are unaffected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("{language} output requires the '{option}' option")]
    MissingOption {
        language: Language,
        option: &'static str,
    },

    #[error("invalid {language} '{option}' value '{value}': {reason}")]
    InvalidOption {
        language: Language,
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("'{name}' is not a valid {language} identifier")]
    InvalidIdentifier { language: Language, name: String },

    #[error("{language} constant name '{name}' is produced by more than one property")]
    DuplicateConstant { language: Language, name: String },

    #[error("{language} cannot express regex flags '{flags}' of property '{name}'")]
    UnsupportedRegexFlags {
        language: Language,
        name: String,
        flags: String,
    },

    #[error("regex property '{name}' cannot be written as a {language} literal: {reason}")]
    InvalidRegex {
        language: Language,
        name: String,
        reason: &'static str,
    },

    #[error("{language} cannot represent an empty property set")]
    EmptyTable { language: Language },
}
