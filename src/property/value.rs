//! The closed set of property types and their canonical values.

use std::fmt;
use std::str::FromStr;

use crate::resolve::ResolveError;

/// Type tag of a property as declared in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Boolean,
    Integer,
    Float,
    Double,
    Regex,
    String,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Boolean,
        PropertyType::Integer,
        PropertyType::Float,
        PropertyType::Double,
        PropertyType::Regex,
        PropertyType::String,
    ];

    /// Canonical tag as used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Boolean => "boolean",
            PropertyType::Integer => "integer",
            PropertyType::Float => "float",
            PropertyType::Double => "double",
            PropertyType::Regex => "regex",
            PropertyType::String => "string",
        }
    }

    /// Whether a float or double property can hold `value`. Floats are
    /// emitted as single precision, so their range is that of `f32`.
    pub fn can_represent(self, value: f64) -> bool {
        match self {
            PropertyType::Float => value.is_finite() && (value as f32).is_finite(),
            _ => value.is_finite(),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PropertyType::Integer | PropertyType::Float | PropertyType::Double
        )
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type tag is not one of the supported ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl FromStr for PropertyType {
    type Err = UnknownType;

    /// Accepts both the long tags and the short forms used by older documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" | "boolean" => Ok(PropertyType::Boolean),
            "int" | "integer" => Ok(PropertyType::Integer),
            "float" => Ok(PropertyType::Float),
            "double" => Ok(PropertyType::Double),
            "regex" => Ok(PropertyType::Regex),
            "string" | "str" => Ok(PropertyType::String),
            other => Err(UnknownType(other.to_string())),
        }
    }
}

/// A value as it appeared in the document, before type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Returns the text if this raw value contains at least one `${...}` placeholder.
    pub fn expression(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) if s.contains("${") => Some(s),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Bool(b) => format!("boolean `{b}`"),
            RawValue::Integer(i) => format!("integer `{i}`"),
            RawValue::Float(f) => format!("number `{f}`"),
            RawValue::Text(s) => format!("text `{s}`"),
        }
    }
}

/// Pattern text and flags of a regex property, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexValue {
    pub pattern: String,
    pub flags: String,
}

impl RegexValue {
    /// Splits `/pattern/flags` notation; anything else is taken as a bare pattern.
    pub fn parse(raw: &str) -> Self {
        if let Some(body) = raw.strip_prefix('/') {
            if let Some(end) = body.rfind('/') {
                let flags = &body[end + 1..];
                if flags.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Self {
                        pattern: body[..end].to_string(),
                        flags: flags.to_string(),
                    };
                }
            }
        }
        Self {
            pattern: raw.to_string(),
            flags: String::new(),
        }
    }
}

/// A fully resolved value. The variant always matches the declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Double(f64),
    Regex(RegexValue),
    String(String),
}

impl PropertyValue {
    /// Coerces a literal into a value of the given type.
    ///
    /// `name` is only used for error reporting. Placeholders are not looked at
    /// here; callers handle expressions before falling back to this.
    pub fn parse(ty: PropertyType, raw: &RawValue, name: &str) -> Result<Self, ResolveError> {
        let mismatch = || ResolveError::TypeMismatch {
            name: name.to_string(),
            expected: ty,
            found: raw.describe(),
        };

        match (ty, raw) {
            (PropertyType::Boolean, RawValue::Bool(b)) => Ok(PropertyValue::Boolean(*b)),
            (PropertyType::Boolean, RawValue::Text(s)) => match s.as_str() {
                "true" => Ok(PropertyValue::Boolean(true)),
                "false" => Ok(PropertyValue::Boolean(false)),
                _ => Err(mismatch()),
            },
            (PropertyType::Integer, RawValue::Integer(i)) => Ok(PropertyValue::Integer(*i)),
            (PropertyType::Integer, RawValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(PropertyValue::Integer)
                .map_err(|_| mismatch()),
            (PropertyType::Float | PropertyType::Double, _) => {
                let value = match raw {
                    RawValue::Integer(i) => *i as f64,
                    RawValue::Float(f) => *f,
                    RawValue::Text(s) => parse_finite(s).ok_or_else(mismatch)?,
                    RawValue::Bool(_) => return Err(mismatch()),
                };
                if !ty.can_represent(value) {
                    return Err(mismatch());
                }
                Ok(PropertyValue::from_number(ty, value))
            }
            (PropertyType::Regex, RawValue::Text(s)) => {
                Ok(PropertyValue::Regex(RegexValue::parse(s)))
            }
            (PropertyType::String, RawValue::Text(s)) => Ok(PropertyValue::String(s.clone())),
            (PropertyType::String, RawValue::Bool(b)) => Ok(PropertyValue::String(b.to_string())),
            (PropertyType::String, RawValue::Integer(i)) => {
                Ok(PropertyValue::String(i.to_string()))
            }
            (PropertyType::String, RawValue::Float(f)) => {
                Ok(PropertyValue::String(format_float(*f)))
            }
            _ => Err(mismatch()),
        }
    }

    pub(crate) fn from_number(ty: PropertyType, value: f64) -> Self {
        match ty {
            PropertyType::Double => PropertyValue::Double(value),
            _ => PropertyValue::Float(value),
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::Regex(_) => PropertyType::Regex,
            PropertyValue::String(_) => PropertyType::String,
        }
    }

    /// Canonical textual form, as used for string interpolation.
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Float(f) | PropertyValue::Double(f) => format_float(*f),
            PropertyValue::Regex(r) => r.pattern.clone(),
            PropertyValue::String(s) => s.clone(),
        }
    }
}

/// Formats a float the way every renderer expects it: shortest round-trip
/// digits, with `.0` appended to integral values.
pub fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    let s = s.trim();
    // Rust accepts `inf` and `NaN`, which no target language can spell as a literal.
    if !s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
