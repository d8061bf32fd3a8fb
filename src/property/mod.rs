//! Typed properties: the value type system, declarations and the resolved table.

mod declaration;
mod table;
mod value;

pub use declaration::{is_valid_name, Origin, PropertyDeclaration};
pub use table::{Property, PropertyTable};
pub use value::{format_float, PropertyType, PropertyValue, RawValue, RegexValue, UnknownType};
