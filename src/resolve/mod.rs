//! Turning a root document into a fully evaluated property table.
//!
//! Resolution runs in two stages. [`IncludeResolver`] expands includes and
//! merges declarations by name, then [`evaluate`] substitutes references and
//! checks every value against its declared type.

mod error;
mod include;
mod substitute;

pub use error::{Diagnostics, ResolveError};
pub use include::{IncludeResolver, Merged, OverridePosition};
pub use substitute::evaluate;
