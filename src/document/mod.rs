//! Configuration documents: where their text comes from and how it is parsed.

mod parser;
mod source;

pub use parser::{parse, Document, IncludeDirective, Item};
pub use source::{include_path, normalize, DocumentSource, FileSource, MemorySource};
