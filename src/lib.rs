//! Typed constant generation from layered configuration documents.
//!
//! A root document declares typed properties, pulls in other documents with
//! `includes`, and lists the languages to generate. Properties may reference
//! each other with `${name}`. The resolved property set is rendered once per
//! target language.

pub mod document;
pub mod generate;
pub mod naming;
pub mod property;
pub mod render;
pub mod resolve;
pub mod settings;
mod error;

pub use error::Error;
pub use generate::{GenerationReport, GenerationTarget, Generator, RenderedFile, Resolved};
pub use naming::NamingConvention;
pub use property::{PropertyTable, PropertyType, PropertyValue};
pub use render::{Language, RenderError, Renderer};
pub use resolve::{Diagnostics, ResolveError};
pub use settings::{Settings, SettingsError};
