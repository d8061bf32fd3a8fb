use std::collections::HashMap;

use super::{PropertyDeclaration, PropertyValue};

/// A declaration paired with its final value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub declaration: PropertyDeclaration,
    pub value: PropertyValue,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.declaration.comment.as_deref()
    }
}

/// Ordered, name-unique set of resolved properties.
///
/// Only the substitution evaluator builds tables; everything downstream gets a
/// shared reference and cannot change it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    entries: Vec<Property>,
    index: HashMap<String, usize>,
}

impl PropertyTable {
    /// Builds a table from properties whose names are already unique.
    pub(crate) fn from_properties(entries: Vec<Property>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, p)| (p.declaration.name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// All properties in declaration order, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }

    /// Properties that renderers emit, in declaration order.
    pub fn visible(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter().filter(|p| !p.declaration.hidden)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.declaration.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
