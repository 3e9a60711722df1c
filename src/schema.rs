use itertools::Itertools;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
};
use thiserror::Error;

#[derive(Error, PartialEq, Debug)]
pub enum SchemaError {
    #[error("attribute {0} has already been defined")]
    AlreadyPresent(String),
    #[error("attribute name '{0}' is invalid")]
    InvalidName(String),
}

/// Translates a dotted property path (e.g. `address.street`) into the attribute identifiers that
/// lead to it.
///
/// This is the boundary between the compiler and whatever metadata layer describes the data
/// instances being matched.
pub trait PathTranslator {
    /// Return `None` if the path does not designate a known attribute.
    fn translate(&self, path: &str) -> Option<AttributePath>;
}

#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Debug, Hash)]
pub struct AttributeId(usize);

impl AttributeId {
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl Display for AttributeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "attribute({})", self.0)
    }
}

/// The ordered attribute identifiers of a property path.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AttributePath {
    ids: Vec<AttributeId>,
    repeated: bool,
}

impl AttributePath {
    pub fn new(ids: Vec<AttributeId>, repeated: bool) -> Self {
        Self { ids, repeated }
    }

    #[inline]
    pub fn ids(&self) -> &[AttributeId] {
        &self.ids
    }

    /// Whether the path goes through a collection, in which case an attribute may yield many
    /// values for the same data instance.
    #[inline]
    pub const fn is_repeated(&self) -> bool {
        self.repeated
    }
}

impl Display for AttributePath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.ids.iter().join("."))?;
        if self.repeated {
            write!(formatter, "[*]")?;
        }
        Ok(())
    }
}

/// The definition of an attribute that is usable by the [`AttributeTable`]
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    repeated: bool,
    children: Vec<AttributeDefinition>,
}

impl AttributeDefinition {
    /// Create a single-valued attribute definition.
    pub fn scalar(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            repeated: false,
            children: vec![],
        }
    }

    /// Create a collection-valued attribute definition.
    pub fn repeated(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            repeated: true,
            children: vec![],
        }
    }

    /// Create a single-valued attribute definition that embeds other attributes.
    pub fn embedded(name: &str, children: &[AttributeDefinition]) -> Self {
        Self {
            name: name.to_owned(),
            repeated: false,
            children: children.to_vec(),
        }
    }

    /// Create a collection of embedded attributes.
    pub fn repeated_embedded(name: &str, children: &[AttributeDefinition]) -> Self {
        Self {
            name: name.to_owned(),
            repeated: true,
            children: children.to_vec(),
        }
    }
}

#[derive(Clone, Debug)]
struct AttributeEntry {
    repeated: bool,
    children: HashMap<String, AttributeId>,
}

/// A [`PathTranslator`] built from a fixed set of [`AttributeDefinition`]s.
///
/// Every attribute, nested or not, receives its own [`AttributeId`].
#[derive(Clone, Debug)]
pub struct AttributeTable {
    roots: HashMap<String, AttributeId>,
    by_ids: Vec<AttributeEntry>,
}

impl AttributeTable {
    pub fn new(definitions: &[AttributeDefinition]) -> Result<Self, SchemaError> {
        let mut table = Self {
            roots: HashMap::with_capacity(definitions.len()),
            by_ids: Vec::with_capacity(definitions.len()),
        };
        let roots = table.insert_all(definitions)?;
        table.roots = roots;
        Ok(table)
    }

    fn insert_all(
        &mut self,
        definitions: &[AttributeDefinition],
    ) -> Result<HashMap<String, AttributeId>, SchemaError> {
        let mut by_names = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            let name = definition.name.to_owned();
            if name.is_empty() || name.contains('.') {
                return Err(SchemaError::InvalidName(name));
            }
            if by_names.contains_key(&name) {
                return Err(SchemaError::AlreadyPresent(name));
            }

            let id = AttributeId(self.by_ids.len());
            self.by_ids.push(AttributeEntry {
                repeated: definition.repeated,
                children: HashMap::new(),
            });
            let children = self.insert_all(&definition.children)?;
            self.by_ids[id.0].children = children;
            by_names.insert(name, id);
        }

        Ok(by_names)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_ids.is_empty()
    }
}

impl PathTranslator for AttributeTable {
    fn translate(&self, path: &str) -> Option<AttributePath> {
        let mut ids = Vec::new();
        let mut repeated = false;
        let mut names = &self.roots;
        for segment in path.split('.') {
            let id = *names.get(segment)?;
            let entry = &self.by_ids[id.0];
            repeated |= entry.repeated;
            names = &entry.children;
            ids.push(id);
        }

        Some(AttributePath { ids, repeated })
    }
}
