//! Column registry.
//!
//! Properties are discovered at ingestion time and registered as
//! `namespace.name` columns (`exif.iso`, `fits.exptime`) or as bare names
//! (`length`). Lookups accept the full name, a short name that only one
//! namespace owns, or any unambiguous prefix of either.

use std::{collections::BTreeMap, ops::Bound};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    node::Record,
    value::{TypeTag, fold_case},
};

/// How many candidates an ambiguous prefix error lists.
const MAX_CANDIDATES: usize = 5;

/// A named, typed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Qualified name in its original casing, e.g. `Exif.ISO`
    pub qualified_name: String,
    pub declared_type: TypeTag,
}

impl Column {
    pub fn new(qualified_name: impl Into<String>, declared_type: TypeTag) -> Self {
        Column {
            qualified_name: qualified_name.into(),
            declared_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error(
        "Property '{name}' exists in multiple directories: {}\nPlease specify the desired directory like this: \"{}.{name}\"",
        owners(.namespaces),
        suggested(.namespaces)
    )]
    Ambiguous { name: String, namespaces: Vec<String> },

    #[error("Property '{name}' matches multiple properties: {}", .candidates.join(", "))]
    AmbiguousPrefix { name: String, candidates: Vec<String> },
}

/// Label for columns registered without a namespace
const NO_NAMESPACE: &str = "(top level)";

fn owners(namespaces: &[String]) -> String {
    namespaces
        .iter()
        .map(|namespace| match namespace.as_str() {
            "" => NO_NAMESPACE,
            namespace => namespace,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A namespace the user can actually type; bare columns are reached by
/// their full short name.
fn suggested(namespaces: &[String]) -> &str {
    namespaces
        .iter()
        .map(String::as_str)
        .find(|namespace| !namespace.is_empty())
        .unwrap_or_default()
}

/// Flattened map of every known column.
///
/// The registry only grows. Keys are case-folded; the casing a column was
/// registered with is kept for display.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// folded qualified name -> column
    columns: BTreeMap<String, Column>,
    /// folded short name -> owning namespaces ("" for bare names)
    owners: BTreeMap<String, Vec<String>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `namespace.short_name` (or `short_name` when the namespace
    /// is empty). Returns `false` when the column already exists, in which
    /// case nothing changes.
    pub fn register(&mut self, namespace: &str, short_name: &str, declared_type: TypeTag) -> bool {
        let short_name = short_name.trim();
        if short_name.is_empty() {
            return false;
        }

        let namespace = namespace.trim();
        let qualified = qualify(namespace, short_name);
        let key = fold_case(&qualified);
        if self.columns.contains_key(&key) {
            return false;
        }

        trace!(column = %qualified, ty = %declared_type, "registering column");
        self.columns.insert(key, Column::new(qualified, declared_type));
        let owners = self.owners.entry(fold_case(short_name)).or_default();
        owners.push(namespace.to_string());
        owners.sort();
        true
    }

    /// Builds a schema from the properties the records carry.
    ///
    /// Each property's type is taken from the first record holding a
    /// non-null value for it. Names containing a `.` are split into
    /// namespace and short name at the first dot.
    pub fn infer<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut samples: BTreeMap<String, (&'a str, TypeTag)> = BTreeMap::new();
        for record in records {
            for (name, value) in record.properties() {
                if let Some(ty) = value.type_tag() {
                    samples.entry(fold_case(name)).or_insert((name, ty));
                }
            }
        }

        let mut schema = Schema::new();
        for (name, ty) in samples.into_values() {
            match name.split_once('.') {
                Some((namespace, short_name)) => schema.register(namespace, short_name, ty),
                None => schema.register("", name, ty),
            };
        }

        debug!(columns = schema.len(), "inferred schema");
        schema
    }

    /// Resolves a (possibly abbreviated) property name.
    ///
    /// Tries, in order: the exact qualified name, a short name owned by a
    /// single namespace, a unique short-name prefix and a unique
    /// qualified-name prefix. `Ok(None)` means no column matched; callers
    /// decide whether that is fatal.
    pub fn lookup(&self, name: &str) -> Result<Option<&Column>, SchemaError> {
        let key = fold_case(name);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(column) = self.columns.get(&key) {
            return Ok(Some(column));
        }

        if let Some(namespaces) = self.owners.get(&key) {
            return self.resolve_short(&key, namespaces);
        }

        let shorts: Vec<_> = self
            .owners
            .range::<str, _>((Bound::Included(key.as_str()), Bound::Unbounded))
            .take_while(|(short, _)| short.starts_with(&key))
            .collect();

        match shorts.as_slice() {
            [(short, namespaces)] => return self.resolve_short(short, namespaces),
            [] => {}
            many => {
                return Err(SchemaError::AmbiguousPrefix {
                    name: key,
                    candidates: many
                        .iter()
                        .take(MAX_CANDIDATES)
                        .map(|(short, _)| short.to_string())
                        .collect(),
                });
            }
        }

        let qualified: Vec<_> = self
            .columns
            .range::<str, _>((Bound::Included(key.as_str()), Bound::Unbounded))
            .take_while(|(candidate, _)| candidate.starts_with(&key))
            .map(|(_, column)| column)
            .collect();

        match qualified.as_slice() {
            [] => Ok(None),
            [column] => Ok(Some(*column)),
            many => Err(SchemaError::AmbiguousPrefix {
                name: key,
                candidates: many
                    .iter()
                    .take(MAX_CANDIDATES)
                    .map(|column| column.qualified_name.clone())
                    .collect(),
            }),
        }
    }

    fn resolve_short(&self, short: &str, namespaces: &[String]) -> Result<Option<&Column>, SchemaError> {
        match namespaces {
            [namespace] => Ok(self.columns.get(&fold_case(&qualify(namespace, short)))),
            _ => Err(SchemaError::Ambiguous {
                name: short.to_string(),
                namespaces: namespaces.to_vec(),
            }),
        }
    }

    /// Exact (case-insensitive) qualified-name membership
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.columns.contains_key(&fold_case(qualified_name))
    }

    /// All columns, ordered by qualified name
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Columns whose qualified name contains `text`, ignoring case
    pub fn matching<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a Column> + 'a {
        let needle = fold_case(text);
        self.columns
            .iter()
            .filter(move |(key, _)| key.contains(&needle))
            .map(|(_, column)| column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn qualify(namespace: &str, short_name: &str) -> String {
    if namespace.is_empty() {
        short_name.to_string()
    } else {
        format!("{}.{}", namespace, short_name)
    }
}
