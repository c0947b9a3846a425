use std::collections::BTreeMap;

use crate::value::{NULL, Value, fold_case};

/// Anything a filter can be evaluated against.
///
/// Implementations must return [`Value::Null`] for names they do not carry;
/// a lookup never fails.
pub trait Node {
    fn property(&self, name: &str) -> &Value;
}

/// A file or directory with the properties extracted for it.
///
/// Property names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Record {
    id: String,
    parent: Option<String>,
    /// folded name -> (display name, value)
    properties: BTreeMap<String, (String, Value)>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder form of [`Record::insert`]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a property, returning the previous value if there was one.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.properties
            .insert(fold_case(name), (name.trim().to_string(), value.into()))
            .map(|(_, previous)| previous)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Properties in name order, with their original casing
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Node for Record {
    fn property(&self, name: &str) -> &Value {
        self.properties
            .get(&fold_case(name))
            .map(|(_, value)| value)
            .unwrap_or(&NULL)
    }
}

impl<N: Node + ?Sized> Node for &N {
    fn property(&self, name: &str) -> &Value {
        (**self).property(name)
    }
}

#[test]
fn test_missing_property_is_null() {
    let record = Record::new("/photos/a.jpg").with("Length", 1024);
    assert_eq!(record.property("length"), &Value::Integer(1024));
    assert!(record.property("exif.iso").is_null());
}

#[test]
fn test_insert_replaces() {
    let mut record = Record::new("a");
    assert!(record.insert("iso", 100).is_none());
    assert_eq!(record.insert("ISO", 200), Some(Value::Integer(100)));
    assert_eq!(record.len(), 1);
    assert_eq!(record.properties().next(), Some(("ISO", &Value::Integer(200))));
}
