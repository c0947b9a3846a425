//! JSON <-> record conversion
//!
//! Input is an array of objects. Scalar members become properties, and a
//! nested object contributes `namespace.key` properties:
//!
//! ```text
//! [{"id": "/photos/a.jpg", "parent": "/photos", "length": 1024,
//!   "exif": {"iso": 400, "model": "X100"}}]
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Map;
use tracing::{debug, warn};

use super::CliError;
use crate::{Record, Value};

const ID: &str = "id";
const PARENT: &str = "parent";

/// Convert a scalar JSON value; arrays and objects have no property form.
pub fn json_to_value(v: serde_json::Value) -> Option<Value> {
    match v {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(b) => Some(Value::Boolean(b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        serde_json::Value::String(s) => Some(match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Value::DateTime(dt.with_timezone(&Utc)),
            Err(_) => Value::String(s),
        }),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => {
            serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Type(ty) => serde_json::Value::String(ty.name().to_string()),
    }
}

/// Parse records from JSON text.
pub fn load_records(text: &str) -> Result<Vec<Record>, CliError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    json_to_records(json)
}

pub fn json_to_records(json: serde_json::Value) -> Result<Vec<Record>, CliError> {
    let serde_json::Value::Array(items) = json else {
        return Err(CliError::InvalidRecords(
            "expected an array of objects".to_string(),
        ));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(members) => Ok(json_to_record(index, members)),
            _ => Err(CliError::InvalidRecords(format!(
                "record {} is not an object",
                index
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(records = records.len(), "loaded records");
    Ok(records)
}

fn json_to_record(index: usize, mut members: Map<String, serde_json::Value>) -> Record {
    let id = match members.remove(ID) {
        Some(serde_json::Value::String(id)) => id,
        Some(other) if !other.is_null() => other.to_string(),
        _ => format!("#{}", index),
    };

    let mut record = Record::new(id);
    if let Some(serde_json::Value::String(parent)) = members.remove(PARENT) {
        record = record.with_parent(parent);
    }

    for (name, value) in members {
        match value {
            serde_json::Value::Object(nested) => {
                for (key, value) in nested {
                    insert(&mut record, &format!("{}.{}", name, key), value);
                }
            }
            value => insert(&mut record, &name, value),
        }
    }
    record
}

fn insert(record: &mut Record, name: &str, value: serde_json::Value) {
    match json_to_value(value) {
        Some(value) => {
            record.insert(name, value);
        }
        None => warn!(record = record.id(), property = name, "skipping non-scalar property"),
    }
}

/// Convert a record back to a flat JSON object.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    let mut object = Map::new();
    object.insert(ID.to_string(), serde_json::Value::String(record.id().to_string()));
    if let Some(parent) = record.parent() {
        object.insert(PARENT.to_string(), serde_json::Value::String(parent.to_string()));
    }
    for (name, value) in record.properties() {
        object.insert(name.to_string(), value_to_json(value));
    }
    serde_json::Value::Object(object)
}
