use std::{cmp::Ordering, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use thiserror::Error;

/// The null value handed out for properties a node does not carry.
pub static NULL: Value = Value::Null;

/// Declared type of a column.
///
/// Schemas describe each property with one of these tags. Literals in a
/// filter are converted to the tag of the property they are compared with,
/// so `length < 1024` compares two integers rather than two strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    DateTime,
    Boolean,
    /// A reference to another type (schema metadata)
    Type,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::DateTime => "DateTime",
            TypeTag::Boolean => "Boolean",
            TypeTag::Type => "Type",
        }
    }

    /// Case-insensitive inverse of [`TypeTag::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "string" => Some(TypeTag::String),
            "integer" | "int" => Some(TypeTag::Integer),
            "float" | "double" => Some(TypeTag::Float),
            "datetime" | "date" => Some(TypeTag::DateTime),
            "boolean" | "bool" => Some(TypeTag::Boolean),
            "type" => Some(TypeTag::Type),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed property value.
///
/// Values are both the data read from nodes and, through [`Value::Type`],
/// schema metadata. Comparison follows a fixed contract:
///
/// - `Null` on either side is incomparable (`None`)
/// - two strings compare case-insensitively
/// - numbers, date-times, booleans and type tags use their natural ordering
///   (integers and floats compare with each other exactly)
/// - anything else falls back to comparing display strings
///
/// Equality means "compares as `Equal`", so `Null != Null`.
///
/// # Examples
///
/// ```
/// use fquery::Value;
/// use std::cmp::Ordering;
///
/// assert_eq!(Value::from("ASC").compare(&Value::from("asc")), Some(Ordering::Equal));
/// assert_eq!(Value::from(3).compare(&Value::from(2.5)), Some(Ordering::Greater));
/// assert_eq!(Value::Null.compare(&Value::from(1)), None);
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Boolean(bool),
    Type(TypeTag),
}

/// A literal could not be converted to the declared type of its property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value: cannot convert '{text}' to {expected}")]
pub struct LiteralError {
    pub text: String,
    pub expected: TypeTag,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type of the value, `None` for null
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::String(_) => Some(TypeTag::String),
            Value::Integer(_) => Some(TypeTag::Integer),
            Value::Float(_) => Some(TypeTag::Float),
            Value::DateTime(_) => Some(TypeTag::DateTime),
            Value::Boolean(_) => Some(TypeTag::Boolean),
            Value::Type(_) => Some(TypeTag::Type),
        }
    }

    /// Trimmed, lower-cased form used for string comparison. Only strings
    /// have one.
    pub fn folded(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(fold_case(s)),
            _ => None,
        }
    }

    /// Converts literal filter text to a value of the given type.
    ///
    /// Date-times accept RFC 3339 as well as `YYYY-MM-DD HH:MM:SS`,
    /// `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD` (read as UTC).
    pub fn parse_as(text: &str, ty: TypeTag) -> Result<Value, LiteralError> {
        let trimmed = text.trim();
        let parsed = match ty {
            TypeTag::String => Some(Value::String(text.to_string())),
            TypeTag::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
            TypeTag::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Float),
            TypeTag::Boolean => match trimmed.to_lowercase().as_str() {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            TypeTag::DateTime => parse_datetime(trimmed).map(Value::DateTime),
            TypeTag::Type => TypeTag::from_name(trimmed).map(Value::Type),
        };

        parsed.ok_or_else(|| LiteralError {
            text: text.to_string(),
            expected: ty,
        })
    }

    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }

        if let (Some(a), Some(b)) = (self.folded(), other.folded()) {
            return Some(a.cmp(&b));
        }

        if let Some(ordering) = self.natural_cmp(other) {
            return Some(ordering);
        }

        Some(self.to_string().cmp(&other.to_string()))
    }

    fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => compare_mixed(*a, *b),
            (Value::Float(a), Value::Integer(b)) => compare_mixed(*b, *a).map(Ordering::reverse),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Type(a), Value::Type(b)) => Some(a.name().cmp(b.name())),
            _ => None,
        }
    }

    /// Case-insensitive prefix test; false unless both sides are strings
    pub fn starts_with(&self, pattern: &Value) -> bool {
        self.string_op(pattern, |s, p| s.starts_with(p))
    }

    /// Case-insensitive suffix test; false unless both sides are strings
    pub fn ends_with(&self, pattern: &Value) -> bool {
        self.string_op(pattern, |s, p| s.ends_with(p))
    }

    /// Case-insensitive substring test; false unless both sides are strings
    pub fn contains(&self, pattern: &Value) -> bool {
        self.string_op(pattern, |s, p| s.contains(p))
    }

    fn string_op(&self, pattern: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
        match (self, pattern) {
            (Value::String(s), Value::String(p)) => test(&s.to_lowercase(), &p.to_lowercase()),
            _ => false,
        }
    }
}

/// Integer against float, exactly when the float has a decimal form.
fn compare_mixed(int: i64, float: f64) -> Option<Ordering> {
    match Decimal::from_f64(float) {
        Some(exact) => Some(Decimal::from(int).cmp(&exact)),
        None => (int as f64).partial_cmp(&float),
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    // filter text arrives lower-cased, hence the 't' separator
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dt%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Normalized form of names and strings for case-insensitive matching.
pub(crate) fn fold_case(text: &str) -> String {
    text.trim().to_lowercase()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Type(ty) => f.write_str(ty.name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<TypeTag> for Value {
    fn from(ty: TypeTag) -> Self {
        Value::Type(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strings_compare_case_insensitively() {
        assert_eq!(Value::from("Nikon"), Value::from("NIKON"));
        assert_eq!(
            Value::from("apple").compare(&Value::from("Banana")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn null_is_incomparable() {
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_ne!(Value::Null, Value::Null);
        assert_eq!(Value::from("x").compare(&Value::Null), None);
    }

    #[test]
    fn mixed_numbers_compare_exactly() {
        assert_eq!(Value::from(55), Value::from(55.0));
        assert_eq!(Value::from(2.5).compare(&Value::from(3)), Some(Ordering::Less));
        assert_eq!(Value::from(3).compare(&Value::from(2.5)), Some(Ordering::Greater));
    }

    #[test]
    fn unrelated_kinds_fall_back_to_display() {
        // "10" vs "9" as display strings
        assert_eq!(
            Value::from(true).compare(&Value::from(10)),
            Some("true".cmp("10"))
        );
        assert_eq!(Value::from("55"), Value::from(55));
    }

    #[test]
    fn string_ops_require_strings() {
        let name = Value::from("IMG_0042.jpg");
        assert!(name.starts_with(&Value::from("img")));
        assert!(name.ends_with(&Value::from(".JPG")));
        assert!(name.contains(&Value::from("0042")));
        assert!(!name.contains(&Value::Null));
        assert!(!Value::from(42).contains(&Value::from("4")));
    }

    #[test]
    fn parse_literals_by_type() {
        assert_eq!(Value::parse_as("65535", TypeTag::Integer).unwrap(), Value::from(65535));
        assert_eq!(Value::parse_as("5.6", TypeTag::Float).unwrap(), Value::from(5.6));
        for text in ["nan", "inf", "-infinity"] {
            assert!(Value::parse_as(text, TypeTag::Float).is_err(), "accepted {}", text);
        }
        assert_eq!(Value::parse_as("TRUE", TypeTag::Boolean).unwrap(), Value::from(true));
        assert_eq!(Value::parse_as("55", TypeTag::String).unwrap(), Value::from("55"));
        assert_eq!(Value::parse_as("integer", TypeTag::Type).unwrap(), Value::from(TypeTag::Integer));

        let err = Value::parse_as("big", TypeTag::Integer).unwrap_err();
        assert_eq!(err.expected, TypeTag::Integer);
        assert_eq!(err.to_string(), "Invalid value: cannot convert 'big' to Integer");
    }

    #[test]
    fn parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 4, 10, 30, 0).unwrap();
        for text in ["2021-03-04 10:30:00", "2021-03-04t10:30:00", "2021-03-04T10:30:00Z"] {
            assert_eq!(
                Value::parse_as(text, TypeTag::DateTime).unwrap(),
                Value::DateTime(expected),
                "failed for {}",
                text
            );
        }

        let midnight = Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(
            Value::parse_as("2021-03-04", TypeTag::DateTime).unwrap(),
            Value::DateTime(midnight)
        );
        assert!(Value::parse_as("yesterday", TypeTag::DateTime).is_err());
    }

    #[test]
    fn display_strings() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(55.0).to_string(), "55");
        assert_eq!(Value::from(TypeTag::DateTime).to_string(), "DateTime");
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::from(dt).to_string(), "2020-01-02 03:04:05");
    }
}
