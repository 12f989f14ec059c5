use chrono::{DateTime, NaiveDate, Utc};

use crate::core::{Bytes, MapError, Result, ScalarType, Value};
use crate::entity::{FieldType, ListElement};
use crate::hydrate::HydrateContext;

/// Typed extraction of a field value from its converted row representation.
///
/// Implementations for the built-in scalar targets unwrap the matching
/// `Value` variant. Custom field types implement this by declaring a
/// `FieldType::Custom` name and decoding whatever shape their registered
/// converter produces.
pub trait FromColumn: Sized {
    fn field_type() -> FieldType;

    fn from_value(value: Value, ctx: &HydrateContext<'_>) -> Result<Self>;
}

/// Marker for types usable as list elements. Implemented by the scalar
/// targets and by derived entities; ruling out nested lists at compile time.
pub trait ListItem: FromColumn {
    fn element_type() -> ListElement;
}

fn mismatch(expected: &str, value: &Value) -> MapError {
    MapError::TypeMismatch {
        expected: expected.to_string(),
        actual: value.type_name().to_string(),
    }
}

impl FromColumn for bool {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Bool)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("BOOL", &other)),
        }
    }
}

impl FromColumn for i64 {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Int64)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Int64(i) => Ok(i),
            other => Err(mismatch("INT64", &other)),
        }
    }
}

impl FromColumn for f64 {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Float64)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Float64(f) => Ok(f),
            other => Err(mismatch("FLOAT64", &other)),
        }
    }
}

impl FromColumn for String {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Text)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("TEXT", &other)),
        }
    }
}

impl FromColumn for DateTime<Utc> {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Timestamp)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(mismatch("TIMESTAMP", &other)),
        }
    }
}

impl FromColumn for NaiveDate {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Date)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(mismatch("DATE", &other)),
        }
    }
}

impl FromColumn for Bytes {
    fn field_type() -> FieldType {
        FieldType::Scalar(ScalarType::Bytes)
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(Bytes(b)),
            other => Err(mismatch("BYTES", &other)),
        }
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn from_value(value: Value, ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, ctx).map(Some),
        }
    }
}

impl<T: ListItem> FromColumn for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List(T::element_type())
    }

    fn from_value(value: Value, ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| T::from_value(item, ctx))
                .collect(),
            other => Err(mismatch("ARRAY", &other)),
        }
    }
}

impl ListItem for bool {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Bool)
    }
}

impl ListItem for i64 {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Int64)
    }
}

impl ListItem for f64 {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Float64)
    }
}

impl ListItem for String {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Text)
    }
}

impl ListItem for DateTime<Utc> {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Timestamp)
    }
}

impl ListItem for NaiveDate {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Date)
    }
}

impl ListItem for Bytes {
    fn element_type() -> ListElement {
        ListElement::Scalar(ScalarType::Bytes)
    }
}

impl<T: ListItem> ListItem for Option<T> {
    fn element_type() -> ListElement {
        T::element_type()
    }
}
