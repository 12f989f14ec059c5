use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::{MapError, Result, ScalarType, Value};

/// Target side of a conversion entry: one of the built-in scalar kinds, or a
/// user field type identified by the name its `FromColumn` impl declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Scalar(ScalarType),
    Custom(&'static str),
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

pub type ConvertFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Bidirectional mapping from source column types to target field types.
///
/// The built-in scalar matrix is fixed; custom entries extend it and are
/// consulted first, so a user converter may override a built-in path. The
/// registry is populated once at startup and read-only afterwards.
///
/// # Examples
///
/// ```
/// use rowmap::{ConvertRegistry, ScalarType, TargetType, Value};
/// use std::sync::Arc;
///
/// let mut registry = ConvertRegistry::new();
/// registry
///     .register(
///         ScalarType::Text,
///         TargetType::Custom("Percentage"),
///         Arc::new(|value| {
///             let text = value.as_str().unwrap_or_default();
///             let parsed = text.trim_end_matches('%').parse::<f64>().map_err(|_| {
///                 rowmap::MapError::TypeMismatch {
///                     expected: "percentage text".into(),
///                     actual: text.into(),
///                 }
///             })?;
///             Ok(Value::Float64(parsed / 100.0))
///         }),
///     )
///     .unwrap();
///
/// assert!(registry.can_convert(ScalarType::Text, TargetType::Custom("Percentage")));
/// ```
#[derive(Default, Clone)]
pub struct ConvertRegistry {
    custom: HashMap<(ScalarType, TargetType), ConvertFn>,
}

impl ConvertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom conversion. At most one conversion may exist per
    /// (source, target) pair.
    pub fn register(&mut self, from: ScalarType, to: TargetType, f: ConvertFn) -> Result<()> {
        if self.custom.contains_key(&(from, to)) {
            return Err(MapError::Mapping(format!(
                "A converter from {from} to {to} is already registered"
            )));
        }
        self.custom.insert((from, to), f);
        Ok(())
    }

    pub fn can_convert(&self, from: ScalarType, to: TargetType) -> bool {
        if self.custom.contains_key(&(from, to)) {
            return true;
        }
        match to {
            TargetType::Scalar(target) => from == target || builtin_supported(from, target),
            TargetType::Custom(_) => false,
        }
    }

    /// Converts `value`, declared to be of scalar type `from`, into the
    /// target representation. Fails with `NoConversion` when no path exists
    /// and with `TypeMismatch` when the value's shape contradicts `from`.
    pub fn convert(&self, value: &Value, from: ScalarType, to: TargetType) -> Result<Value> {
        if let Some(custom) = self.custom.get(&(from, to)) {
            return custom(value);
        }

        let TargetType::Scalar(target) = to else {
            return Err(MapError::NoConversion {
                from: from.to_string(),
                to: to.to_string(),
            });
        };

        if from == target {
            check_shape(value, from)?;
            return Ok(value.clone());
        }

        if !builtin_supported(from, target) {
            return Err(MapError::NoConversion {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        builtin_convert(value, from, target)
    }

    /// Scans the declared scalar set in its stable order and returns the
    /// first source type convertible to `to`. This fixed order decides which
    /// reader handles ambiguous list conversions.
    pub fn list_source_for(&self, to: TargetType) -> Option<ScalarType> {
        ScalarType::ALL
            .iter()
            .copied()
            .find(|source| self.can_convert(*source, to))
    }
}

fn builtin_supported(from: ScalarType, to: ScalarType) -> bool {
    use ScalarType::*;
    matches!(
        (from, to),
        (Int64, Float64)
            | (Int64, Text)
            | (Float64, Text)
            | (Bool, Text)
            | (Timestamp, Text)
            | (Date, Text)
            | (Text, Timestamp)
            | (Text, Date)
            | (Text, Bytes)
            | (Bytes, Text)
    )
}

fn check_shape(value: &Value, declared: ScalarType) -> Result<()> {
    let matches = match (declared, value) {
        (ScalarType::Bool, Value::Bool(_))
        | (ScalarType::Int64, Value::Int64(_))
        | (ScalarType::Float64, Value::Float64(_))
        | (ScalarType::Text, Value::Text(_))
        | (ScalarType::Timestamp, Value::Timestamp(_))
        | (ScalarType::Date, Value::Date(_))
        | (ScalarType::Bytes, Value::Bytes(_)) => true,
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(MapError::TypeMismatch {
            expected: declared.to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

fn builtin_convert(value: &Value, from: ScalarType, to: ScalarType) -> Result<Value> {
    check_shape(value, from)?;

    let converted = match (value, to) {
        (Value::Int64(i), ScalarType::Float64) => Value::Float64(*i as f64),
        (Value::Int64(i), ScalarType::Text) => Value::Text(i.to_string()),
        (Value::Float64(f), ScalarType::Text) => Value::Text(f.to_string()),
        (Value::Bool(b), ScalarType::Text) => Value::Text(b.to_string()),
        (Value::Timestamp(t), ScalarType::Text) => Value::Text(t.to_rfc3339()),
        (Value::Date(d), ScalarType::Text) => Value::Text(d.to_string()),
        (Value::Text(s), ScalarType::Timestamp) => {
            let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| MapError::TypeMismatch {
                expected: "RFC 3339 timestamp text".to_string(),
                actual: s.clone(),
            })?;
            Value::Timestamp(parsed.with_timezone(&Utc))
        }
        (Value::Text(s), ScalarType::Date) => {
            let parsed =
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| MapError::TypeMismatch {
                    expected: "ISO 8601 date text".to_string(),
                    actual: s.clone(),
                })?;
            Value::Date(parsed)
        }
        (Value::Text(s), ScalarType::Bytes) => Value::Bytes(s.clone().into_bytes()),
        (Value::Bytes(b), ScalarType::Text) => {
            let text = String::from_utf8(b.clone()).map_err(|_| MapError::TypeMismatch {
                expected: "UTF-8 bytes".to_string(),
                actual: "non-UTF-8 bytes".to_string(),
            })?;
            Value::Text(text)
        }
        _ => {
            return Err(MapError::NoConversion {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    };

    Ok(converted)
}
