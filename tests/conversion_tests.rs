use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rowmap::{
    ArrayElement, ColumnType, ConvertRegistry, Entity, FieldType, FromColumn, HydrateContext,
    Hydrator, ListElement, ListItem, MapError, Result, Row, ScalarType, TargetType, Value,
};

#[test]
fn test_builtin_matrix() {
    let registry = ConvertRegistry::new();
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();

    let cases = [
        (
            Value::Int64(3),
            ScalarType::Int64,
            ScalarType::Float64,
            Value::Float64(3.0),
        ),
        (
            Value::Int64(3),
            ScalarType::Int64,
            ScalarType::Text,
            Value::Text("3".into()),
        ),
        (
            Value::Bool(true),
            ScalarType::Bool,
            ScalarType::Text,
            Value::Text("true".into()),
        ),
        (
            Value::Timestamp(timestamp),
            ScalarType::Timestamp,
            ScalarType::Text,
            Value::Text(timestamp.to_rfc3339()),
        ),
        (
            Value::Text(timestamp.to_rfc3339()),
            ScalarType::Text,
            ScalarType::Timestamp,
            Value::Timestamp(timestamp),
        ),
        (
            Value::Text("2024-05-17".into()),
            ScalarType::Text,
            ScalarType::Date,
            Value::Date(date),
        ),
        (
            Value::Text("abc".into()),
            ScalarType::Text,
            ScalarType::Bytes,
            Value::Bytes(b"abc".to_vec()),
        ),
        (
            Value::Bytes(b"abc".to_vec()),
            ScalarType::Bytes,
            ScalarType::Text,
            Value::Text("abc".into()),
        ),
    ];

    for (value, from, to, expected) in cases {
        let converted = registry
            .convert(&value, from, TargetType::Scalar(to))
            .unwrap();
        assert_eq!(converted, expected, "{from} -> {to}");
    }
}

#[test]
fn test_invalid_timestamp_text_fails() {
    let registry = ConvertRegistry::new();
    let err = registry
        .convert(
            &Value::Text("yesterday".into()),
            ScalarType::Text,
            TargetType::Scalar(ScalarType::Timestamp),
        )
        .unwrap_err();
    assert!(matches!(err, MapError::TypeMismatch { .. }));
}

#[derive(Debug, Default, PartialEq)]
struct Percentage(f64);

impl FromColumn for Percentage {
    fn field_type() -> FieldType {
        FieldType::Custom("Percentage")
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Float64(f) => Ok(Percentage(f)),
            other => Err(MapError::TypeMismatch {
                expected: "FLOAT64".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

fn percentage_registry() -> ConvertRegistry {
    let mut registry = ConvertRegistry::new();
    registry
        .register(
            ScalarType::Text,
            TargetType::Custom("Percentage"),
            Arc::new(|value| {
                let text = value.as_str().unwrap_or_default();
                let parsed = text
                    .trim_end_matches('%')
                    .parse::<f64>()
                    .map_err(|_| MapError::TypeMismatch {
                        expected: "percentage text".to_string(),
                        actual: text.to_string(),
                    })?;
                Ok(Value::Float64(parsed / 100.0))
            }),
        )
        .unwrap();
    registry
}

#[derive(Debug, Default, Entity)]
struct Discount {
    code: String,
    rate: Percentage,
}

#[test]
fn test_custom_converter_hydrates_custom_field() {
    let registry = percentage_registry();
    let row = Row::builder()
        .column("code", ColumnType::Scalar(ScalarType::Text), Value::from("SPRING"))
        .column("rate", ColumnType::Scalar(ScalarType::Text), Value::from("45%"))
        .build()
        .unwrap();

    let discount: Discount = Hydrator::new(&registry).hydrate(&row).unwrap();
    assert_eq!(discount.rate, Percentage(0.45));
}

#[test]
fn test_unregistered_custom_field_is_data_error() {
    let registry = ConvertRegistry::new();
    let row = Row::builder()
        .column("code", ColumnType::Scalar(ScalarType::Text), Value::from("SPRING"))
        .column("rate", ColumnType::Scalar(ScalarType::Text), Value::from("45%"))
        .build()
        .unwrap();

    let err = Hydrator::new(&registry)
        .hydrate::<Discount>(&row)
        .unwrap_err();
    match err {
        MapError::Data { column, expected, .. } => {
            assert_eq!(column, "rate");
            assert_eq!(expected, "Percentage");
        }
        other => panic!("Expected Data error, got {other:?}"),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Rank(i64);

impl FromColumn for Rank {
    fn field_type() -> FieldType {
        FieldType::Custom("Rank")
    }

    fn from_value(value: Value, _ctx: &HydrateContext<'_>) -> Result<Self> {
        match value {
            Value::Int64(i) => Ok(Rank(i)),
            other => Err(MapError::TypeMismatch {
                expected: "INT64".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl ListItem for Rank {
    fn element_type() -> ListElement {
        ListElement::Custom("Rank")
    }
}

#[derive(Debug, Default, Entity)]
struct Ladder {
    ranks: Vec<Rank>,
}

fn rank_row() -> Row {
    Row::builder()
        .column(
            "ranks",
            ColumnType::Array(ArrayElement::Scalar(ScalarType::Int64)),
            Value::Array(vec![Value::Int64(1), Value::Int64(2)]),
        )
        .build()
        .unwrap()
}

#[test]
fn test_list_conversion_via_registered_source() {
    let mut registry = ConvertRegistry::new();
    registry
        .register(
            ScalarType::Int64,
            TargetType::Custom("Rank"),
            Arc::new(|value| Ok(value.clone())),
        )
        .unwrap();

    let ladder: Ladder = Hydrator::new(&registry).hydrate(&rank_row()).unwrap();
    assert_eq!(ladder.ranks, vec![Rank(1), Rank(2)]);
}

#[test]
fn test_list_source_scan_favors_earliest_declared_scalar() {
    // Bool precedes Int64 in the declared scalar order, so once a
    // Bool -> Rank converter exists it wins the scan even for an INT64
    // array; the mismatched elements then fail, reproducibly.
    let mut registry = ConvertRegistry::new();
    registry
        .register(
            ScalarType::Int64,
            TargetType::Custom("Rank"),
            Arc::new(|value| Ok(value.clone())),
        )
        .unwrap();
    registry
        .register(
            ScalarType::Bool,
            TargetType::Custom("Rank"),
            Arc::new(|value| match value {
                Value::Bool(b) => Ok(Value::Int64(*b as i64)),
                other => Err(MapError::TypeMismatch {
                    expected: "BOOL".to_string(),
                    actual: other.type_name().to_string(),
                }),
            }),
        )
        .unwrap();

    assert_eq!(
        registry.list_source_for(TargetType::Custom("Rank")),
        Some(ScalarType::Bool)
    );

    let err = Hydrator::new(&registry)
        .hydrate::<Ladder>(&rank_row())
        .unwrap_err();
    match err {
        MapError::Data { column, .. } => assert_eq!(column, "ranks"),
        other => panic!("Expected Data error, got {other:?}"),
    }
}

#[test]
fn test_unresolvable_list_element_is_data_error() {
    let registry = ConvertRegistry::new();
    let err = Hydrator::new(&registry)
        .hydrate::<Ladder>(&rank_row())
        .unwrap_err();
    match err {
        MapError::Data { column, expected, .. } => {
            assert_eq!(column, "ranks");
            assert_eq!(expected, "ARRAY<Rank>");
        }
        other => panic!("Expected Data error, got {other:?}"),
    }
}
