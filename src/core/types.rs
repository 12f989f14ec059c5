use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{MapError, Result, Value};

/// The scalar kinds a column may hold. `ALL` fixes the declaration order the
/// conversion registry scans when several source types could satisfy a
/// target, so ambiguous list conversions stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int64,
    Float64,
    Text,
    Timestamp,
    Date,
    Bytes,
}

impl ScalarType {
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Bool,
        ScalarType::Int64,
        ScalarType::Float64,
        ScalarType::Text,
        ScalarType::Timestamp,
        ScalarType::Date,
        ScalarType::Bytes,
    ];
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int64 => write!(f, "INT64"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Text => write!(f, "TEXT"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Date => write!(f, "DATE"),
            Self::Bytes => write!(f, "BYTES"),
        }
    }
}

/// Element type of an array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayElement {
    Scalar(ScalarType),
    Struct,
}

impl fmt::Display for ArrayElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Struct => write!(f, "STRUCT"),
        }
    }
}

/// Declared logical type of a column: a scalar, an array of scalars or
/// nested rows, or a single nested row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Scalar(ScalarType),
    Array(ArrayElement),
    Struct,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Array(element) => write!(f, "ARRAY<{element}>"),
            Self::Struct => write!(f, "STRUCT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// One record returned by a tabular read: an ordered, named collection of
/// typed columns. Rows are immutable snapshots produced by an external
/// row-fetch collaborator; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl Row {
    pub fn builder() -> RowBuilder {
        RowBuilder::new()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.index(name).map(|idx| self.columns[idx].column_type)
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.index(name)
            .map(|idx| self.values[idx].is_null())
            .unwrap_or(false)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.index(name).map(|idx| &self.values[idx])
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }
}

/// Builder for row snapshots. `build` enforces the row invariants: column
/// names are unique and NULL values only appear in nullable columns.
#[derive(Debug, Default)]
pub struct RowBuilder {
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType, value: Value) -> Self {
        self.columns.push(Column::new(name, column_type));
        self.values.push(value);
        self
    }

    pub fn column_not_null(
        mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        value: Value,
    ) -> Self {
        self.columns.push(Column::new(name, column_type).not_null());
        self.values.push(value);
        self
    }

    pub fn build(self) -> Result<Row> {
        for (idx, column) in self.columns.iter().enumerate() {
            if self.columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(MapError::DuplicateColumn {
                    column: column.name.clone(),
                    entity: "row".to_string(),
                });
            }
            if !column.nullable && self.values[idx].is_null() {
                return Err(MapError::Mapping(format!(
                    "Column '{}' cannot be NULL",
                    column.name
                )));
            }
        }

        Ok(Row {
            columns: self.columns,
            values: self.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_rejected() {
        let row = Row::builder()
            .column("id", ColumnType::Scalar(ScalarType::Int64), Value::Int64(1))
            .column("id", ColumnType::Scalar(ScalarType::Int64), Value::Int64(2))
            .build();
        assert!(matches!(row, Err(MapError::DuplicateColumn { .. })));
    }

    #[test]
    fn test_not_null_column_rejects_null() {
        let row = Row::builder()
            .column_not_null("id", ColumnType::Scalar(ScalarType::Int64), Value::Null)
            .build();
        assert!(matches!(row, Err(MapError::Mapping(_))));
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::builder()
            .column(
                "name",
                ColumnType::Scalar(ScalarType::Text),
                Value::Text("Alice".into()),
            )
            .column("age", ColumnType::Scalar(ScalarType::Int64), Value::Null)
            .build()
            .unwrap();

        assert!(row.has_column("name"));
        assert!(!row.has_column("email"));
        assert!(row.is_null("age"));
        assert!(!row.is_null("name"));
        assert_eq!(
            row.column_type("age"),
            Some(ColumnType::Scalar(ScalarType::Int64))
        );
        assert_eq!(row.value("name"), Some(&Value::Text("Alice".into())));
    }
}
