use crate::convert::{ConvertRegistry, TargetType};
use crate::core::{ArrayElement, ColumnType, MapError, Result, Row, ScalarType, Value};
use crate::entity::{FieldDescriptor, FieldType, ListElement};

/// Wraps one row and resolves scalar, array and nested-row access for a
/// field, routing conversions through the registry. Constructed per read
/// call and discarded after.
pub struct RowAccessor<'a> {
    row: &'a Row,
    registry: &'a ConvertRegistry,
}

impl<'a> RowAccessor<'a> {
    pub fn new(row: &'a Row, registry: &'a ConvertRegistry) -> Self {
        Self { row, registry }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.row.has_column(name)
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.row.is_null(name)
    }

    /// Reads the column backing `field`, converted to the field's declared
    /// type. `Ok(None)` means the column is absent or no conversion path
    /// exists; the engine decides whether that is fatal.
    pub fn get(&self, field: &FieldDescriptor) -> Result<Option<Value>> {
        let Some(value) = self.row.value(field.column) else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(Some(Value::Null));
        }
        let Some(column_type) = self.row.column_type(field.column) else {
            return Ok(None);
        };

        match field.field_type {
            FieldType::List(element) => self.get_list(value, column_type, element),
            target => self.get_scalar(value, column_type, target),
        }
    }

    fn get_list(
        &self,
        value: &Value,
        column_type: ColumnType,
        element: ListElement,
    ) -> Result<Option<Value>> {
        let ColumnType::Array(actual) = column_type else {
            return Ok(None);
        };

        match (actual, element) {
            // Every scalar element type has a native list reader; reading a
            // differently-typed array through it fails, it never falls back.
            (ArrayElement::Scalar(actual), ListElement::Scalar(target)) if actual == target => {
                Ok(Some(value.clone()))
            }
            (actual, ListElement::Scalar(target)) => Err(MapError::TypeMismatch {
                expected: format!("ARRAY<{target}>"),
                actual: format!("ARRAY<{actual}>"),
            }),
            // Struct arrays pass through untouched; each sub-row is hydrated
            // into the element type by the typed layer.
            (ArrayElement::Struct, ListElement::Entity(_)) => Ok(Some(value.clone())),
            (ArrayElement::Scalar(_), ListElement::Entity(_)) => Ok(None),
            (ArrayElement::Scalar(_), ListElement::Custom(name)) => {
                self.convert_list(value, TargetType::Custom(name))
            }
            (ArrayElement::Struct, ListElement::Custom(_)) => Ok(None),
        }
    }

    fn convert_list(&self, value: &Value, target: TargetType) -> Result<Option<Value>> {
        let Some(source) = self.registry.list_source_for(target) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(MapError::TypeMismatch {
                expected: "ARRAY".to_string(),
                actual: value.type_name().to_string(),
            });
        };

        let converted = items
            .iter()
            .map(|item| {
                if item.is_null() {
                    Ok(Value::Null)
                } else {
                    self.registry.convert(item, source, target)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Value::Array(converted)))
    }

    fn get_scalar(
        &self,
        value: &Value,
        column_type: ColumnType,
        target: FieldType,
    ) -> Result<Option<Value>> {
        match (column_type, target) {
            (ColumnType::Struct, FieldType::Entity(_)) => Ok(Some(value.clone())),
            (ColumnType::Scalar(source), FieldType::Scalar(scalar)) => {
                self.convert_scalar(value, source, TargetType::Scalar(scalar))
            }
            (ColumnType::Scalar(source), FieldType::Custom(name)) => {
                self.convert_scalar(value, source, TargetType::Custom(name))
            }
            _ => Ok(None),
        }
    }

    fn convert_scalar(
        &self,
        value: &Value,
        source: ScalarType,
        target: TargetType,
    ) -> Result<Option<Value>> {
        if self.registry.can_convert(source, target) {
            Ok(Some(self.registry.convert(value, source, target)?))
        } else {
            Ok(None)
        }
    }
}
