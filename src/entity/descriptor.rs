use std::fmt;

use crate::core::{MapError, Result, ScalarType};

/// Element type of an iterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListElement {
    Scalar(ScalarType),
    Custom(&'static str),
    Entity(&'static str),
}

impl fmt::Display for ListElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Custom(name) | Self::Entity(name) => write!(f, "{name}"),
        }
    }
}

/// Declared type of an entity field. `Custom` names a user type with a
/// hand-written `FromColumn` impl; `Entity` names a nested entity hydrated
/// from a struct column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Custom(&'static str),
    Entity(&'static str),
    List(ListElement),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Custom(name) | Self::Entity(name) => write!(f, "{name}"),
            Self::List(element) => write!(f, "ARRAY<{element}>"),
        }
    }
}

/// Static description of one mapped field: its logical column name, declared
/// type, and whether it participates in entity construction or carries the
/// identifier marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column: &'static str,
    pub field_type: FieldType,
    pub constructor_param: bool,
    pub id: bool,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            column: name,
            field_type,
            constructor_param: false,
            id: false,
        }
    }

    pub fn with_column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub fn constructor_param(mut self) -> Self {
        self.constructor_param = true;
        self
    }

    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Byte-sequence fields are scalar despite being a sequence of bytes.
    pub fn is_iterable(&self) -> bool {
        matches!(self.field_type, FieldType::List(_))
    }

    pub fn element_type(&self) -> Option<ListElement> {
        match self.field_type {
            FieldType::List(element) => Some(element),
            _ => None,
        }
    }
}

/// Cached, reflection-free metadata describing how to construct and populate
/// one target type. Built once per type and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn builder(type_name: &'static str) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            type_name,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Constructor parameters in declaration order.
    pub fn constructor_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.constructor_param)
    }

    pub fn settable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.constructor_param)
    }

    pub fn id_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id)
    }
}

/// Explicit registration path for hand-written entities. The derive macro
/// performs the same checks at compile time and builds descriptors directly.
pub struct EntityDescriptorBuilder {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptorBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<EntityDescriptor> {
        for (idx, field) in self.fields.iter().enumerate() {
            if self.fields[..idx].iter().any(|f| f.column == field.column) {
                return Err(MapError::DuplicateColumn {
                    column: field.column.to_string(),
                    entity: self.type_name.to_string(),
                });
            }
        }

        if self.fields.iter().filter(|f| f.id).count() > 1 {
            return Err(MapError::Mapping(format!(
                "Entity '{}' marks more than one field as the identifier",
                self.type_name
            )));
        }

        Ok(EntityDescriptor {
            type_name: self.type_name,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_rejected() {
        let err = EntityDescriptor::builder("Person")
            .field(FieldDescriptor::new(
                "name",
                FieldType::Scalar(ScalarType::Text),
            ))
            .field(
                FieldDescriptor::new("full_name", FieldType::Scalar(ScalarType::Text))
                    .with_column("name"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, MapError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_double_id_rejected() {
        let err = EntityDescriptor::builder("Person")
            .field(FieldDescriptor::new("a", FieldType::Scalar(ScalarType::Int64)).id())
            .field(FieldDescriptor::new("b", FieldType::Scalar(ScalarType::Int64)).id())
            .build()
            .unwrap_err();
        assert!(matches!(err, MapError::Mapping(_)));
    }

    #[test]
    fn test_field_partition() {
        let descriptor = EntityDescriptor::builder("Person")
            .field(
                FieldDescriptor::new("id", FieldType::Scalar(ScalarType::Int64))
                    .constructor_param()
                    .id(),
            )
            .field(FieldDescriptor::new(
                "tags",
                FieldType::List(ListElement::Scalar(ScalarType::Text)),
            ))
            .build()
            .unwrap();

        assert_eq!(descriptor.constructor_fields().count(), 1);
        assert_eq!(descriptor.settable_fields().count(), 1);
        assert_eq!(descriptor.id_field().map(|f| f.column), Some("id"));
        assert!(descriptor.field("tags").unwrap().is_iterable());
        assert_eq!(
            descriptor.field("tags").unwrap().element_type(),
            Some(ListElement::Scalar(ScalarType::Text))
        );
    }
}
