// ============================================================================
// rowmap Library
// ============================================================================

//! Typed row-to-struct hydration for cloud tabular databases.
//!
//! A row fetched from the database is an ordered set of named, typed
//! columns. This crate turns such rows into application structs: a derived
//! [`Entity`] describes how a type is constructed and populated, a
//! [`ConvertRegistry`] holds the scalar conversion matrix, and a
//! [`Hydrator`] orchestrates the read with projection and missing-column
//! policies.
//!
//! ```
//! use rowmap::{ColumnType, ConvertRegistry, Entity, Hydrator, Row, ScalarType, Value};
//!
//! #[derive(Debug, Default, Entity)]
//! struct Account {
//!     #[column(id)]
//!     id: i64,
//!     #[column(name = "display_name")]
//!     name: String,
//!     balance: f64,
//! }
//!
//! # fn main() -> rowmap::Result<()> {
//! let row = Row::builder()
//!     .column("id", ColumnType::Scalar(ScalarType::Int64), Value::Int64(1))
//!     .column("display_name", ColumnType::Scalar(ScalarType::Text), Value::from("savings"))
//!     .column("balance", ColumnType::Scalar(ScalarType::Float64), Value::Float64(12.5))
//!     .build()?;
//!
//! let registry = ConvertRegistry::new();
//! let account: Account = Hydrator::new(&registry).hydrate(&row)?;
//! assert_eq!(account.name, "savings");
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod core;
pub mod entity;
pub mod hydrate;

// Re-export main types for convenience
pub use crate::core::{
    ArrayElement, Bytes, Column, ColumnType, MapError, Result, Row, RowBuilder, ScalarType, Value,
};
pub use convert::{ConvertFn, ConvertRegistry, TargetType};
pub use entity::{
    ConstructorArgs, Entity, EntityDescriptor, EntityDescriptorBuilder, FieldDescriptor, FieldType,
    FromColumn, ListElement, ListItem,
};
pub use hydrate::{HydrateContext, Hydrator, RowAccessor};

// Derive macro for the Entity trait
pub use rowmap_derive::Entity;
