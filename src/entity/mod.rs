pub mod descriptor;
pub mod from_column;

use std::collections::HashMap;

pub use descriptor::{EntityDescriptor, EntityDescriptorBuilder, FieldDescriptor, FieldType, ListElement};
pub use from_column::{FromColumn, ListItem};

use crate::core::{MapError, Result, Value};
use crate::hydrate::HydrateContext;

/// A target type hydratable from rows.
///
/// Implementations are normally generated by `#[derive(Entity)]`; the
/// descriptor is memoized per type, built lazily on first use and never
/// mutated afterwards.
pub trait Entity: Sized {
    fn descriptor() -> &'static EntityDescriptor;

    /// Builds the instance from its constructor-parameter values. Remaining
    /// fields start at their `Default` values and are populated afterwards.
    fn construct(args: &mut ConstructorArgs, ctx: &HydrateContext<'_>) -> Result<Self>;

    /// Assigns one already-read column value to the matching field.
    fn set_column(&mut self, column: &str, value: Value, ctx: &HydrateContext<'_>) -> Result<()>;

    /// Value of the field carrying the identifier marker, if any.
    fn id_value(&self) -> Option<Value> {
        None
    }
}

/// Constructor-parameter values keyed by column name.
#[derive(Debug, Default)]
pub struct ConstructorArgs {
    values: HashMap<&'static str, Value>,
}

impl ConstructorArgs {
    pub fn insert(&mut self, column: &'static str, value: Value) {
        self.values.insert(column, value);
    }

    /// Removes and decodes one constructor argument. Failures surface as
    /// data errors naming the column, so an unresolvable parameter always
    /// aborts construction.
    pub fn take<T: FromColumn>(
        &mut self,
        column: &'static str,
        ctx: &HydrateContext<'_>,
    ) -> Result<T> {
        let value = self
            .values
            .remove(column)
            .ok_or_else(|| MapError::data(column, T::field_type()))?;
        T::from_value(value, ctx).map_err(|err| err.into_data(column, T::field_type()))
    }
}
