use std::collections::HashSet;

use tracing::trace;

use crate::convert::ConvertRegistry;
use crate::core::{MapError, Result, Row};
use crate::entity::{ConstructorArgs, Entity, FieldDescriptor};
use crate::hydrate::RowAccessor;

/// Read settings threaded explicitly through a hydration call, including
/// into nested entities and struct arrays. Replaces any ambient state: two
/// concurrent hydrations share nothing but the read-only registry.
pub struct HydrateContext<'a> {
    registry: &'a ConvertRegistry,
    allow_missing: bool,
}

impl<'a> HydrateContext<'a> {
    pub fn registry(&self) -> &ConvertRegistry {
        self.registry
    }

    pub fn allow_missing_columns(&self) -> bool {
        self.allow_missing
    }

    /// Hydrates a nested row with the caller's missing-column policy and no
    /// projection: a sub-row is always read in full.
    pub fn hydrate<E: Entity>(&self, row: &Row) -> Result<E> {
        hydrate_into(self.registry, row, None, self.allow_missing)
    }
}

/// Orchestrates row-to-object hydration over a shared conversion registry.
///
/// # Examples
///
/// ```
/// use rowmap::{ColumnType, ConvertRegistry, Entity, Hydrator, Row, ScalarType, Value};
///
/// #[derive(Debug, Default, Entity)]
/// struct Person {
///     #[column(id)]
///     id: i64,
///     name: String,
/// }
///
/// # fn main() -> rowmap::Result<()> {
/// let registry = ConvertRegistry::new();
/// let row = Row::builder()
///     .column("id", ColumnType::Scalar(ScalarType::Int64), Value::Int64(7))
///     .column("name", ColumnType::Scalar(ScalarType::Text), Value::from("Alice"))
///     .build()?;
///
/// let person: Person = Hydrator::new(&registry).hydrate(&row)?;
/// assert_eq!(person.name, "Alice");
/// assert_eq!(person.id_value(), Some(Value::Int64(7)));
/// # Ok(())
/// # }
/// ```
pub struct Hydrator<'a> {
    registry: &'a ConvertRegistry,
}

impl<'a> Hydrator<'a> {
    pub fn new(registry: &'a ConvertRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConvertRegistry {
        self.registry
    }

    /// Reads a full row into `E`, requiring every mapped column to be
    /// present.
    pub fn hydrate<E: Entity>(&self, row: &Row) -> Result<E> {
        self.hydrate_with(row, None, false)
    }

    /// Reads a row into `E` with projection and missing-column policy.
    ///
    /// `include_columns` restricts which columns are read; `None` reads all.
    /// With `allow_missing_columns`, fields whose column is absent keep
    /// their post-construction value; otherwise a missing column fails the
    /// call. Constructor parameters are exempt from both rules and must
    /// always be resolvable.
    pub fn hydrate_with<E: Entity>(
        &self,
        row: &Row,
        include_columns: Option<&HashSet<String>>,
        allow_missing_columns: bool,
    ) -> Result<E> {
        hydrate_into(self.registry, row, include_columns, allow_missing_columns)
    }
}

fn hydrate_into<E: Entity>(
    registry: &ConvertRegistry,
    row: &Row,
    include_columns: Option<&HashSet<String>>,
    allow_missing: bool,
) -> Result<E> {
    let descriptor = E::descriptor();
    let accessor = RowAccessor::new(row, registry);
    let ctx = HydrateContext {
        registry,
        allow_missing,
    };

    trace!(entity = descriptor.type_name(), "hydrating row");

    let mut args = ConstructorArgs::default();
    for field in descriptor.constructor_fields() {
        let value = accessor
            .get(field)
            .map_err(|err| err.into_data(field.column, field.field_type))?
            .ok_or_else(|| MapError::data(field.column, field.field_type))?;
        args.insert(field.column, value);
    }
    let mut entity = E::construct(&mut args, &ctx)?;

    for field in descriptor.settable_fields() {
        if should_skip(&accessor, field, include_columns, allow_missing)? {
            continue;
        }

        let value = accessor
            .get(field)
            .map_err(|err| err.into_data(field.column, field.field_type))?
            .ok_or_else(|| MapError::data(field.column, field.field_type))?;
        entity
            .set_column(field.column, value, &ctx)
            .map_err(|err| err.into_data(field.column, field.field_type))?;
    }

    Ok(entity)
}

/// Skip chain for non-constructor fields, checked in this exact order:
/// projection exclusion, then column absence, then NULL. A field that is
/// both excluded and missing is skipped before the missing-column policy
/// can reject it.
fn should_skip(
    accessor: &RowAccessor<'_>,
    field: &FieldDescriptor,
    include_columns: Option<&HashSet<String>>,
    allow_missing: bool,
) -> Result<bool> {
    if let Some(columns) = include_columns {
        if !columns.contains(field.column) {
            return Ok(true);
        }
    }

    if !accessor.has_column(field.column) {
        if allow_missing {
            return Ok(true);
        }
        return Err(MapError::MissingColumn(field.column.to_string()));
    }

    // NULL columns never overwrite a field.
    Ok(accessor.is_null(field.column))
}
