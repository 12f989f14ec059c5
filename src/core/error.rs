use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Duplicate column name '{column}' in entity '{entity}'")]
    DuplicateColumn { column: String, entity: String },

    #[error("Unable to read column from row results: {0}")]
    MissingColumn(String),

    #[error("Entity '{entity}' has no field mapped to column '{column}'")]
    UnknownColumn { column: String, entity: String },

    #[error(
        "The value in column '{column}' could not be converted to the declared field type {expected}"
    )]
    Data {
        column: String,
        expected: String,
        #[source]
        source: Option<Box<MapError>>,
    },

    #[error("No conversion path from {from} to {to}")]
    NoConversion { from: String, to: String },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, MapError>;

impl MapError {
    pub fn data(column: impl Into<String>, expected: impl ToString) -> Self {
        Self::Data {
            column: column.into(),
            expected: expected.to_string(),
            source: None,
        }
    }

    /// Wraps a conversion failure with the column it occurred on. Errors that
    /// already carry column context pass through unchanged.
    pub fn into_data(self, column: &str, expected: impl ToString) -> Self {
        match self {
            err @ (Self::Data { .. }
            | Self::Mapping(_)
            | Self::DuplicateColumn { .. }
            | Self::MissingColumn(_)
            | Self::UnknownColumn { .. }) => err,
            cause => Self::Data {
                column: column.to_string(),
                expected: expected.to_string(),
                source: Some(Box::new(cause)),
            },
        }
    }
}
