pub mod error;
pub mod types;
pub mod value;

pub use error::{MapError, Result};
pub use types::{ArrayElement, Column, ColumnType, Row, RowBuilder, ScalarType};
pub use value::{Bytes, Value};
