pub mod accessor;
pub mod engine;

pub use accessor::RowAccessor;
pub use engine::{HydrateContext, Hydrator};
