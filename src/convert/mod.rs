pub mod registry;

pub use registry::{ConvertFn, ConvertRegistry, TargetType};
