pub mod conflicts;
pub mod model_resolver;
pub mod name_normalizer;
pub mod operation_resolver;
pub mod property_resolver;
pub mod spec_to_ir;
pub mod type_mapper;

pub use spec_to_ir::{TransformOptions, transform, transform_with_options};
