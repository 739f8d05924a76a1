//! Resolve an OpenAPI 3.x document into a generator-ready IR.
//!
//! ```no_run
//! let spec = oasir_core::parse::load_file("openapi.yaml".as_ref())?;
//! let ir = oasir_core::transform(&spec)?;
//! for model in &ir.models {
//!     println!("{}", model.class_name);
//! }
//! # Ok::<(), oasir_core::error::TransformError>(())
//! ```

pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;
pub mod validate;

pub use transform::{TransformOptions, transform, transform_with_options};
