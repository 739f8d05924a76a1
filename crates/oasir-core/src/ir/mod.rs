pub mod grouping;
pub mod model;
pub mod operations;
pub mod property;
pub mod security;
pub mod types;

pub use model::*;
pub use operations::*;
pub use property::*;
pub use security::*;
pub use types::{IrInfo, IrOperationGroup, IrServer, IrSpec, NormalizedName, VendorExtensions};
