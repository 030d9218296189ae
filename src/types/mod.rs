// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to keep edit and product tokens apart at compile time.

mod id;
mod package_name;

pub use id::{EditId, ProductId};
pub use package_name::{PackageName, PackageNameError};
