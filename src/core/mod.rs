// Generic resource handling: the per-kind trait and the handler macro built on it

pub mod crud_operations;
pub mod traits;

// Re-export commonly used items
pub use traits::{CRUDResource, ResourcePayload, set_optional, set_required};
