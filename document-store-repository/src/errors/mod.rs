//! Error types for the document store repository.

mod backend_error;
mod store_error;

pub use backend_error::BackendError;
pub use store_error::{StoreError, StoreResult};
