mod content_generator;
mod document_api;
mod file_storage;
mod secret_store;

pub use content_generator::*;
pub use document_api::*;
pub use file_storage::*;
pub use secret_store::*;
