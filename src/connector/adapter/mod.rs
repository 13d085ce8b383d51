mod gemini_client;
mod mock_document_api;
mod secret_store;

pub use gemini_client::*;
pub use mock_document_api::*;
pub use secret_store::*;
