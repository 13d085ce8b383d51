mod ask_document;
mod chat_session;
mod delete_document;
mod initialize_client;
mod transient_file;
mod upload_document;

pub use ask_document::*;
pub use chat_session::*;
pub use delete_document::*;
pub use initialize_client::*;
pub use transient_file::TransientFile;
pub use upload_document::*;
