mod chat_message;
mod document;
mod notice;
mod remote_file;
mod session;

pub use chat_message::*;
pub use document::*;
pub use notice::*;
pub use remote_file::*;
pub use session::*;
