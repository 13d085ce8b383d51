pub mod ask_controller;
pub mod chat_controller;
pub mod document_controller;
pub mod session_controller;

pub use ask_controller::AskController;
pub use chat_controller::ChatController;
pub use document_controller::DocumentController;
pub use session_controller::SessionController;
