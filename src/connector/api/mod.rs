pub mod container;
pub mod controller;
pub mod error;
pub mod router;
pub mod server;
pub mod session_store;
pub mod view;

pub use container::{Container, ContainerConfig};
pub use error::ApiError;
pub use router::{build_router, AppState, FILE_FIELD};
pub use server::{cleanup_remote_files, serve};
pub use session_store::{SessionStore, SESSION_COOKIE};
pub use view::{ActionResponse, ChatRequest, DocumentView, SessionView};
