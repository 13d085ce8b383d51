//! # Domain Layer
//!
//! Documents, remote file handles, chat history and session state.
//! This layer knows nothing about HTTP or the remote API.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
