//! # Application Layer
//!
//! Interfaces to the remote API and secrets, and the use cases that drive a
//! chat session through them.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
