//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Remote API (Gemini REST client, in-process mock)
//! - Secrets (environment, TOML file)
//! - Web UI (axum router, controllers, session store)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
