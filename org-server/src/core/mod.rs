//! Core module: configuration, state, request context and the HTTP server
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared state handed to every handler
//! - [`RequestContext`] - per-request cancellation and deadline
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup and serve errors

pub mod config;
pub mod context;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use context::RequestContext;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
