//! HTTP API module.
//!
//! The axum server, its request/response types, and the log broadcaster
//! that the pipeline reports progress through.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, start_server, AppState};
pub use types::*;
pub use logs::*;
