//! HTTP boundary for the department hierarchy engine.
//!
//! # Responsibility
//! - Parse path, query and JSON input into core requests.
//! - Map core outcomes to status codes and JSON bodies.
//!
//! # Invariants
//! - Every request opens its own SQLite connection on the blocking pool;
//!   no connection is shared between requests.
//! - Error bodies are always `{"error": "<message>"}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
