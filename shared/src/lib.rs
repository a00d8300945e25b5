//! Shared types for the catalog service
//!
//! Domain models, the unified error system and small utilities used by
//! the server and its API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};
