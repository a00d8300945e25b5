//! Data models
//!
//! Shared between catalog-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGINT).

pub mod category_filter;
pub mod good;
pub mod user;

// Re-exports
pub use category_filter::*;
pub use good::*;
pub use user::*;
