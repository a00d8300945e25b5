//! PostgreSQL access layer
//!
//! Every function takes the connection it runs on, so the service decides
//! whether that is a pooled connection or an open transaction.

pub mod category_filters;
pub mod goods;
pub mod users;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
