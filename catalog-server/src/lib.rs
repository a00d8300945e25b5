//! catalog-server: goods catalog with per-category filters, price statistics
//! and search-index backed name lookup

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod search;
pub mod services;
pub mod state;
