//! Business services

pub mod choices;
pub mod good;
pub mod stats;

pub use good::{GoodQuery, GoodService};
