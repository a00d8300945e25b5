//! User price links

use serde::{Deserialize, Serialize};

/// User-specific price for a good; unique per (user_id, good_id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UsersGoods {
    pub user_id: i64,
    pub good_id: i64,
    pub price: f64,
}

/// Link good to user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodUserLink {
    pub user_id: i64,
    pub price: f64,
}
