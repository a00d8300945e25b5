//! Good Model

use serde::{Deserialize, Serialize};

/// Lifecycle status of a good
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "good_status", rename_all = "lowercase")
)]
pub enum GoodStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Good entity (catalog product)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Good {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub status: GoodStatus,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Attribute values for this good's category filters
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub props: Vec<GoodFilterValue>,
}

/// One attribute value attached to a good (stored as text)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct GoodFilterValue {
    pub id: i64,
    pub good_id: i64,
    pub category_filter_id: i64,
    pub value: String,
}

/// Submitted attribute value; `id` present means update in place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodProp {
    pub id: Option<i64>,
    pub category_filter_id: i64,
    pub value: String,
}

/// Create good payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodCreate {
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub status: GoodStatus,
    #[serde(default)]
    pub props: Vec<GoodProp>,
}

/// Update good payload (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoodUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<GoodStatus>,
    #[serde(default)]
    pub props: Vec<GoodProp>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodStatusUpdate {
    pub status: GoodStatus,
}

/// Good with the per-user prices linked to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodDetail {
    #[serde(flatten)]
    pub good: Good,
    pub users: Vec<super::user::UsersGoods>,
}

/// Equal-width price histogram: `labels` are bin edges, `data` per-bin counts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceStat {
    pub labels: Vec<f64>,
    pub data: Vec<u64>,
}
