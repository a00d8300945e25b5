//! Category Filter Model

use serde::{Deserialize, Serialize};

/// How a category filter is matched and whether it collects choices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "category_filter_type", rename_all = "lowercase")
)]
pub enum FilterType {
    /// Multi-select; query value is a comma-separated list
    Checkbox,
    /// Single-select
    Radio,
    /// Numeric, queried with `_lte` / `_gte` bounds
    Range,
}

impl FilterType {
    /// Checkbox and radio filters accumulate every submitted value as a choice
    pub fn collects_choices(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

/// Per-category attribute schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryFilter {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub filter_type: FilterType,
    pub choices: Vec<String>,
}
