//! Good catalog handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{
    Good, GoodCreate, GoodDetail, GoodStatus, GoodStatusUpdate, GoodUpdate, GoodUserLink,
    PriceStat, UsersGoods,
};

use crate::filter::FilterParams;
use crate::services::GoodQuery;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct AllQuery {
    pub status: Option<GoodStatus>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceStatsQuery {
    pub category_id: i64,
    pub name: Option<String>,
}

/// `GET /api/goods` with `name`, `category_id`, `status` and any `filter_*` params
pub async fn query_goods(
    State(state): State<AppState>,
    Query(query): Query<GoodQuery>,
    Query(raw): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Good>> {
    let params = FilterParams::parse(raw.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let goods = state.goods().get_query(&query, &params).await?;
    Ok(Json(goods))
}

pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<AllQuery>,
) -> ApiResult<Vec<Good>> {
    let goods = state.goods().get_all(query.status, query.category_id).await?;
    Ok(Json(goods))
}

pub async fn autocomplete(
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> ApiResult<Vec<String>> {
    let names = state.goods().get_autocomplete_names(&query.q).await?;
    Ok(Json(names))
}

pub async fn price_stats(
    State(state): State<AppState>,
    Query(query): Query<PriceStatsQuery>,
) -> ApiResult<PriceStat> {
    let stats = state
        .goods()
        .get_price_stats(query.category_id, query.name.as_deref())
        .await?;
    Ok(Json(stats))
}

pub async fn create_good(
    State(state): State<AppState>,
    Json(data): Json<GoodCreate>,
) -> ApiResult<Good> {
    if data.name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    let good = state.goods().create_good(data).await?;
    Ok(Json(good))
}

pub async fn get_good(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<GoodDetail> {
    let good = state.goods().retrieve_good(id).await?;
    Ok(Json(good))
}

pub async fn update_good(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<GoodUpdate>,
) -> ApiResult<Good> {
    if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::validation("name must not be empty"));
    }
    let good = state.goods().update_good(id, data).await?;
    Ok(Json(good))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<GoodStatusUpdate>,
) -> ApiResult<Good> {
    let good = state.goods().update_status(id, data.status).await?;
    Ok(Json(good))
}

pub async fn link_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(link): Json<GoodUserLink>,
) -> ApiResult<UsersGoods> {
    let linked = state.goods().link_with_user(id, link).await?;
    Ok(Json(linked))
}
