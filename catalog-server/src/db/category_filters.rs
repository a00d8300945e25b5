//! Category filter database operations

use std::collections::HashMap;

use shared::models::{CategoryFilter, FilterType};
use sqlx::PgConnection;

use super::BoxError;

/// Types of the given filters; unknown ids are simply absent from the map
pub async fn filter_types(
    conn: &mut PgConnection,
    ids: &[i64],
) -> Result<HashMap<i64, FilterType>, BoxError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i64, FilterType)> =
        sqlx::query_as("SELECT id, type FROM category_filters WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().collect())
}

/// Filters among `ids`, locked against concurrent choice updates until the
/// transaction ends.
///
/// Must not conflict with the `KEY SHARE` locks that foreign-key checks on
/// `good_filter_values` hold, hence `FOR NO KEY UPDATE`.
pub async fn lock_filters(
    conn: &mut PgConnection,
    ids: &[i64],
) -> Result<Vec<CategoryFilter>, BoxError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let rows = sqlx::query_as(
        r#"
        SELECT id, category_id, name, type, choices
        FROM category_filters
        WHERE id = ANY($1)
        ORDER BY id
        FOR NO KEY UPDATE
        "#,
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn set_choices(
    conn: &mut PgConnection,
    id: i64,
    choices: &[String],
) -> Result<(), BoxError> {
    sqlx::query("UPDATE category_filters SET choices = $1 WHERE id = $2")
        .bind(choices)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
