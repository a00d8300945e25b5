//! User and user-price link operations

use shared::models::UsersGoods;
use sqlx::PgConnection;

use super::BoxError;

pub async fn user_exists(conn: &mut PgConnection, id: i64) -> Result<bool, BoxError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

/// Insert the link or overwrite its price
pub async fn upsert_link(
    conn: &mut PgConnection,
    user_id: i64,
    good_id: i64,
    price: f64,
) -> Result<UsersGoods, BoxError> {
    let link = sqlx::query_as(
        r#"
        INSERT INTO users_goods (user_id, good_id, price)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, good_id)
        DO UPDATE SET price = EXCLUDED.price
        RETURNING user_id, good_id, price
        "#,
    )
    .bind(user_id)
    .bind(good_id)
    .bind(price)
    .fetch_one(&mut *conn)
    .await?;
    Ok(link)
}
