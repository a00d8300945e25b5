//! Good and good filter value database operations

use std::collections::HashMap;

use shared::models::{Good, GoodCreate, GoodFilterValue, GoodProp, GoodStatus, GoodUpdate, UsersGoods};
use sqlx::{PgConnection, Postgres, QueryBuilder};

use super::BoxError;
use crate::filter::FilterPlan;

/// Restrictions for a goods listing; every `Some` narrows the result
#[derive(Debug, Default, Clone, Copy)]
pub struct GoodSelection<'a> {
    pub category_id: Option<i64>,
    pub status: Option<GoodStatus>,
    /// Ids returned by the search index
    pub ids: Option<&'a [i64]>,
    pub filter: Option<&'a FilterPlan>,
}

fn select_query(sel: &GoodSelection<'_>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT g.id, g.name, g.description, g.category_id, g.status, g.created_at, g.updated_at \
         FROM goods g WHERE TRUE",
    );
    if let Some(category_id) = sel.category_id {
        qb.push(" AND g.category_id = ");
        qb.push_bind(category_id);
    }
    if let Some(status) = sel.status {
        qb.push(" AND g.status = ");
        qb.push_bind(status);
    }
    if let Some(ids) = sel.ids {
        qb.push(" AND g.id = ANY(");
        qb.push_bind(ids.to_vec());
        qb.push(")");
    }
    if let Some(plan) = sel.filter {
        qb.push(" AND g.id IN (");
        plan.push_good_ids(&mut qb);
        qb.push(")");
    }
    qb.push(" ORDER BY g.id");
    qb
}

// ── Read ──

pub async fn select_goods(
    conn: &mut PgConnection,
    sel: &GoodSelection<'_>,
) -> Result<Vec<Good>, BoxError> {
    let mut qb = select_query(sel);
    let mut goods: Vec<Good> = qb.build_query_as::<Good>().fetch_all(&mut *conn).await?;
    attach_props(conn, &mut goods).await?;
    Ok(goods)
}

pub async fn find_good(conn: &mut PgConnection, id: i64) -> Result<Option<Good>, BoxError> {
    let good: Option<Good> = sqlx::query_as(
        "SELECT id, name, description, category_id, status, created_at, updated_at \
         FROM goods WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(good) = good else {
        return Ok(None);
    };
    let mut goods = [good];
    attach_props(conn, &mut goods).await?;
    let [good] = goods;
    Ok(Some(good))
}

/// Lock the good row for the rest of the transaction; false when it does not exist
pub async fn lock_good(conn: &mut PgConnection, id: i64) -> Result<bool, BoxError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM goods WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

async fn attach_props(conn: &mut PgConnection, goods: &mut [Good]) -> Result<(), BoxError> {
    if goods.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = goods.iter().map(|g| g.id).collect();
    let rows: Vec<GoodFilterValue> = sqlx::query_as(
        "SELECT id, good_id, category_filter_id, value FROM good_filter_values \
         WHERE good_id = ANY($1) ORDER BY category_filter_id, id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_good: HashMap<i64, Vec<GoodFilterValue>> = HashMap::new();
    for row in rows {
        by_good.entry(row.good_id).or_default().push(row);
    }
    for good in goods.iter_mut() {
        good.props = by_good.remove(&good.id).unwrap_or_default();
    }
    Ok(())
}

/// User prices linked to a good
pub async fn list_user_prices(
    conn: &mut PgConnection,
    good_id: i64,
) -> Result<Vec<UsersGoods>, BoxError> {
    let rows = sqlx::query_as(
        "SELECT user_id, good_id, price FROM users_goods WHERE good_id = $1 ORDER BY user_id",
    )
    .bind(good_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Every linked price of goods in a category, optionally limited to `ids`
pub async fn price_points(
    conn: &mut PgConnection,
    category_id: i64,
    ids: Option<&[i64]>,
) -> Result<Vec<f64>, BoxError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT ug.price FROM users_goods ug JOIN goods g ON g.id = ug.good_id \
         WHERE g.category_id = ",
    );
    qb.push_bind(category_id);
    if let Some(ids) = ids {
        qb.push(" AND g.id = ANY(");
        qb.push_bind(ids.to_vec());
        qb.push(")");
    }
    let prices = qb.build_query_scalar::<f64>().fetch_all(&mut *conn).await?;
    Ok(prices)
}

// ── Write ──

/// Insert the good row and return its generated id
pub async fn insert_good(
    conn: &mut PgConnection,
    data: &GoodCreate,
    now: i64,
) -> Result<i64, BoxError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO goods (name, description, category_id, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.status)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Partial update: absent fields keep their stored value
pub async fn update_fields(
    conn: &mut PgConnection,
    id: i64,
    data: &GoodUpdate,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        UPDATE goods SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            category_id = COALESCE($3, category_id),
            status = COALESCE($4, status),
            updated_at = $5
        WHERE id = $6
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Set the status and return the refreshed good; `None` when it does not exist
pub async fn set_status(
    conn: &mut PgConnection,
    id: i64,
    status: GoodStatus,
    now: i64,
) -> Result<Option<Good>, BoxError> {
    let updated: Option<(i64,)> =
        sqlx::query_as("UPDATE goods SET status = $1, updated_at = $2 WHERE id = $3 RETURNING id")
            .bind(status)
            .bind(now)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match updated {
        Some(_) => find_good(conn, id).await,
        None => Ok(None),
    }
}

/// Bulk-insert attribute values for a good
pub async fn insert_props(
    conn: &mut PgConnection,
    good_id: i64,
    props: &[&GoodProp],
) -> Result<(), BoxError> {
    if props.is_empty() {
        return Ok(());
    }
    let good_ids: Vec<i64> = props.iter().map(|_| good_id).collect();
    let filter_ids: Vec<i64> = props.iter().map(|p| p.category_filter_id).collect();
    let values: Vec<String> = props.iter().map(|p| p.value.clone()).collect();
    sqlx::query(
        r#"
        INSERT INTO good_filter_values (good_id, category_filter_id, value)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[])
        "#,
    )
    .bind(&good_ids)
    .bind(&filter_ids)
    .bind(&values)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Bulk-update attribute values by id; rows of other goods are left alone
pub async fn update_props(
    conn: &mut PgConnection,
    good_id: i64,
    props: &[&GoodProp],
) -> Result<u64, BoxError> {
    let (ids, filter_ids, values): (Vec<i64>, Vec<i64>, Vec<String>) = props
        .iter()
        .filter_map(|p| p.id.map(|id| (id, p.category_filter_id, p.value.clone())))
        .fold(
            (Vec::new(), Vec::new(), Vec::new()),
            |(mut ids, mut filters, mut values), (id, filter, value)| {
                ids.push(id);
                filters.push(filter);
                values.push(value);
                (ids, filters, values)
            },
        );
    if ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        r#"
        UPDATE good_filter_values AS v
        SET category_filter_id = u.category_filter_id, value = u.value
        FROM UNNEST($1::bigint[], $2::bigint[], $3::text[]) AS u(id, category_filter_id, value)
        WHERE v.id = u.id AND v.good_id = $4
        "#,
    )
    .bind(&ids)
    .bind(&filter_ids)
    .bind(&values)
    .bind(good_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
