//! Good catalog operations
//!
//! Each operation checks out its own connection (or transaction) from the
//! pool; nothing is shared between calls.

use serde::Deserialize;
use shared::error::AppError;
use shared::models::{
    Good, GoodCreate, GoodDetail, GoodProp, GoodStatus, GoodUpdate, GoodUserLink, PriceStat,
    UsersGoods,
};
use sqlx::{PgPool, Postgres, Transaction};

use super::choices::sync_choices;
use super::stats::{PRICE_BINS, histogram};
use crate::db::{self, goods::GoodSelection};
use crate::error::{ServiceError, ServiceResult};
use crate::filter::{FilterParams, FilterPlan};
use crate::search::SearchClient;

/// Plain restrictions of a filtered listing (`filter_*` params travel separately)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoodQuery {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<GoodStatus>,
}

#[derive(Clone)]
pub struct GoodService {
    pool: PgPool,
    search: SearchClient,
}

impl GoodService {
    pub fn new(pool: PgPool, search: SearchClient) -> Self {
        Self { pool, search }
    }

    /// All goods, optionally narrowed by status and category
    pub async fn get_all(
        &self,
        status: Option<GoodStatus>,
        category_id: Option<i64>,
    ) -> ServiceResult<Vec<Good>> {
        let mut conn = self.pool.acquire().await?;
        let goods = db::goods::select_goods(
            &mut *conn,
            &GoodSelection {
                category_id,
                status,
                ..Default::default()
            },
        )
        .await?;
        Ok(goods)
    }

    /// Filtered listing: dynamic category filters, name search, category and status
    pub async fn get_query(
        &self,
        query: &GoodQuery,
        params: &FilterParams,
    ) -> ServiceResult<Vec<Good>> {
        let ids = self.search_ids(query.name.as_deref()).await?;
        let mut conn = self.pool.acquire().await?;

        let plan = if params.is_empty() {
            None
        } else {
            let types = db::category_filters::filter_types(&mut *conn, &params.ids()).await?;
            Some(FilterPlan::build(params, &types)?)
        };
        tracing::debug!(
            filters = plan.as_ref().map_or(0, |p| p.clauses().len()),
            searched = ids.is_some(),
            "Querying goods"
        );

        let goods = db::goods::select_goods(
            &mut *conn,
            &GoodSelection {
                category_id: query.category_id,
                status: query.status,
                ids: ids.as_deref(),
                filter: plan.as_ref(),
            },
        )
        .await?;
        Ok(goods)
    }

    /// 4-bucket histogram of linked user prices for a category
    pub async fn get_price_stats(
        &self,
        category_id: i64,
        name: Option<&str>,
    ) -> ServiceResult<PriceStat> {
        let ids = self.search_ids(name).await?;
        let mut conn = self.pool.acquire().await?;
        let prices = db::goods::price_points(&mut *conn, category_id, ids.as_deref()).await?;
        Ok(histogram(&prices, PRICE_BINS))
    }

    /// Create a good with its props in one transaction and index it.
    ///
    /// The index write happens before the choice merge and commit; if either
    /// of those fails the indexed document is removed again. Filter rows are
    /// locked only for the merge and the commit.
    pub async fn create_good(&self, data: GoodCreate) -> ServiceResult<Good> {
        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;

        let id = db::goods::insert_good(&mut *tx, &data, now).await?;
        let props: Vec<&GoodProp> = data.props.iter().collect();
        db::goods::insert_props(&mut *tx, id, &props).await?;
        let good = db::goods::find_good(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::Db(format!("good {id} missing after insert").into()))?;

        self.search.index_good(&good).await?;

        if let Err(e) = merge_and_commit(tx, &data.props).await {
            if let Err(cleanup) = self.search.delete_good(id).await {
                tracing::error!(good_id = id, error = %cleanup, "Failed to remove orphaned search document");
            }
            return Err(e);
        }

        tracing::info!(good_id = id, props = good.props.len(), "Good created");
        Ok(good)
    }

    /// Partial update plus prop upsert. The search index is not touched.
    pub async fn update_good(&self, id: i64, data: GoodUpdate) -> ServiceResult<Good> {
        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;

        if !db::goods::lock_good(&mut *tx, id).await? {
            return Err(AppError::good_not_found(id).into());
        }

        let (existing, new): (Vec<&GoodProp>, Vec<&GoodProp>) =
            data.props.iter().partition(|p| p.id.is_some());
        db::goods::insert_props(&mut *tx, id, &new).await?;
        let updated = db::goods::update_props(&mut *tx, id, &existing).await?;
        if updated < existing.len() as u64 {
            tracing::warn!(
                good_id = id,
                submitted = existing.len(),
                updated,
                "Some prop ids do not belong to this good and were skipped"
            );
        }
        db::goods::update_fields(&mut *tx, id, &data, now).await?;
        sync_choices(&mut *tx, &data.props).await?;

        let good = db::goods::find_good(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::good_not_found(id))?;
        tx.commit().await?;

        tracing::info!(good_id = id, "Good updated");
        Ok(good)
    }

    /// One good with its props and user prices
    pub async fn retrieve_good(&self, id: i64) -> ServiceResult<GoodDetail> {
        let mut conn = self.pool.acquire().await?;
        let good = db::goods::find_good(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::good_not_found(id))?;
        let users = db::goods::list_user_prices(&mut *conn, id).await?;
        Ok(GoodDetail { good, users })
    }

    pub async fn get_autocomplete_names(&self, substr: &str) -> ServiceResult<Vec<String>> {
        Ok(self.search.autocomplete(substr).await?)
    }

    pub async fn update_status(&self, id: i64, status: GoodStatus) -> ServiceResult<Good> {
        let now = shared::util::now_millis();
        let mut conn = self.pool.acquire().await?;
        let good = db::goods::set_status(&mut *conn, id, status, now)
            .await?
            .ok_or_else(|| AppError::good_not_found(id))?;
        tracing::info!(good_id = id, ?status, "Good status changed");
        Ok(good)
    }

    /// Link a user to a good with a price, overwriting an existing link's price
    pub async fn link_with_user(&self, id: i64, link: GoodUserLink) -> ServiceResult<UsersGoods> {
        let mut tx = self.pool.begin().await?;
        if !db::goods::lock_good(&mut *tx, id).await? {
            return Err(AppError::good_not_found(id).into());
        }
        if !db::users::user_exists(&mut *tx, link.user_id).await? {
            return Err(AppError::user_not_found(link.user_id).into());
        }
        let linked = db::users::upsert_link(&mut *tx, link.user_id, id, link.price).await?;
        tx.commit().await?;

        tracing::info!(good_id = id, user_id = link.user_id, "Good linked with user");
        Ok(linked)
    }

    /// Search-index ids for a non-empty name; `None` means no name restriction
    async fn search_ids(&self, name: Option<&str>) -> ServiceResult<Option<Vec<i64>>> {
        match name.filter(|n| !n.is_empty()) {
            Some(name) => Ok(Some(self.search.ids_by_query(name).await?)),
            None => Ok(None),
        }
    }
}

async fn merge_and_commit(
    mut tx: Transaction<'_, Postgres>,
    props: &[GoodProp],
) -> ServiceResult<()> {
    sync_choices(&mut *tx, props).await?;
    tx.commit().await?;
    Ok(())
}
