//! Category filter choice-set maintenance

use std::collections::{HashMap, HashSet};

use shared::models::GoodProp;
use sqlx::PgConnection;

use crate::db::{self, BoxError};

/// Union of `existing` and `submitted`, keeping existing order and
/// appending unseen values in submission order. `None` when nothing is new.
pub fn merge_choices<'a>(
    existing: &[String],
    submitted: impl IntoIterator<Item = &'a str>,
) -> Option<Vec<String>> {
    let mut seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut merged = existing.to_vec();
    for value in submitted {
        if seen.insert(value) {
            merged.push(value.to_string());
        }
    }
    (merged.len() > existing.len()).then_some(merged)
}

/// Add submitted checkbox/radio values to their filters' choices.
///
/// Filter rows are locked for the rest of the transaction, so concurrent
/// writers cannot drop each other's additions.
pub async fn sync_choices(conn: &mut PgConnection, props: &[GoodProp]) -> Result<(), BoxError> {
    let mut submitted: HashMap<i64, Vec<&str>> = HashMap::new();
    for prop in props {
        submitted
            .entry(prop.category_filter_id)
            .or_default()
            .push(prop.value.as_str());
    }
    let mut ids: Vec<i64> = submitted.keys().copied().collect();
    ids.sort_unstable();

    let filters = db::category_filters::lock_filters(conn, &ids).await?;
    for filter in filters.into_iter().filter(|f| f.filter_type.collects_choices()) {
        let values = submitted.remove(&filter.id).unwrap_or_default();
        if let Some(choices) = merge_choices(&filter.choices, values) {
            tracing::debug!(
                filter_id = filter.id,
                added = choices.len() - filter.choices.len(),
                "Category filter choices extended"
            );
            db::category_filters::set_choices(conn, filter.id, &choices).await?;
        }
    }
    Ok(())
}
