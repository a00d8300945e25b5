//! Dynamic category-filter query parameters
//!
//! Query keys of the form `filter_<id>`, `filter_<id>_lte` and
//! `filter_<id>_gte` restrict goods by their attribute values. Parameters
//! are grouped per category filter, turned into typed [`FilterRule`]s once
//! the filter types are known, and rendered as a `good_id` subquery:
//!
//! - rules for one filter are ANDed on the same value row
//! - rows for different filters are ORed
//! - a good qualifies only when every requested filter matched one of its rows

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use shared::error::{AppError, ErrorCode};
use shared::models::FilterType;
use sqlx::{Postgres, QueryBuilder};

static FILTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^filter_([0-9]+)_?(lte|gte)?").expect("static pattern"));

/// Stored values are text; only integer literals take part in range comparisons.
const NUMERIC_VALUE: &str =
    r"(CASE WHEN value ~ '^\s*-?[0-9]{1,18}\s*$' THEN CAST(value AS BIGINT) END)";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter key {0} has an out of range id")]
    MalformedKey(String),
    #[error("category filter {0} does not exist")]
    UnknownFilter(i64),
    #[error("value {value:?} is not an integer bound for category filter {filter_id}")]
    InvalidValue { filter_id: i64, value: String },
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        let message = e.to_string();
        match e {
            FilterError::MalformedKey(key) => {
                AppError::with_message(ErrorCode::InvalidFilter, message).with_detail("param", key)
            }
            FilterError::UnknownFilter(id) => {
                AppError::with_message(ErrorCode::InvalidFilter, message)
                    .with_detail("category_filter_id", id)
            }
            FilterError::InvalidValue { filter_id, value } => {
                AppError::with_message(ErrorCode::InvalidFilterValue, message)
                    .with_detail("category_filter_id", filter_id)
                    .with_detail("value", value)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lte,
    Gte,
}

/// One `filter_*` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParam {
    pub bound: Option<Bound>,
    pub value: String,
}

/// `filter_*` parameters grouped by category filter id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams(BTreeMap<i64, Vec<FilterParam>>);

impl FilterParams {
    /// Pick the `filter_*` keys out of raw query pairs.
    ///
    /// Other keys are ignored. A repeated key keeps its last value.
    pub fn parse<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut last: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, value) in pairs {
            if FILTER_KEY.is_match(key) {
                last.insert(key, value);
            }
        }

        let mut grouped: BTreeMap<i64, Vec<FilterParam>> = BTreeMap::new();
        for (key, value) in last {
            let Some(caps) = FILTER_KEY.captures(key) else {
                continue;
            };
            let filter_id: i64 = caps[1]
                .parse()
                .map_err(|_| FilterError::MalformedKey(key.to_string()))?;
            let bound = caps.get(2).map(|m| match m.as_str() {
                "lte" => Bound::Lte,
                _ => Bound::Gte,
            });
            grouped.entry(filter_id).or_default().push(FilterParam {
                bound,
                value: value.to_string(),
            });
        }
        Ok(Self(grouped))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Referenced category filter ids, ascending
    pub fn ids(&self) -> Vec<i64> {
        self.0.keys().copied().collect()
    }
}

/// Condition on a single `good_filter_values` row, chosen by filter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRule {
    /// checkbox: value is one of the comma-separated inputs
    AnyOf(Vec<String>),
    /// radio: value equals the input
    Equals(String),
    /// range `_lte`
    AtMost(i64),
    /// range `_gte`
    AtLeast(i64),
}

impl FilterRule {
    /// Rule for one parameter; a range parameter without bound yields none.
    fn for_param(
        filter_id: i64,
        filter_type: FilterType,
        param: &FilterParam,
    ) -> Result<Option<Self>, FilterError> {
        let rule = match (filter_type, param.bound) {
            (FilterType::Checkbox, _) => {
                Self::AnyOf(param.value.split(',').map(str::to_string).collect())
            }
            (FilterType::Radio, _) => Self::Equals(param.value.clone()),
            (FilterType::Range, None) => return Ok(None),
            (FilterType::Range, Some(bound)) => {
                let n: i64 =
                    param
                        .value
                        .trim()
                        .parse()
                        .map_err(|_| FilterError::InvalidValue {
                            filter_id,
                            value: param.value.clone(),
                        })?;
                match bound {
                    Bound::Lte => Self::AtMost(n),
                    Bound::Gte => Self::AtLeast(n),
                }
            }
        };
        Ok(Some(rule))
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::AnyOf(values) => {
                qb.push("value = ANY(");
                qb.push_bind(values.clone());
                qb.push(")");
            }
            Self::Equals(value) => {
                qb.push("value = ");
                qb.push_bind(value.clone());
            }
            Self::AtMost(n) => {
                qb.push(NUMERIC_VALUE);
                qb.push(" <= ");
                qb.push_bind(*n);
            }
            Self::AtLeast(n) => {
                qb.push(NUMERIC_VALUE);
                qb.push(" >= ");
                qb.push_bind(*n);
            }
        }
    }
}

/// Resolved filter restriction, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    clauses: Vec<(i64, Vec<FilterRule>)>,
    required: i64,
}

impl FilterPlan {
    /// Resolve parameters against the filter types found in storage.
    pub fn build(
        params: &FilterParams,
        types: &HashMap<i64, FilterType>,
    ) -> Result<Self, FilterError> {
        let mut clauses = Vec::with_capacity(params.0.len());
        for (&filter_id, group) in &params.0 {
            let filter_type = *types
                .get(&filter_id)
                .ok_or(FilterError::UnknownFilter(filter_id))?;
            let mut rules = Vec::new();
            for param in group {
                if let Some(rule) = FilterRule::for_param(filter_id, filter_type, param)? {
                    rules.push(rule);
                }
            }
            if !rules.is_empty() {
                clauses.push((filter_id, rules));
            }
        }
        Ok(Self {
            clauses,
            required: params.0.len() as i64,
        })
    }

    pub fn clauses(&self) -> &[(i64, Vec<FilterRule>)] {
        &self.clauses
    }

    /// Push a `SELECT good_id ...` subquery yielding the matching goods.
    pub fn push_good_ids(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT good_id FROM good_filter_values WHERE ");
        if self.clauses.is_empty() {
            qb.push("FALSE");
            return;
        }
        for (i, (filter_id, rules)) in self.clauses.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("(category_filter_id = ");
            qb.push_bind(*filter_id);
            for rule in rules {
                qb.push(" AND ");
                rule.push_sql(qb);
            }
            qb.push(")");
        }
        qb.push(" GROUP BY good_id HAVING COUNT(DISTINCT category_filter_id) = ");
        qb.push_bind(self.required);
    }
}
