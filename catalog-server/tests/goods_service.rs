//! GoodService against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a server where the test user may
//! create databases: `cargo test -p catalog-server -- --ignored`.

use std::time::Duration;

use catalog_server::filter::FilterParams;
use catalog_server::search::SearchClient;
use catalog_server::services::{GoodQuery, GoodService};
use httpmock::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{GoodCreate, GoodProp, GoodStatus, GoodUpdate, GoodUserLink};
use sqlx::PgPool;

const CATEGORY: i64 = 1;
const COLOR: i64 = 3;
const WEIGHT: i64 = 5;
const SIZE: i64 = 7;

fn service(pool: PgPool, server: &MockServer) -> GoodService {
    let search = SearchClient::new(&server.base_url(), "goods", Duration::from_secs(5)).unwrap();
    GoodService::new(pool, search)
}

async fn seed_filters(pool: &PgPool) {
    sqlx::query(
        r#"
        INSERT INTO category_filters (id, category_id, name, type, choices) VALUES
            (3, 1, 'Color', 'checkbox', '{red}'),
            (5, 1, 'Weight', 'range', '{}'),
            (7, 1, 'Size', 'radio', '{}')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_good(
    pool: &PgPool,
    name: &str,
    category_id: i64,
    status: GoodStatus,
    props: &[(i64, &str)],
) -> i64 {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO goods (name, category_id, status, created_at, updated_at) \
         VALUES ($1, $2, $3, 0, 0) RETURNING id",
    )
    .bind(name)
    .bind(category_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap();
    for &(filter_id, value) in props {
        sqlx::query(
            "INSERT INTO good_filter_values (good_id, category_filter_id, value) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(filter_id)
        .bind(value)
        .execute(pool)
        .await
        .unwrap();
    }
    id
}

async fn seed_user(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn choices(pool: &PgPool, filter_id: i64) -> Vec<String> {
    sqlx::query_scalar("SELECT choices FROM category_filters WHERE id = $1")
        .bind(filter_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn params(pairs: &[(&str, &str)]) -> FilterParams {
    FilterParams::parse(pairs.iter().copied()).unwrap()
}

fn ids(goods: &[shared::models::Good]) -> Vec<i64> {
    goods.iter().map(|g| g.id).collect()
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn get_all_applies_equality_filters(pool: PgPool) {
    let server = MockServer::start_async().await;
    let a = seed_good(&pool, "Lamp", 1, GoodStatus::Published, &[]).await;
    let b = seed_good(&pool, "Desk", 1, GoodStatus::Draft, &[]).await;
    let c = seed_good(&pool, "Sofa", 2, GoodStatus::Published, &[]).await;
    let svc = service(pool, &server);

    assert_eq!(ids(&svc.get_all(None, None).await.unwrap()), vec![a, b, c]);
    assert_eq!(
        ids(&svc.get_all(Some(GoodStatus::Published), None).await.unwrap()),
        vec![a, c]
    );
    assert_eq!(
        ids(&svc.get_all(Some(GoodStatus::Published), Some(1)).await.unwrap()),
        vec![a]
    );
    assert!(svc.get_all(None, Some(9)).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn checkbox_filter_matches_any_listed_value(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    let red = seed_good(&pool, "Red lamp", CATEGORY, GoodStatus::Draft, &[(COLOR, "red")]).await;
    seed_good(&pool, "Black lamp", CATEGORY, GoodStatus::Draft, &[(COLOR, "black")]).await;
    let svc = service(pool, &server);
    let query = GoodQuery::default();

    let found = svc
        .get_query(&query, &params(&[("filter_3", "red,blue")]))
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![red]);

    let found = svc
        .get_query(&query, &params(&[("filter_3", "green")]))
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn radio_filter_requires_exact_value(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    let m = seed_good(&pool, "Shirt M", CATEGORY, GoodStatus::Draft, &[(SIZE, "M")]).await;
    seed_good(&pool, "Shirt L", CATEGORY, GoodStatus::Draft, &[(SIZE, "L")]).await;
    let svc = service(pool, &server);

    let found = svc
        .get_query(&GoodQuery::default(), &params(&[("filter_7", "M")]))
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![m]);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn range_filter_is_inclusive_and_needs_a_value(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    let mut expected = vec![];
    for weight in ["5", "10", "15", "20", "25"] {
        let id = seed_good(&pool, "Box", CATEGORY, GoodStatus::Draft, &[(WEIGHT, weight)]).await;
        if ["10", "15", "20"].contains(&weight) {
            expected.push(id);
        }
    }
    seed_good(&pool, "Weightless", CATEGORY, GoodStatus::Draft, &[(COLOR, "red")]).await;
    let svc = service(pool, &server);

    let found = svc
        .get_query(
            &GoodQuery::default(),
            &params(&[("filter_5_gte", "10"), ("filter_5_lte", "20")]),
        )
        .await
        .unwrap();
    assert_eq!(ids(&found), expected);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn filters_on_several_ids_must_all_match(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    seed_good(&pool, "Only color", CATEGORY, GoodStatus::Draft, &[(COLOR, "red")]).await;
    let both = seed_good(
        &pool,
        "Color and weight",
        CATEGORY,
        GoodStatus::Draft,
        &[(COLOR, "red"), (WEIGHT, "12")],
    )
    .await;
    let svc = service(pool, &server);

    let found = svc
        .get_query(
            &GoodQuery::default(),
            &params(&[("filter_3", "red"), ("filter_5_gte", "10")]),
        )
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![both]);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_filter_id_is_rejected(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    let svc = service(pool, &server);

    let err: AppError = svc
        .get_query(&GoodQuery::default(), &params(&[("filter_42", "x")]))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::InvalidFilter);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn name_restricts_to_search_hits(pool: PgPool) {
    let server = MockServer::start_async().await;
    let lamp = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    seed_good(&pool, "Desk", CATEGORY, GoodStatus::Draft, &[]).await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/goods/_search");
            then.status(200).json_body(serde_json::json!({
                "hits": { "hits": [{ "_id": lamp.to_string() }] }
            }));
        })
        .await;
    let svc = service(pool, &server);

    let query = GoodQuery {
        name: Some("lmap".into()),
        ..Default::default()
    };
    let found = svc.get_query(&query, &FilterParams::default()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(ids(&found), vec![lamp]);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn price_stats_empty_without_links(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    let svc = service(pool, &server);

    let stats = svc.get_price_stats(CATEGORY, None).await.unwrap();
    assert!(stats.labels.is_empty());
    assert!(stats.data.is_empty());
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn price_stats_bins_every_linked_price(pool: PgPool) {
    let server = MockServer::start_async().await;
    let lamp = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    let desk = seed_good(&pool, "Desk", CATEGORY, GoodStatus::Draft, &[]).await;
    let other = seed_good(&pool, "Sofa", 2, GoodStatus::Draft, &[]).await;
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let svc = service(pool, &server);

    for (user_id, good_id, price) in [
        (alice, lamp, 10.0),
        (bob, lamp, 20.0),
        (alice, desk, 30.0),
        (bob, desk, 50.0),
        (alice, other, 999.0),
    ] {
        svc.link_with_user(good_id, GoodUserLink { user_id, price })
            .await
            .unwrap();
    }

    let stats = svc.get_price_stats(CATEGORY, None).await.unwrap();
    assert_eq!(stats.labels, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    assert_eq!(stats.data, vec![1, 1, 1, 1]);
    assert_eq!(stats.data.iter().sum::<u64>(), 4);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn create_good_merges_choices_and_indexes(pool: PgPool) {
    let server = MockServer::start_async().await;
    seed_filters(&pool).await;
    let index = server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/goods/_doc/");
            then.status(201).json_body(serde_json::json!({ "result": "created" }));
        })
        .await;
    let svc = service(pool.clone(), &server);

    let good = svc
        .create_good(GoodCreate {
            name: "Lamp".into(),
            description: Some("Desk lamp".into()),
            category_id: CATEGORY,
            status: GoodStatus::Published,
            props: vec![
                GoodProp {
                    id: None,
                    category_filter_id: COLOR,
                    value: "blue".into(),
                },
                GoodProp {
                    id: None,
                    category_filter_id: SIZE,
                    value: "XL".into(),
                },
                GoodProp {
                    id: None,
                    category_filter_id: WEIGHT,
                    value: "12".into(),
                },
            ],
        })
        .await
        .unwrap();

    index.assert_async().await;
    assert_eq!(good.props.len(), 3);
    assert_eq!(good.status, GoodStatus::Published);

    let color = choices(&pool, COLOR).await;
    assert!(color.contains(&"red".to_string()));
    assert!(color.contains(&"blue".to_string()));
    assert_eq!(choices(&pool, SIZE).await, vec!["XL".to_string()]);
    assert!(choices(&pool, WEIGHT).await.is_empty());
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn create_good_rolls_back_when_indexing_fails(pool: PgPool) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/goods/_doc/");
            then.status(503).body("unavailable");
        })
        .await;
    let svc = service(pool.clone(), &server);

    let err: AppError = svc
        .create_good(GoodCreate {
            name: "Lamp".into(),
            description: None,
            category_id: CATEGORY,
            status: GoodStatus::Draft,
            props: vec![],
        })
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::SearchIndexError);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

fn create_payload(name: &str, props: &[(i64, &str)]) -> GoodCreate {
    GoodCreate {
        name: name.into(),
        description: None,
        category_id: CATEGORY,
        status: GoodStatus::Draft,
        props: props
            .iter()
            .map(|&(category_filter_id, value)| GoodProp {
                id: None,
                category_filter_id,
                value: value.into(),
            })
            .collect(),
    }
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn create_good_removes_document_when_commit_fails(pool: PgPool) {
    let server = MockServer::start_async().await;
    let index = server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/goods/_doc/");
            then.status(201).json_body(serde_json::json!({ "result": "created" }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path_contains("/goods/_doc/");
            then.status(200).json_body(serde_json::json!({ "result": "deleted" }));
        })
        .await;
    sqlx::query(
        r#"
        CREATE FUNCTION reject_at_commit() RETURNS trigger AS $$
        BEGIN
            IF NEW.name = 'Rejected' THEN
                RAISE EXCEPTION 'rejected at commit';
            END IF;
            RETURN NEW;
        END
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE CONSTRAINT TRIGGER reject_at_commit AFTER INSERT ON goods \
         DEFERRABLE INITIALLY DEFERRED FOR EACH ROW EXECUTE FUNCTION reject_at_commit()",
    )
    .execute(&pool)
    .await
    .unwrap();
    let svc = service(pool.clone(), &server);

    let err: AppError = svc
        .create_good(create_payload("Rejected", &[]))
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::InternalError);

    index.assert_hits_async(1).await;
    delete.assert_hits_async(1).await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goods")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_creates_on_one_filter_all_succeed(pool: PgPool) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/goods/_doc/");
            then.status(201).json_body(serde_json::json!({ "result": "created" }));
        })
        .await;
    seed_filters(&pool).await;
    let svc = service(pool.clone(), &server);

    for round in 0..10 {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let svc = svc.clone();
                let value = format!("shade-{round}-{i}");
                tokio::spawn(async move {
                    svc.create_good(create_payload("Lamp", &[(COLOR, &value), (SIZE, "M")]))
                        .await
                })
            })
            .collect();
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "create failed: {result:?}");
        }
    }

    let color = choices(&pool, COLOR).await;
    assert_eq!(color.len(), 1 + 10 * 4);
    assert!(color.contains(&"shade-9-3".to_string()));
    assert_eq!(choices(&pool, SIZE).await, vec!["M".to_string()]);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_creates_index_in_parallel(pool: PgPool) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/goods/_doc/");
            then.status(201)
                .delay(Duration::from_millis(600))
                .json_body(serde_json::json!({ "result": "created" }));
        })
        .await;
    seed_filters(&pool).await;
    let svc = service(pool.clone(), &server);

    let started = std::time::Instant::now();
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.create_good(create_payload("Lamp", &[(COLOR, &format!("tone-{i}"))]))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // three sequential index round-trips would take at least 1.8s
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(choices(&pool, COLOR).await.len(), 4);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn update_missing_good_is_not_found(pool: PgPool) {
    let server = MockServer::start_async().await;
    let svc = service(pool, &server);

    let err: AppError = svc
        .update_good(404, GoodUpdate::default())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::GoodNotFound);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn update_good_upserts_props_without_reindexing(pool: PgPool) {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/goods");
            then.status(200);
        })
        .await;
    seed_filters(&pool).await;
    let id = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[(COLOR, "red")]).await;
    let existing: i64 =
        sqlx::query_scalar("SELECT id FROM good_filter_values WHERE good_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let svc = service(pool.clone(), &server);

    let good = svc
        .update_good(
            id,
            GoodUpdate {
                name: Some("Floor lamp".into()),
                props: vec![
                    GoodProp {
                        id: Some(existing),
                        category_filter_id: COLOR,
                        value: "green".into(),
                    },
                    GoodProp {
                        id: None,
                        category_filter_id: WEIGHT,
                        value: "7".into(),
                    },
                ],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    any.assert_hits_async(0).await;
    assert_eq!(good.name, "Floor lamp");
    assert_eq!(good.status, GoodStatus::Draft);

    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT category_filter_id, value FROM good_filter_values WHERE good_id = $1 ORDER BY category_filter_id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        rows,
        vec![(COLOR, "green".to_string()), (WEIGHT, "7".to_string())]
    );
    assert!(choices(&pool, COLOR).await.contains(&"green".to_string()));
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn linking_twice_keeps_latest_price(pool: PgPool) {
    let server = MockServer::start_async().await;
    let id = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    let user_id = seed_user(&pool, "alice").await;
    let svc = service(pool.clone(), &server);

    svc.link_with_user(id, GoodUserLink { user_id, price: 10.0 })
        .await
        .unwrap();
    let linked = svc
        .link_with_user(id, GoodUserLink { user_id, price: 12.5 })
        .await
        .unwrap();
    assert_eq!(linked.price, 12.5);

    let detail = svc.retrieve_good(id).await.unwrap();
    assert_eq!(detail.users.len(), 1);
    assert_eq!(detail.users[0].price, 12.5);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn linking_unknown_user_is_not_found(pool: PgPool) {
    let server = MockServer::start_async().await;
    let id = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    let svc = service(pool, &server);

    let err: AppError = svc
        .link_with_user(id, GoodUserLink { user_id: 77, price: 1.0 })
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::UserNotFound);
}

#[sqlx::test(migrator = "catalog_server::db::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn update_status_changes_only_status(pool: PgPool) {
    let server = MockServer::start_async().await;
    let id = seed_good(&pool, "Lamp", CATEGORY, GoodStatus::Draft, &[]).await;
    let svc = service(pool, &server);

    let good = svc.update_status(id, GoodStatus::Archived).await.unwrap();
    assert_eq!(good.status, GoodStatus::Archived);
    assert_eq!(good.name, "Lamp");
    assert!(good.updated_at > 0);

    let err: AppError = svc
        .update_status(id + 1, GoodStatus::Published)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::GoodNotFound);
}
