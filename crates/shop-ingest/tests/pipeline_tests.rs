//! End-to-end ingestion runs against the in-memory store

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use shop_common::EntityKind;
use shop_ingest::decoder::Row;
use shop_ingest::schema::{Entity, EntitySchema, Order, User};
use shop_ingest::{
    CreateOutcome, IngestError, IngestOrchestrator, LoadError, MemoryStore, SourceConfig, Store,
    StoreError, ValidationError,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const DISTRIBUTION_CENTERS: &str = "\
id,name,latitude,longitude
1,Memphis TN,35.1174,-89.9711
2,Chicago IL,41.8369,-87.6847
";

const USERS: &str = "\
id,first_name,last_name,email,age,gender,state,street_address,postal_code,city,country,latitude,longitude,traffic_source,created_at
1,Ada,Lovelace,ada@example.com,36,F,Texas,1 Main St,73301,Austin,United States,30.27,-97.74,Search,2022-01-01 10:00:00 UTC
2,Alan,Turing,alan@example.com,41,M,Ohio,2 Elm St,43004,Columbus,United States,39.96,-82.99,Email,2022-02-01 10:00:00 UTC
";

const PRODUCTS: &str = "\
id,cost,category,name,brand,retail_price,department,sku,distribution_center_id
10,2.52,Accessories,Twill Cap,MG,6.25,Women,SKU10,1
11,10.00,Jeans,Slim Jeans,Levi's,40.00,Men,SKU11,2
";

const INVENTORY_ITEMS: &str = "\
id,product_id,created_at,sold_at,cost,product_category,product_name,product_brand,product_retail_price,product_department,product_sku,product_distribution_center_id
100,10,2022-01-05 00:00:00 UTC,2022-03-01 12:00:00 UTC,2.52,Accessories,Twill Cap,MG,6.25,Women,SKU10,1
101,11,2022-01-06 00:00:00 UTC,,10.00,Jeans,Slim Jeans,Levi's,40.00,Men,SKU11,2
";

const ORDERS: &str = "\
order_id,user_id,status,gender,created_at,returned_at,shipped_at,delivered_at,num_of_item
1000,1,Complete,F,2022-03-01 12:00:00 UTC,,2022-03-02 08:00:00 UTC,2022-03-04 15:00:00 UTC,1
1001,2,Processing,M,2022-04-01 09:00:00 UTC,,,,1
";

const ORDER_ITEMS: &str = "\
id,order_id,user_id,product_id,inventory_item_id,status,created_at,shipped_at,delivered_at,returned_at,sale_price
5000,1000,1,10,100,Complete,2022-03-01 12:00:00 UTC,2022-03-02 08:00:00 UTC,2022-03-04 15:00:00 UTC,,6.25
5001,1001,2,11,101,Processing,2022-04-01 09:00:00 UTC,,,,40.00
";

/// Write the default dataset, replacing any file named in `overrides`
fn dataset(overrides: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let files = [
        ("distribution_centers.csv", DISTRIBUTION_CENTERS),
        ("users.csv", USERS),
        ("products.csv", PRODUCTS),
        ("inventory_items.csv", INVENTORY_ITEMS),
        ("orders.csv", ORDERS),
        ("order_items.csv", ORDER_ITEMS),
    ];

    for (name, default) in files {
        let content = overrides
            .iter()
            .find(|(file, _)| *file == name)
            .map_or(default, |(_, content)| *content);
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn orchestrator(dir: &Path, store: Arc<MemoryStore>) -> IngestOrchestrator {
    IngestOrchestrator::new(SourceConfig::new(dir), store)
}

fn load_position(kind: EntityKind) -> usize {
    EntityKind::LOAD_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap()
}

#[tokio::test]
async fn test_full_dataset_loads_every_table() {
    let dir = dataset(&[]);
    let store = Arc::new(MemoryStore::new());

    let report = orchestrator(dir.path(), store.clone()).run().await.unwrap();

    assert_eq!(report.loads.len(), 6);
    for kind in EntityKind::LOAD_ORDER {
        let stats = report.stats(kind).unwrap();
        assert_eq!(stats.rows, 2, "{}", kind);
        assert_eq!(stats.created, 2, "{}", kind);
        assert_eq!(stats.persisted, Some(2), "{}", kind);
        assert_eq!(store.count(kind).await, 2, "{}", kind);
    }
    assert_eq!(report.total_created(), 12);
    assert_eq!(report.total_conflicts(), 0);
    assert_eq!(store.completed().await, EntityKind::LOAD_ORDER.to_vec());
    assert!(store.is_closed().await);
}

#[tokio::test]
async fn test_referencing_rows_never_precede_referenced_kinds() {
    let dir = dataset(&[]);
    let store = Arc::new(MemoryStore::new());

    orchestrator(dir.path(), store.clone()).run().await.unwrap();

    let positions: Vec<usize> = store
        .journal()
        .await
        .into_iter()
        .map(|(kind, _)| load_position(kind))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn test_duplicate_email_is_skipped_and_loading_continues() {
    let users = "\
id,first_name,last_name,email,age,gender,state,street_address,postal_code,city,country,latitude,longitude,traffic_source
1,Ada,Lovelace,ada@example.com,36,F,Texas,1 Main St,73301,Austin,United States,30.27,-97.74,Search
3,Augusta,King,ada@example.com,,F,Texas,1 Main St,73301,Austin,United States,30.27,-97.74,Search
2,Alan,Turing,alan@example.com,41,M,Ohio,2 Elm St,43004,Columbus,United States,39.96,-82.99,Email
";
    let dir = dataset(&[("users.csv", users)]);
    let store = Arc::new(MemoryStore::new());

    let report = orchestrator(dir.path(), store.clone()).run().await.unwrap();

    let user_stats = report.stats(EntityKind::User).unwrap();
    assert_eq!(user_stats.rows, 3);
    assert_eq!(user_stats.created, 2);
    assert_eq!(user_stats.conflicts, vec!["ada@example.com".to_string()]);
    assert_eq!(user_stats.persisted, Some(2));

    // Persisted = input rows - conflicts, and later kinds still load
    assert_eq!(store.count(EntityKind::User).await, 2);
    assert_eq!(store.count(EntityKind::Product).await, 2);
    assert_eq!(store.count(EntityKind::OrderItem).await, 2);
}

#[tokio::test]
async fn test_rerun_against_existing_emails_reports_conflicts() {
    let dir = dataset(&[]);
    let store = Arc::new(MemoryStore::new());

    // Same ids and e-mails as users.csv, as left behind by an earlier run
    for (id, email) in [("1", "ada@example.com"), ("2", "alan@example.com")] {
        let user = User::decode(&Row::from_pairs(
            1,
            [("id", id), ("email", email), ("latitude", "0"), ("longitude", "0")],
        ))
        .unwrap();
        store.create_if_absent(&Entity::User(user)).await.unwrap();
    }

    let report = orchestrator(dir.path(), store.clone()).run().await.unwrap();

    let user_stats = report.stats(EntityKind::User).unwrap();
    assert_eq!(user_stats.created, 0);
    assert_eq!(
        user_stats.conflicts,
        vec!["ada@example.com".to_string(), "alan@example.com".to_string()]
    );
    assert_eq!(store.count(EntityKind::User).await, 2);
    assert_eq!(store.count(EntityKind::Order).await, 2);
    assert_eq!(store.count(EntityKind::OrderItem).await, 2);
}

#[tokio::test]
async fn test_rerun_without_id_column_reports_conflicts() {
    let users = "\
first_name,last_name,email,age,gender,state,street_address,postal_code,city,country,latitude,longitude,traffic_source
Ada,Lovelace,ada@example.com,36,F,Texas,1 Main St,73301,Austin,United States,30.27,-97.74,Search
Alan,Turing,alan@example.com,41,M,Ohio,2 Elm St,43004,Columbus,United States,39.96,-82.99,Email
";
    let dir = dataset(&[("users.csv", users)]);
    let store = Arc::new(MemoryStore::new());

    for (ordinal, email) in [(1, "ada@example.com"), (2, "alan@example.com")] {
        let user = User::decode(&Row::from_pairs(
            ordinal,
            [("email", email), ("latitude", "0"), ("longitude", "0")],
        ))
        .unwrap();
        store.create_if_absent(&Entity::User(user)).await.unwrap();
    }

    let report = orchestrator(dir.path(), store.clone()).run().await.unwrap();

    let user_stats = report.stats(EntityKind::User).unwrap();
    assert_eq!(user_stats.created, 0);
    assert_eq!(user_stats.conflicts.len(), 2);
    assert_eq!(store.count(EntityKind::Order).await, 2);
}

#[tokio::test]
async fn test_sources_out_of_dependency_order_are_rejected_by_store() {
    let store = MemoryStore::new();
    let order = Order::decode(&Row::from_pairs(
        1,
        [
            ("order_id", "1000"),
            ("user_id", "1"),
            ("status", "Processing"),
            ("created_at", "2022-04-01 09:00:00 UTC"),
            ("num_of_item", "1"),
        ],
    ))
    .unwrap();

    match store.create_if_absent(&Entity::Order(order)).await {
        Err(StoreError::OutOfOrder { entity, pending }) => {
            assert_eq!(entity, EntityKind::Order);
            assert_eq!(pending, EntityKind::User);
        },
        other => panic!("expected out of order write, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_numeric_field_aborts_at_that_row() {
    let orders = "\
order_id,user_id,status,gender,created_at,returned_at,shipped_at,delivered_at,num_of_item
1000,1,Complete,F,2022-03-01 12:00:00 UTC,,2022-03-02 08:00:00 UTC,2022-03-04 15:00:00 UTC,1
1001,abc,Processing,M,2022-04-01 09:00:00 UTC,,,,1
1002,2,Processing,M,2022-04-02 09:00:00 UTC,,,,1
";
    let dir = dataset(&[("orders.csv", orders)]);
    let store = Arc::new(MemoryStore::new());

    let err = orchestrator(dir.path(), store.clone()).run().await.unwrap_err();

    match err {
        IngestError::Failed {
            entity,
            row,
            source: LoadError::Validation(ValidationError::InvalidInteger { field, value }),
        } => {
            assert_eq!(entity, EntityKind::Order);
            assert_eq!(row, Some(2));
            assert_eq!(field, "user_id");
            assert_eq!(value, "abc");
        },
        other => panic!("unexpected error: {other:?}"),
    }

    // Earlier rows and kinds are kept, nothing after the bad row is stored
    assert_eq!(store.count(EntityKind::Order).await, 1);
    assert_eq!(store.count(EntityKind::InventoryItem).await, 2);
    assert_eq!(store.count(EntityKind::OrderItem).await, 0);
    assert!(!store.completed().await.contains(&EntityKind::Order));
    assert!(store.is_closed().await);
}

#[tokio::test]
async fn test_unknown_user_reference_is_fatal() {
    let orders = "\
order_id,user_id,status,gender,created_at,returned_at,shipped_at,delivered_at,num_of_item
1000,1,Complete,F,2022-03-01 12:00:00 UTC,,2022-03-02 08:00:00 UTC,2022-03-04 15:00:00 UTC,1
1001,999,Processing,M,2022-04-01 09:00:00 UTC,,,,1
";
    let dir = dataset(&[("orders.csv", orders)]);
    let store = Arc::new(MemoryStore::new());

    let err = orchestrator(dir.path(), store.clone()).run().await.unwrap_err();

    assert_eq!(err.entity(), EntityKind::Order);
    assert_eq!(err.row(), Some(2));
    match err {
        IngestError::Failed {
            source: LoadError::Store(StoreError::MissingReference { constraint, .. }),
            ..
        } => assert_eq!(constraint, "orders_user_id_fkey"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.count(EntityKind::Order).await, 1);
    assert!(store.is_closed().await);
}

#[tokio::test]
async fn test_missing_source_file_fails_without_row() {
    let dir = dataset(&[]);
    std::fs::remove_file(dir.path().join("products.csv")).unwrap();
    let store = Arc::new(MemoryStore::new());

    let err = orchestrator(dir.path(), store.clone()).run().await.unwrap_err();

    assert_eq!(err.entity(), EntityKind::Product);
    assert_eq!(err.row(), None);
    assert!(matches!(
        err,
        IngestError::Failed {
            source: LoadError::Source { .. },
            ..
        }
    ));
    assert_eq!(store.count(EntityKind::User).await, 2);
    assert!(store.is_closed().await);
}

#[tokio::test]
async fn test_cancelled_before_start_persists_nothing() {
    let dir = dataset(&[]);
    let store = Arc::new(MemoryStore::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orchestrator(dir.path(), store.clone())
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Aborted {
            entity: EntityKind::DistributionCenter
        }
    ));
    assert!(store.journal().await.is_empty());
    assert!(store.is_closed().await);
}

/// Cancels the run once the first user has been stored
struct CancelAfterFirstUser {
    inner: Arc<MemoryStore>,
    cancel: CancellationToken,
}

#[async_trait]
impl Store for CancelAfterFirstUser {
    async fn create_if_absent(&self, entity: &Entity) -> Result<CreateOutcome, StoreError> {
        let outcome = self.inner.create_if_absent(entity).await?;
        if entity.kind() == EntityKind::User {
            self.cancel.cancel();
        }
        Ok(outcome)
    }

    async fn complete(&self, kind: EntityKind) -> Result<u64, StoreError> {
        self.inner.complete(kind).await
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}

#[tokio::test]
async fn test_cancel_mid_load_stops_before_next_row() {
    let dir = dataset(&[]);
    let inner = Arc::new(MemoryStore::new());
    let cancel = CancellationToken::new();
    let store = Arc::new(CancelAfterFirstUser {
        inner: inner.clone(),
        cancel: cancel.clone(),
    });

    let err = IngestOrchestrator::new(SourceConfig::new(dir.path()), store)
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::Aborted {
            entity: EntityKind::User
        }
    ));
    assert_eq!(inner.count(EntityKind::DistributionCenter).await, 2);
    assert_eq!(inner.count(EntityKind::User).await, 1);
    assert_eq!(inner.count(EntityKind::Product).await, 0);
    assert!(inner.is_closed().await);
}

#[tokio::test]
async fn test_semicolon_delimited_sources() {
    let semicolons = |csv: &str| csv.replace(',', ";");
    let files: Vec<(&str, String)> = vec![
        ("distribution_centers.csv", semicolons(DISTRIBUTION_CENTERS)),
        ("users.csv", semicolons(USERS)),
        ("products.csv", semicolons(PRODUCTS)),
        ("inventory_items.csv", semicolons(INVENTORY_ITEMS)),
        ("orders.csv", semicolons(ORDERS)),
        ("order_items.csv", semicolons(ORDER_ITEMS)),
    ];
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in &files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    let store = Arc::new(MemoryStore::new());

    let report = IngestOrchestrator::new(SourceConfig::new(dir.path()).with_delimiter(b';'), store.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.total_created(), 12);
}
