use async_trait::async_trait;
use shop_common::EntityKind;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::Mutex;

use super::{foreign_key_constraint, primary_key_constraint, CreateOutcome, Store, USER_EMAIL_CONSTRAINT};
use crate::error::StoreError;
use crate::schema::Entity;

#[derive(Default)]
struct State {
    tables: HashMap<EntityKind, BTreeMap<i32, Entity>>,
    emails: HashSet<String>,
    /// Last generated id per kind, like a serial sequence
    sequences: HashMap<EntityKind, i32>,
    journal: Vec<(EntityKind, i32)>,
    completed: Vec<EntityKind>,
    closed: bool,
}

impl State {
    fn contains(&self, kind: EntityKind, id: i32) -> bool {
        self.tables.get(&kind).is_some_and(|rows| rows.contains_key(&id))
    }

    /// Draw the next generated id. Drawn ids are spent even if the write fails.
    fn next_id(&mut self, kind: EntityKind) -> Result<i32, StoreError> {
        let last = self.sequences.entry(kind).or_insert(0);
        let next = last
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted { entity: kind })?;
        *last = next;
        Ok(next)
    }

    /// Move the sequence past every stored id
    fn resync(&mut self, kind: EntityKind) {
        let max = self
            .tables
            .get(&kind)
            .and_then(|rows| rows.keys().next_back().copied())
            .unwrap_or(0);
        self.sequences.insert(kind, max);
    }
}

/// Store kept in process memory.
///
/// Mirrors the relational schema: unique ids per kind, the user e-mail as
/// conflict arbiter and, unless disabled, foreign keys. Generated ids come
/// from a per-kind sequence that only catches up with explicit ids on
/// [`Store::complete`], as a Postgres serial does.
///
/// With reference checks on, a kind may only be written once every kind it
/// references has been completed. Every accepted row is journaled so callers
/// can inspect the order of persistence.
pub struct MemoryStore {
    enforce_references: bool,
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store that enforces referential integrity
    pub fn new() -> Self {
        Self {
            enforce_references: true,
            state: Mutex::new(State::default()),
        }
    }

    pub fn without_reference_checks() -> Self {
        Self {
            enforce_references: false,
            ..Self::new()
        }
    }

    pub async fn count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .await
            .tables
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    pub async fn get(&self, kind: EntityKind, id: i32) -> Option<Entity> {
        self.state
            .lock()
            .await
            .tables
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .cloned()
    }

    /// Accepted rows in persistence order
    pub async fn journal(&self) -> Vec<(EntityKind, i32)> {
        self.state.lock().await.journal.clone()
    }

    /// Kinds reported complete, in order
    pub async fn completed(&self) -> Vec<EntityKind> {
        self.state.lock().await.completed.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_if_absent(&self, entity: &Entity) -> Result<CreateOutcome, StoreError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(StoreError::Closed);
        }

        let kind = entity.kind();

        if self.enforce_references {
            if let Some(pending) = kind
                .references()
                .iter()
                .find(|target| !state.completed.contains(*target))
            {
                return Err(StoreError::OutOfOrder {
                    entity: kind,
                    pending: *pending,
                });
            }
        }

        let id = match entity.id() {
            Some(id) => id,
            None => state.next_id(kind)?,
        };

        if let Entity::User(user) = entity {
            if state.emails.contains(&user.email) {
                tracing::debug!(constraint = USER_EMAIL_CONSTRAINT, email = %user.email, "Duplicate e-mail");
                return Ok(CreateOutcome::Conflict {
                    key: entity.natural_key(),
                });
            }
        }

        if state.contains(kind, id) {
            return Err(StoreError::DuplicateKey {
                entity: kind,
                constraint: primary_key_constraint(kind),
            });
        }

        if self.enforce_references {
            if let Some(missing) = entity
                .references()
                .into_iter()
                .find(|r| !state.contains(r.target, r.id))
            {
                return Err(StoreError::MissingReference {
                    entity: kind,
                    constraint: foreign_key_constraint(kind, missing.column),
                });
            }
        }

        if let Entity::User(user) = entity {
            state.emails.insert(user.email.clone());
        }
        state.tables.entry(kind).or_default().insert(id, entity.clone());
        state.journal.push((kind, id));

        Ok(CreateOutcome::Created { id })
    }

    async fn complete(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(StoreError::Closed);
        }
        state.resync(kind);
        state.completed.push(kind);
        Ok(state.tables.get(&kind).map_or(0, |rows| rows.len() as u64))
    }

    async fn close(&self) {
        self.state.lock().await.closed = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::decoder::Row;
    use crate::schema::{DistributionCenter, EntitySchema, Product, User};

    fn user(id: Option<i32>, email: &str) -> Entity {
        let mut cells = vec![("email", email.to_string()), ("latitude", "0".into()), ("longitude", "0".into())];
        if let Some(id) = id {
            cells.push(("id", id.to_string()));
        }
        User::decode(&Row::from_pairs(1, cells)).unwrap().into_entity()
    }

    fn product(distribution_center_id: &str) -> Entity {
        Product::decode(&Row::from_pairs(
            1,
            [
                ("cost", "1"),
                ("retail_price", "2"),
                ("distribution_center_id", distribution_center_id),
            ],
        ))
        .unwrap()
        .into_entity()
    }

    #[tokio::test]
    async fn test_generated_ids_catch_up_on_complete() {
        let store = MemoryStore::new();

        assert_eq!(
            store.create_if_absent(&user(Some(5), "a@example.com")).await.unwrap(),
            CreateOutcome::Created { id: 5 }
        );
        assert_eq!(
            store.create_if_absent(&user(None, "b@example.com")).await.unwrap(),
            CreateOutcome::Created { id: 1 }
        );

        assert_eq!(store.complete(EntityKind::User).await.unwrap(), 2);
        assert_eq!(
            store.create_if_absent(&user(None, "c@example.com")).await.unwrap(),
            CreateOutcome::Created { id: 6 }
        );
    }

    #[tokio::test]
    async fn test_conflicting_rows_still_spend_generated_ids() {
        let store = MemoryStore::new();
        store.create_if_absent(&user(None, "a@example.com")).await.unwrap();

        let outcome = store.create_if_absent(&user(None, "a@example.com")).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Conflict { .. }));

        assert_eq!(
            store.create_if_absent(&user(None, "b@example.com")).await.unwrap(),
            CreateOutcome::Created { id: 3 }
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_if_absent(&user(None, "a@example.com")).await.unwrap();

        let outcome = store.create_if_absent(&user(None, "a@example.com")).await.unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::Conflict {
                key: "a@example.com".to_string()
            }
        );
        assert_eq!(store.count(EntityKind::User).await, 1);
    }

    #[tokio::test]
    async fn test_same_user_again_is_a_conflict_not_a_duplicate_id() {
        let store = MemoryStore::new();
        store.create_if_absent(&user(Some(1), "a@example.com")).await.unwrap();

        let outcome = store.create_if_absent(&user(Some(1), "a@example.com")).await.unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::Conflict {
                key: "a@example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_id_is_fatal() {
        let store = MemoryStore::new();
        store.create_if_absent(&user(Some(1), "a@example.com")).await.unwrap();

        match store.create_if_absent(&user(Some(1), "b@example.com")).await {
            Err(StoreError::DuplicateKey { constraint, .. }) => assert_eq!(constraint, "users_pkey"),
            other => panic!("expected duplicate key, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exhausted_sequence_is_an_error() {
        let store = MemoryStore::new();
        store.create_if_absent(&user(Some(i32::MAX), "a@example.com")).await.unwrap();
        store.complete(EntityKind::User).await.unwrap();

        match store.create_if_absent(&user(None, "b@example.com")).await {
            Err(StoreError::IdsExhausted { entity }) => assert_eq!(entity, EntityKind::User),
            other => panic!("expected exhausted ids, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_before_referenced_kind_completes_is_rejected() {
        let store = MemoryStore::new();

        match store.create_if_absent(&product("")).await {
            Err(StoreError::OutOfOrder { entity, pending }) => {
                assert_eq!(entity, EntityKind::Product);
                assert_eq!(pending, EntityKind::DistributionCenter);
            },
            other => panic!("expected out of order write, got {:?}", other),
        }

        store.complete(EntityKind::DistributionCenter).await.unwrap();
        assert!(store.create_if_absent(&product("")).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_reference_is_fatal_when_enforced() {
        let store = MemoryStore::new();
        store.complete(EntityKind::DistributionCenter).await.unwrap();

        match store.create_if_absent(&product("7")).await {
            Err(StoreError::MissingReference { entity, constraint }) => {
                assert_eq!(entity, EntityKind::Product);
                assert_eq!(constraint, "products_distribution_center_id_fkey");
            },
            other => panic!("expected missing reference, got {:?}", other),
        }

        // Products without a distribution center have nothing to resolve
        assert!(store.create_if_absent(&product("")).await.is_ok());

        let lenient = MemoryStore::without_reference_checks();
        assert!(lenient.create_if_absent(&product("7")).await.is_ok());
    }

    #[tokio::test]
    async fn test_reference_resolves_after_parent_is_created() {
        let store = MemoryStore::new();
        let center = DistributionCenter::decode(&Row::from_pairs(
            1,
            [("id", "7"), ("name", "Memphis TN"), ("latitude", "35"), ("longitude", "-90")],
        ))
        .unwrap()
        .into_entity();

        store.create_if_absent(&center).await.unwrap();
        store.complete(EntityKind::DistributionCenter).await.unwrap();
        assert!(store.create_if_absent(&product("7")).await.is_ok());
        assert_eq!(
            store.journal().await,
            vec![(EntityKind::DistributionCenter, 7), (EntityKind::Product, 1)]
        );
    }

    #[tokio::test]
    async fn test_closed_store_rejects_writes() {
        let store = MemoryStore::new();
        store.close().await;

        assert!(store.is_closed().await);
        assert!(matches!(
            store.create_if_absent(&user(None, "a@example.com")).await,
            Err(StoreError::Closed)
        ));
    }
}
