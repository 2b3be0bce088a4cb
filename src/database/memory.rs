use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::fact_store::FactStore;
use crate::database::manager::StoreError;
use crate::database::models::{Fact, FactText};

#[derive(Default)]
struct Table {
    rows: Vec<Fact>,
    last_id: i32,
}

/// In-process fact store with the same contract as the PostgreSQL one.
/// Used for `FACTS_STORE=memory` and in tests.
pub struct MemoryFactStore {
    table: RwLock<Table>,
    page_size: u32,
}

impl MemoryFactStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            page_size,
        }
    }

    /// Total rows across all users
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every row owned by `user_id`, ignoring the page size
    pub async fn all_for(&self, user_id: Uuid) -> Vec<Fact> {
        self.table
            .read()
            .await
            .rows
            .iter()
            .filter(|fact| fact.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn list_recent(&self, user_id: Uuid) -> Result<Vec<Fact>, StoreError> {
        let table = self.table.read().await;
        let mut facts: Vec<Fact> = table
            .rows
            .iter()
            .filter(|fact| fact.user_id == user_id)
            .cloned()
            .collect();

        facts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        facts.truncate(self.page_size as usize);
        Ok(facts)
    }

    async fn insert(&self, user_id: Uuid, fact_text: &FactText) -> Result<Fact, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let fact = Fact {
            id: table.last_id,
            fact_text: fact_text.as_str().to_string(),
            created_at: Utc::now(),
            user_id,
        };
        table.rows.push(fact.clone());
        Ok(fact)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
