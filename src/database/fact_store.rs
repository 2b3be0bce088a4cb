use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::StoreError;
use crate::database::models::{Fact, FactText};

/// Typed access to the facts table. Every call is scoped to one user and
/// runs at most once; nothing here retries.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Up to one page of the user's facts, newest first
    async fn list_recent(&self, user_id: Uuid) -> Result<Vec<Fact>, StoreError>;

    /// Append a fact; the store assigns `id` and `created_at`
    async fn insert(&self, user_id: Uuid, fact_text: &FactText) -> Result<Fact, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

const LIST_RECENT_SQL: &str = r#"
    SELECT id, fact_text, created_at, user_id
    FROM facts
    WHERE user_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT $2
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO facts (fact_text, user_id)
    VALUES ($1, $2)
    RETURNING id, fact_text, created_at, user_id
"#;

pub struct PgFactStore {
    pool: PgPool,
    page_size: u32,
}

impl PgFactStore {
    pub fn new(pool: PgPool, page_size: u32) -> Self {
        Self { pool, page_size }
    }
}

#[async_trait]
impl FactStore for PgFactStore {
    async fn list_recent(&self, user_id: Uuid) -> Result<Vec<Fact>, StoreError> {
        let facts = sqlx::query_as::<_, Fact>(LIST_RECENT_SQL)
            .bind(user_id)
            .bind(i64::from(self.page_size))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Fetched {} facts for user {}", facts.len(), user_id);
        Ok(facts)
    }

    async fn insert(&self, user_id: Uuid, fact_text: &FactText) -> Result<Fact, StoreError> {
        let fact = sqlx::query_as::<_, Fact>(INSERT_SQL)
            .bind(fact_text.as_str())
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Saved fact {} for user {}", fact.id, user_id);
        Ok(fact)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_scoped_to_the_user() {
        assert!(LIST_RECENT_SQL.contains("WHERE user_id = $1"));
        assert!(INSERT_SQL.contains("user_id"));
    }

    #[test]
    fn listing_is_bounded_and_ordered() {
        assert!(LIST_RECENT_SQL.contains("LIMIT $2"));
        assert!(LIST_RECENT_SQL.contains("ORDER BY created_at DESC, id DESC"));
    }

    /// Connects to `DATABASE_URL`; returns `None` when it is not set.
    async fn live_store() -> Option<PgFactStore> {
        let _ = dotenvy::dotenv();
        let mut config = crate::config::AppConfig::development().database;
        config.url = Some(std::env::var("DATABASE_URL").ok()?);

        let manager = crate::database::DatabaseManager::connect(&config).await.unwrap();
        manager.ensure_schema().await.unwrap();
        Some(PgFactStore::new(manager.pool().clone(), 10))
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable PostgreSQL database"]
    async fn postgres_round_trip_is_scoped_and_bounded() {
        let Some(store) = live_store().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut saved = Vec::new();
        for i in 0..12 {
            let text = FactText::new(format!("fact {}", i)).unwrap();
            saved.push(store.insert(user, &text).await.unwrap());
        }
        store.insert(other, &FactText::new("someone else's").unwrap()).await.unwrap();

        let first = &saved[0];
        assert_eq!(first.user_id, user);
        assert_eq!(first.fact_text, "fact 0");
        assert!(saved.windows(2).all(|w| w[1].id > w[0].id));

        let facts = store.list_recent(user).await.unwrap();
        assert_eq!(facts.len(), 10);
        assert_eq!(facts[0], saved[11]);
        assert!(facts.iter().all(|f| f.user_id == user));
        assert!(facts.windows(2).all(|w| (w[0].created_at, w[0].id) > (w[1].created_at, w[1].id)));

        assert_eq!(store.list_recent(user).await.unwrap(), facts);
        store.ping().await.unwrap();
    }
}
