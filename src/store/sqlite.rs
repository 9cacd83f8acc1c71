//! SQLite-backed roadmap store.
//!
//! Task lists are stored as a JSON column; roadmaps are always read and written whole.

use super::{not_found, PlanStore, PlanUpdate, SavedPlan, SavedTask};
use crate::error::{PlanetaryError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS plans (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        tasks_json TEXT NOT NULL,
        original_prompt TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_plans_created_at ON plans(created_at);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, tasks_json, original_prompt, created_at, updated_at FROM plans";

/// SQLite-based roadmap store.
pub struct SqlitePlanStore {
    conn: Mutex<Connection>,
}

impl SqlitePlanStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite plan store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PlanetaryError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            tasks_json: row.get(3)?,
            original_prompt: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn write(conn: &Connection, plan: &SavedPlan) -> Result<()> {
        let tasks_json = serde_json::to_string(&plan.tasks_list)?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO plans
            (id, title, description, tasks_json, original_prompt, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                plan.id.to_string(),
                plan.title,
                plan.description,
                tasks_json,
                plan.original_prompt,
                plan.created_at.to_rfc3339(),
                plan.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn fetch(conn: &Connection, id: Uuid) -> Result<SavedPlan> {
        let raw = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.to_string()],
                Self::read_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))?;
        raw.into_saved_plan()
    }
}

/// Row as stored, before JSON and timestamp decoding.
struct RawRow {
    id: String,
    title: String,
    description: String,
    tasks_json: String,
    original_prompt: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn into_saved_plan(self) -> Result<SavedPlan> {
        let tasks_list: Vec<SavedTask> = serde_json::from_str(&self.tasks_json)?;
        Ok(SavedPlan {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| PlanetaryError::Store(format!("Bad plan id '{}': {}", self.id, e)))?,
            title: self.title,
            description: self.description,
            tasks_list,
            original_prompt: self.original_prompt,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PlanetaryError::Store(format!("Bad timestamp '{}': {}", value, e)))
}

#[async_trait]
impl PlanStore for SqlitePlanStore {
    #[instrument(skip(self, plan), fields(id = %plan.id))]
    async fn insert(&self, plan: &SavedPlan) -> Result<()> {
        let conn = self.lock()?;
        Self::write(&conn, plan)?;
        debug!("Inserted plan {}", plan.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<SavedPlan>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY created_at DESC", SELECT_COLUMNS))?;

        let rows = stmt.query_map([], Self::read_row)?;
        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.into_saved_plan()?);
        }
        Ok(plans)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<SavedPlan> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: PlanUpdate) -> Result<SavedPlan> {
        let conn = self.lock()?;
        let mut plan = Self::fetch(&conn, id)?;
        plan.apply(update)?;
        Self::write(&conn, &plan)?;
        info!("Updated plan {}", id);
        Ok(plan)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM plans WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(not_found(id));
        }
        info!("Deleted plan {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_plan;
    use chrono::Duration;

    #[tokio::test]
    async fn test_sqlite_plan_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqlitePlanStore::new(&dir.path().join("nested").join("plans.db")).unwrap();

        let mut older = SavedPlan::from_plan(&sample_plan(), "first");
        older.created_at = older.created_at - Duration::minutes(5);
        let newer = SavedPlan::from_plan(&sample_plan(), "second");

        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let plans = store.list().await.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].id, newer.id);
        assert_eq!(plans[1].original_prompt.as_deref(), Some("first"));

        let fetched = store.get(newer.id).await.unwrap();
        assert_eq!(fetched.tasks_list, newer.tasks_list);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_store_error() {
        let store = SqlitePlanStore::in_memory().unwrap();
        let saved = SavedPlan::from_plan(&sample_plan(), "trip");
        store.insert(&saved).await.unwrap();

        store
            .lock()
            .unwrap()
            .execute(
                "UPDATE plans SET created_at = 'yesterday' WHERE id = ?1",
                params![saved.id.to_string()],
            )
            .unwrap();

        assert!(matches!(store.get(saved.id).await, Err(PlanetaryError::Store(_))));
        assert!(matches!(store.list().await, Err(PlanetaryError::Store(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = SqlitePlanStore::in_memory().unwrap();
        let saved = SavedPlan::from_plan(&sample_plan(), "trip");
        store.insert(&saved).await.unwrap();

        let mut tasks = saved.tasks_list.clone();
        tasks[0].completed = true;
        let updated = store
            .update(
                saved.id,
                PlanUpdate {
                    title: "Ooty Weekend".to_string(),
                    description: saved.description.clone(),
                    tasks_list: tasks,
                    original_prompt: saved.original_prompt.clone(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Ooty Weekend");
        assert!(store.get(saved.id).await.unwrap().tasks_list[0].completed);

        store.delete(saved.id).await.unwrap();
        assert!(matches!(store.get(saved.id).await, Err(PlanetaryError::NotFound(_))));
        assert!(matches!(store.delete(saved.id).await, Err(PlanetaryError::NotFound(_))));
    }
}
