//! In-memory roadmap store.
//!
//! Useful for testing and for running the server without a database.

use super::{not_found, PlanStore, PlanUpdate, SavedPlan};
use crate::error::{PlanetaryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory roadmap store.
pub struct MemoryPlanStore {
    plans: RwLock<HashMap<Uuid, SavedPlan>>,
}

impl MemoryPlanStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, SavedPlan>>> {
        self.plans
            .read()
            .map_err(|e| PlanetaryError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, SavedPlan>>> {
        self.plans
            .write()
            .map_err(|e| PlanetaryError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn insert(&self, plan: &SavedPlan) -> Result<()> {
        self.write()?.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SavedPlan>> {
        let mut plans: Vec<SavedPlan> = self.read()?.values().cloned().collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    async fn get(&self, id: Uuid) -> Result<SavedPlan> {
        self.read()?.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: Uuid, update: PlanUpdate) -> Result<SavedPlan> {
        let mut plans = self.write()?;
        let plan = plans.get_mut(&id).ok_or_else(|| not_found(id))?;
        plan.apply(update)?;
        Ok(plan.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.write()?.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_plan;

    #[tokio::test]
    async fn test_memory_plan_store() {
        let store = MemoryPlanStore::new();
        let saved = SavedPlan::from_plan(&sample_plan(), "trip");

        store.insert(&saved).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.get(saved.id).await.unwrap(), saved);

        let updated = store
            .update(
                saved.id,
                PlanUpdate {
                    title: "Renamed".to_string(),
                    description: String::new(),
                    tasks_list: vec![],
                    original_prompt: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.tasks_list.is_empty());

        store.delete(saved.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let store = MemoryPlanStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id).await, Err(PlanetaryError::NotFound(_))));
        assert!(matches!(store.delete(id).await, Err(PlanetaryError::NotFound(_))));
    }
}
