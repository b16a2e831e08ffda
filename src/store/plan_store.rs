use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use thiserror::Error;

use crate::session::defaults::default_week;
use crate::session::workout::PlanTemplate;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode plans: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("plan store rejected the write")]
    Rejected,
}

/// Durable weekly templates, keyed by user and lower-cased weekday. Writes
/// are full-document overwrites of one day; the last writer wins.
pub trait PlanStore {
    fn load_plan(&self, user: &str, day: &str) -> Result<Option<PlanTemplate>, StoreError>;

    fn save_plan(&self, user: &str, day: &str, plan: &PlanTemplate) -> Result<(), StoreError>;

    fn load_all(&self, user: &str) -> Result<BTreeMap<String, PlanTemplate>, StoreError>;

    /// Load every plan, seeding the default week first if the user has none.
    /// Individual seed writes that fail are logged and skipped.
    fn seed_defaults(&self, user: &str) -> Result<BTreeMap<String, PlanTemplate>, StoreError> {
        let existing = self.load_all(user)?;
        if !existing.is_empty() {
            return Ok(existing);
        }
        let defaults = default_week();
        for (day, plan) in &defaults {
            if let Err(e) = self.save_plan(user, day, plan) {
                tracing::warn!(%e, user, day = %day, "failed to seed default plan");
            }
        }
        tracing::info!(user, "seeded default weekly plans");
        Ok(defaults)
    }
}

/// In-memory store. Writes can be made to fail to exercise the
/// fire-and-forget paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RefCell<BTreeMap<String, BTreeMap<String, PlanTemplate>>>,
    fail_saves: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }
}

impl PlanStore for MemoryStore {
    fn load_plan(&self, user: &str, day: &str) -> Result<Option<PlanTemplate>, StoreError> {
        Ok(self
            .users
            .borrow()
            .get(user)
            .and_then(|plans| plans.get(day))
            .cloned())
    }

    fn save_plan(&self, user: &str, day: &str, plan: &PlanTemplate) -> Result<(), StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Rejected);
        }
        self.save_count.set(self.save_count.get() + 1);
        self.users
            .borrow_mut()
            .entry(user.to_string())
            .or_default()
            .insert(day.to_string(), plan.clone());
        Ok(())
    }

    fn load_all(&self, user: &str) -> Result<BTreeMap<String, PlanTemplate>, StoreError> {
        Ok(self.users.borrow().get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::workout::{WEEKDAYS, day_key};

    #[test]
    fn test_seed_defaults_populates_every_weekday_once() {
        let store = MemoryStore::new();
        let plans = store.seed_defaults("u1").unwrap();
        for weekday in WEEKDAYS {
            assert!(plans.contains_key(day_key(weekday)));
        }
        assert_eq!(store.save_count(), 7);

        // Second call finds existing plans and writes nothing.
        store.seed_defaults("u1").unwrap();
        assert_eq!(store.save_count(), 7);
    }

    #[test]
    fn test_seed_defaults_keeps_existing_plans() {
        let store = MemoryStore::new();
        let custom = PlanTemplate::new("Custom", Vec::new());
        store.save_plan("u1", "monday", &custom).unwrap();
        let plans = store.seed_defaults("u1").unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans["monday"], custom);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = MemoryStore::new();
        store.save_plan("a", "monday", &PlanTemplate::rest()).unwrap();
        assert!(store.load_plan("b", "monday").unwrap().is_none());
        assert!(store.load_plan("a", "monday").unwrap().is_some());
    }

    #[test]
    fn test_failed_save_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        assert!(store.save_plan("a", "monday", &PlanTemplate::rest()).is_err());
        assert!(store.load_all("a").unwrap().is_empty());
    }
}
