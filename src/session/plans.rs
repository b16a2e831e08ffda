use std::collections::BTreeMap;

use crate::session::workout::{PlanTemplate, WEEKDAYS, day_key};
use crate::store::plan_store::{PlanStore, StoreError};

/// The user's weekly templates as shown on the plans screen. At most one day
/// is open; every committed edit is written through immediately.
pub struct PlanBook {
    user: String,
    plans: BTreeMap<String, PlanTemplate>,
    open: Option<usize>,
}

impl PlanBook {
    pub fn new(user: &str, plans: BTreeMap<String, PlanTemplate>) -> Self {
        Self {
            user: user.to_string(),
            plans,
            open: None,
        }
    }

    /// Load every template, seeding the default week for a new user.
    pub fn load<S: PlanStore + ?Sized>(store: &S, user: &str) -> Self {
        let plans = store.seed_defaults(user).unwrap_or_else(|e| {
            tracing::warn!(%e, user, "failed to load plans");
            BTreeMap::new()
        });
        Self::new(user, plans)
    }

    /// Template for the weekday at `day_index` in Monday-first order.
    pub fn day(&self, day_index: usize) -> Option<&PlanTemplate> {
        let weekday = WEEKDAYS.get(day_index)?;
        self.plans.get(day_key(*weekday))
    }

    pub fn open_day(&self) -> Option<usize> {
        self.open
    }

    /// Open a day, or close it if it is already open.
    pub fn toggle(&mut self, day_index: usize) {
        if day_index >= WEEKDAYS.len() {
            return;
        }
        self.open = if self.open == Some(day_index) {
            None
        } else {
            Some(day_index)
        };
    }

    pub fn rename<S: PlanStore + ?Sized>(
        &mut self,
        store: &S,
        day_index: usize,
        exercise: usize,
        name: &str,
    ) -> Result<(), StoreError> {
        self.edit(store, day_index, |plan| {
            let record = plan.exercises.get_mut(exercise)?;
            record.name = name.to_string();
            Some(())
        })
    }

    pub fn set_reps<S: PlanStore + ?Sized>(
        &mut self,
        store: &S,
        day_index: usize,
        exercise: usize,
        set_index: usize,
        reps: u32,
    ) -> Result<(), StoreError> {
        self.edit(store, day_index, |plan| {
            let set = plan.exercises.get_mut(exercise)?.sets.get_mut(set_index)?;
            set.reps = reps;
            Some(())
        })
    }

    fn edit<S, F>(&mut self, store: &S, day_index: usize, apply: F) -> Result<(), StoreError>
    where
        S: PlanStore + ?Sized,
        F: FnOnce(&mut PlanTemplate) -> Option<()>,
    {
        let Some(weekday) = WEEKDAYS.get(day_index) else {
            return Ok(());
        };
        let day = day_key(*weekday);
        let Some(plan) = self.plans.get_mut(day) else {
            return Ok(());
        };
        if plan.is_rest() || apply(plan).is_none() {
            return Ok(());
        }
        let result = store.save_plan(&self.user, day, plan);
        if let Err(e) = &result {
            tracing::warn!(%e, user = %self.user, day, "failed to save plan edit");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::plan_store::MemoryStore;

    fn book(store: &MemoryStore) -> PlanBook {
        PlanBook::load(store, "u1")
    }

    #[test]
    fn test_load_seeds_new_user() {
        let store = MemoryStore::new();
        let book = book(&store);
        assert_eq!(store.load_all("u1").unwrap().len(), 7);
        assert!(book.day(2).unwrap().is_rest());
        assert!(!book.day(0).unwrap().is_rest());
    }

    #[test]
    fn test_toggle_opens_one_day_at_a_time() {
        let store = MemoryStore::new();
        let mut book = book(&store);
        assert_eq!(book.open_day(), None);
        book.toggle(1);
        assert_eq!(book.open_day(), Some(1));
        book.toggle(4);
        assert_eq!(book.open_day(), Some(4));
        book.toggle(4);
        assert_eq!(book.open_day(), None);
        book.toggle(7);
        assert_eq!(book.open_day(), None);
    }

    #[test]
    fn test_rename_writes_through() {
        let store = MemoryStore::new();
        let mut book = book(&store);
        let saves = store.save_count();
        book.rename(&store, 0, 0, "Incline Press").unwrap();
        assert_eq!(store.save_count(), saves + 1);
        let stored = store.load_plan("u1", "monday").unwrap().unwrap();
        assert_eq!(stored.exercises[0].name, "Incline Press");
        assert_eq!(book.day(0).unwrap().exercises[0].name, "Incline Press");
    }

    #[test]
    fn test_set_reps_targets_one_set() {
        let store = MemoryStore::new();
        let mut book = book(&store);
        let before = book.day(1).unwrap().exercises[0].sets.clone();
        book.set_reps(&store, 1, 0, 0, 3).unwrap();
        let after = &book.day(1).unwrap().exercises[0].sets;
        assert_eq!(after[0].reps, 3);
        assert_eq!(after[1..], before[1..]);
    }

    #[test]
    fn test_rest_day_edits_are_ignored() {
        let store = MemoryStore::new();
        let mut book = book(&store);
        let saves = store.save_count();
        book.rename(&store, 2, 0, "Nope").unwrap();
        book.set_reps(&store, 9, 0, 0, 1).unwrap();
        assert_eq!(store.save_count(), saves);
    }

    #[test]
    fn test_failed_write_keeps_local_edit() {
        let store = MemoryStore::new();
        let mut book = book(&store);
        store.set_fail_saves(true);
        assert!(book.rename(&store, 0, 0, "Dips").is_err());
        assert_eq!(book.day(0).unwrap().exercises[0].name, "Dips");
    }
}
