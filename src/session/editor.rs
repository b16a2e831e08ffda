use std::time::Duration;

use chrono::NaiveDate;

use crate::session::expansion::{
    DEFAULT_ANIMATION, DEFAULT_SCROLL_MARGIN, ExpansionController, ScrollRequest, ScrollSurface,
};
use crate::session::reorder::{self, ReorderController, ReorderIntent};
use crate::session::workout::{ExerciseRecord, PlanTemplate, REST, WorkoutSession, day_key_for};
use crate::store::plan_store::{PlanStore, StoreError};

/// Identity of an exercise for the lifetime of one editor. Display indices
/// are derived from list position at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExerciseId(u64);

#[derive(Clone, Debug)]
struct SessionExercise {
    id: ExerciseId,
    record: ExerciseRecord,
}

#[derive(Clone, Copy, Debug)]
pub struct EditorSettings {
    pub animation: Duration,
    pub scroll_margin: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            animation: DEFAULT_ANIMATION,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
        }
    }
}

/// Working copy of one day's workout plus the template it was hydrated from.
pub struct SessionEditor {
    user: String,
    date: NaiveDate,
    kind: String,
    exercises: Vec<SessionExercise>,
    template: PlanTemplate,
    next_id: u64,
    has_changes: bool,
    expansion: ExpansionController,
    reorder: ReorderController,
}

impl SessionEditor {
    pub fn new(
        user: &str,
        date: NaiveDate,
        template: Option<PlanTemplate>,
        settings: EditorSettings,
    ) -> Self {
        let template = template.unwrap_or_else(PlanTemplate::rest);
        let session = WorkoutSession::from_template(date, Some(&template));
        let mut next_id = 0;
        let exercises = session
            .exercises
            .into_iter()
            .map(|record| {
                next_id += 1;
                SessionExercise {
                    id: ExerciseId(next_id),
                    record,
                }
            })
            .collect::<Vec<_>>();
        let expansion =
            ExpansionController::new(exercises.len(), settings.animation, settings.scroll_margin);

        Self {
            user: user.to_string(),
            date,
            kind: session.kind,
            exercises,
            template,
            next_id,
            has_changes: false,
            expansion,
            reorder: ReorderController::new(),
        }
    }

    /// Hydrate the session for `date` from the store. A failed read is logged
    /// and treated as a missing plan.
    pub fn open<S: PlanStore + ?Sized>(
        store: &S,
        user: &str,
        date: NaiveDate,
        settings: EditorSettings,
    ) -> Self {
        let day = day_key_for(date);
        let template = match store.load_plan(user, day) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(%e, user, day, "failed to load plan");
                None
            }
        };
        tracing::debug!(user, day, %date, found = template.is_some(), "opened session");
        Self::new(user, date, template, settings)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> &'static str {
        day_key_for(self.date)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_editable(&self) -> bool {
        self.kind != REST
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn exercise(&self, index: usize) -> &ExerciseRecord {
        &self.exercises[index].record
    }

    pub fn exercises(&self) -> impl Iterator<Item = &ExerciseRecord> {
        self.exercises.iter().map(|e| &e.record)
    }

    pub fn id_of(&self, index: usize) -> ExerciseId {
        self.exercises[index].id
    }

    pub fn index_of(&self, id: ExerciseId) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == id)
    }

    pub fn template(&self) -> &PlanTemplate {
        &self.template
    }

    pub fn working_copy(&self) -> WorkoutSession {
        WorkoutSession {
            date: self.date,
            kind: self.kind.clone(),
            exercises: self.exercises().cloned().collect(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn expansion(&self) -> &ExpansionController {
        &self.expansion
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expansion.expanded()
    }

    pub fn reorder_state(&self) -> &ReorderController {
        &self.reorder
    }

    pub fn reorder_state_mut(&mut self) -> &mut ReorderController {
        &mut self.reorder
    }

    /// Fields are only editable on the expanded card.
    pub fn field_enabled(&self, index: usize) -> bool {
        self.is_editable() && self.expansion.expanded() == Some(index)
    }

    pub fn update_name(&mut self, index: usize, new_name: &str) {
        if !self.is_editable() {
            return;
        }
        self.exercises[index].record.name = new_name.to_string();
        self.refresh_changes();
    }

    /// Every set of the exercise that carried `old_weight` takes `new_weight`.
    pub fn update_weight(&mut self, index: usize, old_weight: f64, new_weight: f64) {
        if !self.is_editable() {
            return;
        }
        for set in &mut self.exercises[index].record.sets {
            if set.weight == old_weight {
                set.weight = new_weight;
            }
        }
        self.refresh_changes();
    }

    pub fn update_reps(&mut self, index: usize, set_index: usize, new_reps: u32) {
        if !self.is_editable() {
            return;
        }
        self.exercises[index].record.sets[set_index].reps = new_reps;
        self.refresh_changes();
    }

    pub fn delete_exercise(&mut self, index: usize) {
        if !self.is_editable() {
            return;
        }
        let before = self.ids();
        let removed = self.exercises.remove(index);
        self.follow_ids(&before);
        tracing::debug!(index, name = %removed.record.name, "deleted exercise");
        self.refresh_changes();
    }

    pub fn add_new_exercise(&mut self) {
        if !self.is_editable() {
            return;
        }
        self.next_id += 1;
        self.exercises.push(SessionExercise {
            id: ExerciseId(self.next_id),
            record: ExerciseRecord::placeholder(),
        });
        self.expansion.on_appended(self.exercises.len());
        self.refresh_changes();
    }

    /// Apply a drag result. The expanded card stays expanded wherever it
    /// ends up. Returns whether the order changed.
    pub fn reorder(&mut self, intent: ReorderIntent) -> bool {
        if !self.is_editable() {
            return false;
        }
        let before = self.ids();
        if !reorder::apply(&mut self.exercises, intent) {
            return false;
        }
        self.follow_ids(&before);
        tracing::debug!(
            source = intent.source,
            destination = intent.destination,
            "reordered exercise"
        );
        self.refresh_changes();
        true
    }

    /// Keyboard reorder: move the expanded exercise one slot up or down.
    pub fn move_expanded(&mut self, down: bool) -> bool {
        if !self.reorder.is_edit_order() {
            return false;
        }
        let Some(index) = self.expansion.expanded() else {
            return false;
        };
        let destination = if down {
            index + 1
        } else {
            match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            }
        };
        self.reorder(ReorderIntent::new(index, destination))
    }

    /// Release of a drag gesture started on a handle.
    pub fn finish_drag(&mut self) -> bool {
        match self.reorder.end_drag() {
            Some(intent) => self.reorder(intent),
            None => false,
        }
    }

    /// Overwrite this weekday's template with the working copy. Local state
    /// is updated regardless of the store outcome, which is returned so the
    /// caller can report it.
    pub fn update_plan_with_current_values<S: PlanStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), StoreError> {
        if !self.is_editable() {
            return Ok(());
        }
        self.template = self.working_copy().to_template();
        self.has_changes = false;
        let day = self.day();
        let result = store.save_plan(&self.user, day, &self.template);
        match &result {
            Ok(()) => tracing::info!(user = %self.user, day, "updated plan template"),
            Err(e) => tracing::warn!(%e, user = %self.user, day, "failed to save plan template"),
        }
        result
    }

    pub fn activate<S: ScrollSurface>(&mut self, index: usize, surface: &S) -> Vec<ScrollRequest> {
        self.expansion.activate(index, surface)
    }

    pub fn on_scroll<S: ScrollSurface>(&mut self, surface: &S) -> Vec<ScrollRequest> {
        self.expansion.on_scroll(surface)
    }

    pub fn tick(&mut self, delta: Duration) -> bool {
        self.expansion.tick(delta)
    }

    /// The editor is going away: stop animations and drop any gesture.
    pub fn teardown(&mut self) {
        self.expansion.teardown();
        self.reorder.cancel_drag();
    }

    fn ids(&self) -> Vec<ExerciseId> {
        self.exercises.iter().map(|e| e.id).collect()
    }

    /// Re-point expansion after a structural edit. `before` lists the ids in
    /// their old order; each old index is resolved to wherever that id sits
    /// now.
    fn follow_ids(&mut self, before: &[ExerciseId]) {
        let exercises = &self.exercises;
        self.expansion.relocate(exercises.len(), |old| {
            let id = before.get(old)?;
            exercises.iter().position(|e| e.id == *id)
        });
    }

    fn refresh_changes(&mut self) {
        self.has_changes = self.working_copy().differs_from(&self.template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::workout::Set;
    use crate::store::plan_store::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() // Monday
    }

    fn two_exercise_template() -> PlanTemplate {
        PlanTemplate::new(
            "Push",
            vec![
                ExerciseRecord::new("A", vec![Set::new(10, 5.0)]),
                ExerciseRecord::new("B", vec![Set::new(8, 5.0)]),
            ],
        )
    }

    fn editor() -> SessionEditor {
        SessionEditor::new("u1", date(), Some(two_exercise_template()), EditorSettings::default())
    }

    #[test]
    fn test_drag_b_to_front() {
        let mut ed = editor();
        assert!(ed.reorder(ReorderIntent::new(1, 0)));
        let names: Vec<&str> = ed.exercises().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(ed.exercise(0).sets, vec![Set::new(8, 5.0)]);
        assert_eq!(ed.exercise(1).sets, vec![Set::new(10, 5.0)]);
        assert!(ed.has_changes());
    }

    #[test]
    fn test_reorder_back_clears_changes() {
        let mut ed = editor();
        ed.reorder(ReorderIntent::new(1, 0));
        ed.reorder(ReorderIntent::new(1, 0));
        assert!(!ed.has_changes());
    }

    #[test]
    fn test_invalid_reorder_keeps_clean() {
        let mut ed = editor();
        assert!(!ed.reorder(ReorderIntent::new(0, 0)));
        assert!(!ed.reorder(ReorderIntent::new(0, 9)));
        assert!(!ed.has_changes());
    }

    #[test]
    fn test_ids_move_with_exercises() {
        let mut ed = editor();
        let b = ed.id_of(1);
        ed.reorder(ReorderIntent::new(1, 0));
        assert_eq!(ed.index_of(b), Some(0));
    }

    fn three_exercise_editor() -> SessionEditor {
        let mut template = two_exercise_template();
        template
            .exercises
            .push(ExerciseRecord::new("C", vec![Set::new(6, 5.0)]));
        SessionEditor::new("u1", date(), Some(template), EditorSettings::default())
    }

    fn settle(ed: &mut SessionEditor) {
        while ed.expansion().is_animating() {
            ed.tick(Duration::from_millis(100));
        }
    }

    #[test]
    fn test_expansion_follows_exercise_through_reorders() {
        let mut ed = three_exercise_editor();
        ed.activate(1, &crate::session::expansion::tests::surface(0, 3));
        settle(&mut ed);
        let b = ed.id_of(1);

        ed.reorder(ReorderIntent::new(1, 2));
        assert_eq!(ed.expanded(), ed.index_of(b));
        ed.reorder(ReorderIntent::new(0, 2));
        assert_eq!(ed.expanded(), ed.index_of(b));
        ed.reorder(ReorderIntent::new(0, 1));
        assert_eq!(ed.expanded(), ed.index_of(b));
        assert_eq!(ed.expanded(), Some(0));
    }

    #[test]
    fn test_expansion_follows_exercise_past_deletion() {
        let mut ed = three_exercise_editor();
        ed.activate(2, &crate::session::expansion::tests::surface(0, 3));
        settle(&mut ed);
        let c = ed.id_of(2);

        ed.delete_exercise(0);
        assert_eq!(ed.expanded(), ed.index_of(c));
        assert_eq!(ed.expanded(), Some(1));
        ed.delete_exercise(1);
        assert_eq!(ed.index_of(c), None);
        assert_eq!(ed.expanded(), Some(0));
    }

    #[test]
    fn test_update_weight_replaces_matching_sets() {
        let template = PlanTemplate::new(
            "Push",
            vec![ExerciseRecord::new(
                "A",
                vec![Set::new(10, 5.0), Set::new(8, 5.0), Set::new(6, 7.5)],
            )],
        );
        let mut ed = SessionEditor::new("u1", date(), Some(template), EditorSettings::default());
        ed.update_weight(0, 5.0, 6.0);
        let weights: Vec<f64> = ed.exercise(0).sets.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![6.0, 6.0, 7.5]);
        assert!(ed.has_changes());
    }

    #[test]
    fn test_update_reps_and_name_target_one_field() {
        let mut ed = editor();
        ed.update_reps(1, 0, 12);
        ed.update_name(0, "Bench");
        assert_eq!(ed.exercise(1).sets[0].reps, 12);
        assert_eq!(ed.exercise(1).name, "B");
        assert_eq!(ed.exercise(0).name, "Bench");
        assert_eq!(ed.exercise(0).sets, vec![Set::new(10, 5.0)]);
    }

    #[test]
    fn test_edit_then_revert_is_clean() {
        let mut ed = editor();
        ed.update_name(0, "Other");
        assert!(ed.has_changes());
        ed.update_name(0, "A");
        assert!(!ed.has_changes());
    }

    #[test]
    fn test_delete_expanded_second_of_two_falls_back_to_first() {
        let mut ed = editor();
        let s = crate::session::expansion::tests::surface(0, 2);
        ed.activate(1, &s);
        assert_eq!(ed.expanded(), Some(1));
        ed.delete_exercise(1);
        assert_eq!(ed.expanded(), Some(0));
        assert_eq!(ed.len(), 1);
        assert!(ed.has_changes());
    }

    #[test]
    fn test_delete_all_leaves_nothing_expanded() {
        let mut ed = editor();
        ed.delete_exercise(0);
        ed.delete_exercise(0);
        assert!(ed.is_empty());
        assert_eq!(ed.expanded(), None);
    }

    #[test]
    fn test_add_new_exercise_appends_placeholder() {
        let mut ed = editor();
        ed.add_new_exercise();
        assert_eq!(ed.len(), 3);
        assert_eq!(ed.exercise(2), &ExerciseRecord::placeholder());
        assert_eq!(ed.expanded(), Some(0));
        assert!(ed.has_changes());
    }

    #[test]
    fn test_promote_twice_is_idempotent() {
        let store = MemoryStore::new();
        let mut ed = editor();
        ed.update_name(0, "Bench");
        ed.update_plan_with_current_values(&store).unwrap();
        assert!(!ed.has_changes());
        let after_first = store.load_plan("u1", "monday").unwrap().unwrap();
        assert_eq!(after_first.exercises[0].name, "Bench");

        ed.update_plan_with_current_values(&store).unwrap();
        assert!(!ed.has_changes());
        assert_eq!(store.load_plan("u1", "monday").unwrap().unwrap(), after_first);
        assert_eq!(ed.template(), &after_first);
    }

    #[test]
    fn test_failed_promote_still_updates_locally() {
        let store = MemoryStore::new();
        store.set_fail_saves(true);
        let mut ed = editor();
        ed.update_name(0, "Bench");
        assert!(ed.update_plan_with_current_values(&store).is_err());
        assert!(!ed.has_changes());
        assert_eq!(ed.template().exercises[0].name, "Bench");
    }

    #[test]
    fn test_rest_session_is_not_editable() {
        let mut ed = SessionEditor::new("u1", date(), None, EditorSettings::default());
        assert!(!ed.is_editable());
        ed.add_new_exercise();
        assert!(ed.is_empty());
        assert!(!ed.has_changes());
        assert_eq!(ed.expanded(), None);
    }

    #[test]
    fn test_open_reads_weekday_template() {
        let store = MemoryStore::new();
        store.save_plan("u1", "monday", &two_exercise_template()).unwrap();
        let ed = SessionEditor::open(&store, "u1", date(), EditorSettings::default());
        assert_eq!(ed.kind(), "Push");
        assert_eq!(ed.len(), 2);
        assert_eq!(ed.expanded(), Some(0));
    }

    #[test]
    fn test_keyboard_move_requires_edit_order() {
        let mut ed = editor();
        assert!(!ed.move_expanded(true));
        ed.reorder_state_mut().toggle_edit_order();
        assert!(ed.move_expanded(true));
        assert_eq!(ed.exercise(1).name, "A");
        assert_eq!(ed.expanded(), Some(1));
        assert!(!ed.move_expanded(true));
    }

    #[test]
    fn test_only_expanded_card_fields_enabled() {
        let ed = editor();
        assert!(ed.field_enabled(0));
        assert!(!ed.field_enabled(1));
    }
}
