use std::time::Duration;

use chrono::{Days, NaiveDate};
use ratatui::layout::Rect;

use crate::config::Config;
use crate::session::editor::SessionEditor;
use crate::session::expansion::ScrollRequest;
use crate::session::plans::PlanBook;
use crate::session::workout::WEEKDAYS;
use crate::store::plan_store::PlanStore;
use crate::ui::components::exercise_card::CardField;
use crate::ui::components::plans_view::PlanField;
use crate::ui::components::session_view::{CardHit, SessionLayout};
use crate::ui::editable_field::{EditOutcome, EditableField, FieldValue, ValueKind};
use crate::ui::layout::AppLayout;
use crate::ui::theme::Theme;

pub const FOOTER_ROWS: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Session,
    Plans,
    History,
    Profile,
}

impl AppScreen {
    pub const ALL: [AppScreen; 4] = [
        AppScreen::Session,
        AppScreen::Plans,
        AppScreen::History,
        AppScreen::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppScreen::Session => "Session",
            AppScreen::Plans => "Plans",
            AppScreen::History => "History",
            AppScreen::Profile => "Profile",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub error: bool,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: true,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub theme: Theme,
    pub config: Config,
    pub user: String,
    pub editor: SessionEditor,
    pub scroll_offset: u32,
    pub area: Rect,
    pub list_area: Rect,
    pub focus: Option<CardField>,
    pub field: Option<EditableField>,
    pub plans: PlanBook,
    pub plans_selected: usize,
    pub plan_focus: Option<PlanField>,
    pub plan_field: Option<EditableField>,
    pub status: Option<StatusLine>,
    pub show_help: bool,
    pub should_quit: bool,
    store: Box<dyn PlanStore>,
}

impl App {
    pub fn new(config: Config, theme: Theme, store: Box<dyn PlanStore>, date: NaiveDate) -> Self {
        let user = config.user_id.clone();
        let plans = PlanBook::load(store.as_ref(), &user);
        let editor = SessionEditor::open(store.as_ref(), &user, date, config.editor_settings());
        tracing::info!(user = %user, %date, "starting session");

        Self {
            screen: AppScreen::Session,
            theme,
            config,
            user,
            editor,
            scroll_offset: 0,
            area: Rect::default(),
            list_area: Rect::default(),
            focus: None,
            field: None,
            plans,
            plans_selected: 0,
            plan_focus: None,
            plan_field: None,
            status: None,
            show_help: false,
            should_quit: false,
            store,
        }
    }

    /// Recompute the card list area for a new terminal size.
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.list_area = AppLayout::new(area, FOOTER_ROWS).main;
        self.clamp_offset();
    }

    pub fn session_layout(&self) -> SessionLayout {
        SessionLayout::measure(&self.editor, self.list_area.height)
    }

    pub fn tick(&mut self, delta: Duration) {
        if self.editor.tick(delta) {
            self.clamp_offset();
        }
    }

    // --- Session screen ---

    pub fn activate(&mut self, index: usize) {
        if index >= self.editor.len() || self.editor.expanded() == Some(index) {
            return;
        }
        self.release_focus();
        let surface = self.session_layout().surface(self.scroll_offset);
        let requests = self.editor.activate(index, &surface);
        self.apply_scroll(&requests);
    }

    pub fn select_next(&mut self) {
        let next = self.editor.expanded().map_or(0, |i| i + 1);
        self.activate(next);
    }

    pub fn select_prev(&mut self) {
        if let Some(prev) = self.editor.expanded().and_then(|i| i.checked_sub(1)) {
            self.activate(prev);
        }
    }

    /// User scroll. The expanded card follows the scroll position.
    pub fn scroll_by(&mut self, delta: i32) {
        let before = self.scroll_offset;
        self.apply_scroll(&[ScrollRequest::By(delta)]);
        if self.scroll_offset == before {
            return;
        }
        let previous = self.editor.expanded();
        let surface = self.session_layout().surface(self.scroll_offset);
        let requests = self.editor.on_scroll(&surface);
        self.apply_scroll(&requests);
        if self.editor.expanded() != previous {
            self.release_focus();
        }
    }

    pub fn apply_scroll(&mut self, requests: &[ScrollRequest]) {
        let max = self.session_layout().max_offset();
        for request in requests {
            self.scroll_offset = match *request {
                ScrollRequest::To(offset) => offset.min(max),
                ScrollRequest::By(delta) => {
                    (self.scroll_offset as i64 + delta as i64).clamp(0, max as i64) as u32
                }
                ScrollRequest::ToBottom => max,
            };
        }
    }

    fn clamp_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.session_layout().max_offset());
    }

    pub fn is_editing(&self) -> bool {
        match self.screen {
            AppScreen::Session => self.field.as_ref().is_some_and(|f| f.is_editing()),
            AppScreen::Plans => self.plan_field.as_ref().is_some_and(|f| f.is_editing()),
            _ => false,
        }
    }

    /// Move field focus within the expanded card. An open edit is committed
    /// first; if it is rejected focus stays put.
    pub fn focus_next(&mut self, forward: bool) {
        let Some(index) = self.editor.expanded() else {
            return;
        };
        if !self.blur_field() {
            return;
        }
        let order = CardField::order(self.editor.exercise(index).sets.len());
        self.focus = cycle(&order, self.focus, forward);
    }

    pub fn focus_field(&mut self, field: CardField) {
        if self.focus != Some(field) && !self.blur_field() {
            return;
        }
        self.focus = Some(field);
    }

    /// Open the focused field for editing, focusing the first one if needed.
    pub fn begin_edit(&mut self) {
        let Some(index) = self.editor.expanded() else {
            return;
        };
        let focus = *self.focus.get_or_insert(CardField::Name);
        let mut field = EditableField::new(
            focus.kind(),
            focus.current_value(self.editor.exercise(index)),
        );
        field.set_disabled(!self.editor.field_enabled(index));
        if field.activate() {
            self.field = Some(field);
        } else {
            self.status = Some(StatusLine::info("Rest days are read-only"));
        }
    }

    pub fn handle_field_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        match field.handle(key) {
            EditOutcome::Leave { forward } => self.focus_next(forward),
            outcome => {
                self.settle_field(outcome);
            }
        }
    }

    /// Commit the open edit on the current screen, as when the pointer
    /// lands somewhere else. Returns false when the draft was rejected.
    pub fn blur(&mut self) -> bool {
        match self.screen {
            AppScreen::Session => self.blur_field(),
            AppScreen::Plans => self.blur_plan_field(),
            AppScreen::History | AppScreen::Profile => true,
        }
    }

    /// Commit any open edit. Returns false when the draft was rejected.
    fn blur_field(&mut self) -> bool {
        let outcome = match self.field.as_mut() {
            Some(field) => field.blur(),
            None => return true,
        };
        self.settle_field(outcome)
    }

    fn settle_field(&mut self, outcome: EditOutcome) -> bool {
        match outcome {
            EditOutcome::Commit(value) => {
                self.field = None;
                if let (Some(index), Some(focus)) = (self.editor.expanded(), self.focus) {
                    self.apply_commit(index, focus, value);
                }
                true
            }
            EditOutcome::Rejected => {
                let kind = self.field.as_ref().map(|f| f.kind());
                self.status = Some(StatusLine::error(rejection_message(kind)));
                false
            }
            EditOutcome::Cancelled => {
                self.field = None;
                true
            }
            EditOutcome::Editing | EditOutcome::Ignored | EditOutcome::Leave { .. } => true,
        }
    }

    fn apply_commit(&mut self, index: usize, focus: CardField, value: FieldValue) {
        match (focus, value) {
            (CardField::Name, FieldValue::Text(name)) => self.editor.update_name(index, &name),
            (CardField::Weight, FieldValue::Number(n)) => {
                let old = self.editor.exercise(index).display_weight();
                self.editor.update_weight(index, old, n as f64);
            }
            (CardField::Reps(set), FieldValue::Number(n)) => {
                self.editor.update_reps(index, set, n)
            }
            (focus, value) => tracing::warn!(?focus, ?value, "commit does not match field"),
        }
        self.status = None;
    }

    /// Drop focus without committing, as when the card it belongs to closes.
    pub fn release_focus(&mut self) {
        if let Some(field) = self.field.as_mut() {
            field.set_disabled(true);
        }
        self.field = None;
        self.focus = None;
    }

    pub fn delete_expanded(&mut self) {
        if self.editor.reorder_state().is_edit_order() {
            return;
        }
        if let Some(index) = self.editor.expanded() {
            self.delete_at(index);
        }
    }

    fn delete_at(&mut self, index: usize) {
        self.release_focus();
        self.editor.delete_exercise(index);
        self.clamp_offset();
    }

    pub fn add_exercise(&mut self) {
        if !self.editor.is_editable() {
            self.status = Some(StatusLine::info("Rest days are read-only"));
            return;
        }
        self.editor.add_new_exercise();
    }

    pub fn toggle_edit_order(&mut self) {
        if !self.editor.is_editable() {
            return;
        }
        self.release_focus();
        self.editor.reorder_state_mut().toggle_edit_order();
    }

    pub fn move_expanded(&mut self, down: bool) {
        self.editor.move_expanded(down);
    }

    pub fn save_template(&mut self) {
        if !self.editor.has_changes() {
            return;
        }
        if !self.blur_field() {
            return;
        }
        self.status = Some(
            match self.editor.update_plan_with_current_values(self.store.as_ref()) {
                Ok(()) => StatusLine::info(format!("Saved {} template", self.editor.day())),
                Err(e) => StatusLine::error(format!("Could not save template: {e}")),
            },
        );
    }

    pub fn shift_date(&mut self, days: i64) {
        let date = self.editor.date();
        let shifted = if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.open_date(date);
        }
    }

    pub fn open_date(&mut self, date: NaiveDate) {
        self.release_focus();
        self.editor.teardown();
        self.editor = SessionEditor::open(
            self.store.as_ref(),
            &self.user,
            date,
            self.config.editor_settings(),
        );
        self.scroll_offset = 0;
        self.status = None;
    }

    // --- Pointer input on the card list ---

    pub fn click(&mut self, col: u16, row: u16) {
        let Some((col, row)) = self.list_local(col, row) else {
            return;
        };
        let layout = self.session_layout();
        let width = self.list_area.width.saturating_sub(1);
        let hit = layout.hit(&self.editor, self.scroll_offset, width, col, row);
        if let Some(CardHit::Field(index, field)) = hit {
            let same = self.editor.expanded() == Some(index) && self.focus == Some(field);
            if same && self.field.is_some() {
                return;
            }
        }
        // Clicking away from an open edit is a blur.
        if !self.blur_field() {
            return;
        }
        match hit {
            Some(CardHit::Control(index)) => {
                if self.editor.reorder_state().is_edit_order() {
                    self.editor.reorder_state_mut().begin_drag(index);
                } else {
                    self.delete_at(index);
                }
            }
            Some(CardHit::Field(index, field)) if self.editor.expanded() == Some(index) => {
                self.focus_field(field);
                if self.focus == Some(field) {
                    self.begin_edit();
                }
            }
            Some(CardHit::Field(index, _)) | Some(CardHit::Card(index)) => self.activate(index),
            None => {}
        }
    }

    pub fn drag(&mut self, col: u16, row: u16) {
        if self.editor.reorder_state().dragging().is_none() {
            return;
        }
        let target = self
            .list_local(col, row)
            .and_then(|(_, row)| self.session_layout().card_at_row(self.scroll_offset, row));
        self.editor.reorder_state_mut().drag_over(target);
    }

    pub fn release(&mut self) {
        self.editor.finish_drag();
    }

    fn list_local(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let area = self.list_area;
        let inside = col >= area.x
            && col < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| (col - area.x, row - area.y))
    }

    // --- Navigation ---

    /// Switch screens. A rejected draft keeps the user where they are.
    pub fn go_to(&mut self, screen: AppScreen) {
        if !self.blur() || screen == self.screen {
            return;
        }
        match self.screen {
            AppScreen::Session => {
                self.release_focus();
                self.editor.teardown();
            }
            AppScreen::Plans => self.release_plan_focus(),
            _ => {}
        }
        match screen {
            AppScreen::Plans => {
                let open = self.plans.open_day();
                self.plans = PlanBook::load(self.store.as_ref(), &self.user);
                if let Some(day) = open {
                    self.plans.toggle(day);
                }
            }
            AppScreen::Session if !self.editor.has_changes() => {
                // Pick up template edits made on the plans screen.
                let date = self.editor.date();
                self.open_date(date);
            }
            _ => {}
        }
        self.show_help = false;
        self.screen = screen;
    }

    // --- Plans screen ---

    pub fn plans_move(&mut self, down: bool) {
        if !self.blur_plan_field() {
            return;
        }
        self.plan_focus = None;
        self.plans_selected = if down {
            (self.plans_selected + 1).min(WEEKDAYS.len() - 1)
        } else {
            self.plans_selected.saturating_sub(1)
        };
    }

    pub fn plans_toggle(&mut self) {
        if !self.blur_plan_field() {
            return;
        }
        self.plan_focus = None;
        self.plans.toggle(self.plans_selected);
    }

    pub fn plans_focus_next(&mut self, forward: bool) {
        if self.plans.open_day() != Some(self.plans_selected) {
            self.plans.toggle(self.plans_selected);
        }
        let Some(plan) = self.plans.day(self.plans_selected) else {
            return;
        };
        let order = PlanField::order(plan);
        if !self.blur_plan_field() {
            return;
        }
        self.plan_focus = cycle(&order, self.plan_focus, forward);
    }

    pub fn plans_begin_edit(&mut self) {
        if self.plan_focus.is_none() {
            self.plans_focus_next(true);
        }
        let Some(focus) = self.plan_focus else {
            return;
        };
        let Some(value) = self
            .plans
            .day(self.plans_selected)
            .and_then(|plan| focus.current_value(plan))
        else {
            return;
        };
        let mut field = EditableField::new(focus.kind(), value);
        if field.activate() {
            self.plan_field = Some(field);
        }
    }

    pub fn handle_plan_field_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(field) = self.plan_field.as_mut() else {
            return;
        };
        match field.handle(key) {
            EditOutcome::Leave { forward } => self.plans_focus_next(forward),
            outcome => {
                self.settle_plan_field(outcome);
            }
        }
    }

    pub fn release_plan_focus(&mut self) {
        self.plan_field = None;
        self.plan_focus = None;
    }

    fn blur_plan_field(&mut self) -> bool {
        let outcome = match self.plan_field.as_mut() {
            Some(field) => field.blur(),
            None => return true,
        };
        self.settle_plan_field(outcome)
    }

    fn settle_plan_field(&mut self, outcome: EditOutcome) -> bool {
        match outcome {
            EditOutcome::Commit(value) => {
                self.plan_field = None;
                if let Some(focus) = self.plan_focus {
                    self.apply_plan_commit(focus, value);
                }
                true
            }
            EditOutcome::Rejected => {
                let kind = self.plan_field.as_ref().map(|f| f.kind());
                self.status = Some(StatusLine::error(rejection_message(kind)));
                false
            }
            EditOutcome::Cancelled => {
                self.plan_field = None;
                true
            }
            EditOutcome::Editing | EditOutcome::Ignored | EditOutcome::Leave { .. } => true,
        }
    }

    fn apply_plan_commit(&mut self, focus: PlanField, value: FieldValue) {
        let store = self.store.as_ref();
        let day = self.plans_selected;
        let result = match (focus, value) {
            (PlanField::Name(e), FieldValue::Text(name)) => self.plans.rename(store, day, e, &name),
            (PlanField::Reps(e, s), FieldValue::Number(n)) => {
                self.plans.set_reps(store, day, e, s, n)
            }
            _ => Ok(()),
        };
        self.status = match result {
            Ok(()) => None,
            Err(e) => Some(StatusLine::error(format!("Could not save plan: {e}"))),
        };
    }
}

fn cycle<T: Copy + PartialEq>(order: &[T], current: Option<T>, forward: bool) -> Option<T> {
    if order.is_empty() {
        return None;
    }
    let position = current.and_then(|c| order.iter().position(|f| *f == c));
    let next = match (position, forward) {
        (None, true) => 0,
        (None, false) => order.len() - 1,
        (Some(p), true) => (p + 1) % order.len(),
        (Some(p), false) => (p + order.len() - 1) % order.len(),
    };
    Some(order[next])
}

fn rejection_message(kind: Option<ValueKind>) -> &'static str {
    match kind {
        Some(ValueKind::Numeric) => "Enter a whole number, 0 or more",
        _ => "Name cannot be empty",
    }
}
