use crossterm::event::KeyEvent;

use crate::ui::line_input::{InputResult, LineInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Whole number, zero or greater.
    Numeric,
    /// Non-blank text, stored trimmed.
    Text,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Number(u32),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    /// The key did nothing because the field is not editing.
    Ignored,
    Editing,
    /// The draft failed validation. The field stays in edit mode.
    Rejected,
    Cancelled,
    Commit(FieldValue),
    /// Tab or BackTab while editing. The draft is still open; the caller
    /// blurs the field and moves focus only if that blur commits.
    Leave { forward: bool },
}

/// A value shown as plain text that turns into a line input when activated.
/// Commits are reported to the caller, never applied to outside state.
#[derive(Clone, Debug)]
pub struct EditableField {
    kind: ValueKind,
    display: String,
    input: Option<LineInput>,
    disabled: bool,
}

impl EditableField {
    pub fn new(kind: ValueKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            display: initial.into(),
            input: None,
            disabled: false,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.display
    }

    pub fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn input(&self) -> Option<&LineInput> {
        self.input.as_ref()
    }

    /// Disabling mid-edit drops the draft without committing.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.input = None;
        }
    }

    /// Enter edit mode seeded with the current value.
    pub fn activate(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        if self.input.is_none() {
            self.input = Some(LineInput::new(&self.display));
        }
        true
    }

    pub fn handle(&mut self, key: KeyEvent) -> EditOutcome {
        let Some(input) = self.input.as_mut() else {
            return EditOutcome::Ignored;
        };
        match input.handle(key) {
            InputResult::Continue => EditOutcome::Editing,
            InputResult::Submit => self.commit(),
            InputResult::Cancel => {
                self.input = None;
                EditOutcome::Cancelled
            }
            InputResult::Leave { forward } => EditOutcome::Leave { forward },
        }
    }

    /// Focus left the field. Same rules as pressing Enter.
    pub fn blur(&mut self) -> EditOutcome {
        if self.input.is_none() {
            return EditOutcome::Ignored;
        }
        self.commit()
    }

    fn commit(&mut self) -> EditOutcome {
        let Some(input) = self.input.as_ref() else {
            return EditOutcome::Ignored;
        };
        match parse_value(self.kind, &input.value()) {
            Some(value) => {
                self.display = match &value {
                    FieldValue::Number(n) => n.to_string(),
                    FieldValue::Text(s) => s.clone(),
                };
                self.input = None;
                EditOutcome::Commit(value)
            }
            None => EditOutcome::Rejected,
        }
    }
}

pub fn parse_value(kind: ValueKind, raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    match kind {
        ValueKind::Numeric => trimmed.parse::<u32>().ok().map(FieldValue::Number),
        ValueKind::Text if trimmed.is_empty() => None,
        ValueKind::Text => Some(FieldValue::Text(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(field: &mut EditableField, s: &str) {
        for ch in s.chars() {
            field.handle(key(KeyCode::Char(ch)));
        }
    }

    fn replace_with(field: &mut EditableField, s: &str) {
        field.handle(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        type_str(field, s);
    }

    #[test]
    fn weight_commit_then_negative_rejected() {
        let mut field = EditableField::new(ValueKind::Numeric, "5");
        assert!(field.activate());
        replace_with(&mut field, "6");
        assert_eq!(
            field.handle(key(KeyCode::Enter)),
            EditOutcome::Commit(FieldValue::Number(6))
        );
        assert!(!field.is_editing());
        assert_eq!(field.value(), "6");

        field.activate();
        replace_with(&mut field, "-3");
        assert_eq!(field.handle(key(KeyCode::Enter)), EditOutcome::Rejected);
        assert!(field.is_editing());
        assert_eq!(field.value(), "6");
    }

    #[test]
    fn numeric_rejects_garbage() {
        for bad in ["-1", "abc", "", "1.5"] {
            let mut field = EditableField::new(ValueKind::Numeric, "8");
            field.activate();
            replace_with(&mut field, bad);
            assert_eq!(field.blur(), EditOutcome::Rejected, "input {bad:?}");
            assert!(field.is_editing());
            assert_eq!(field.value(), "8");
        }
    }

    #[test]
    fn numeric_accepts_padded_input() {
        let mut field = EditableField::new(ValueKind::Numeric, "8");
        field.activate();
        replace_with(&mut field, " 12 ");
        assert_eq!(field.blur(), EditOutcome::Commit(FieldValue::Number(12)));
    }

    #[test]
    fn whitespace_only_name_is_rejected() {
        let mut field = EditableField::new(ValueKind::Text, "Squat");
        field.activate();
        replace_with(&mut field, "   ");
        assert_eq!(field.handle(key(KeyCode::Enter)), EditOutcome::Rejected);
        assert_eq!(field.value(), "Squat");
    }

    #[test]
    fn text_commit_is_trimmed() {
        let mut field = EditableField::new(ValueKind::Text, "Squat");
        field.activate();
        replace_with(&mut field, "  Front Squat ");
        assert_eq!(
            field.blur(),
            EditOutcome::Commit(FieldValue::Text("Front Squat".into()))
        );
        assert_eq!(field.value(), "Front Squat");
    }

    #[test]
    fn escape_reverts_without_commit() {
        let mut field = EditableField::new(ValueKind::Text, "Row");
        field.activate();
        replace_with(&mut field, "Deadlift");
        assert_eq!(field.handle(key(KeyCode::Esc)), EditOutcome::Cancelled);
        assert!(!field.is_editing());
        assert_eq!(field.value(), "Row");
        assert_eq!(field.blur(), EditOutcome::Ignored);
    }

    #[test]
    fn disabled_field_never_edits() {
        let mut field = EditableField::new(ValueKind::Numeric, "10");
        field.set_disabled(true);
        assert!(!field.activate());
        assert!(!field.is_editing());
        assert_eq!(field.handle(key(KeyCode::Char('1'))), EditOutcome::Ignored);
    }

    #[test]
    fn disabling_mid_edit_drops_draft() {
        let mut field = EditableField::new(ValueKind::Numeric, "10");
        field.activate();
        replace_with(&mut field, "99");
        field.set_disabled(true);
        assert!(!field.is_editing());
        assert_eq!(field.value(), "10");
    }

    #[test]
    fn tab_asks_to_leave_then_blur_commits() {
        let mut field = EditableField::new(ValueKind::Numeric, "8");
        field.activate();
        replace_with(&mut field, "10");
        assert_eq!(
            field.handle(key(KeyCode::Tab)),
            EditOutcome::Leave { forward: true }
        );
        assert!(field.is_editing());
        assert_eq!(field.blur(), EditOutcome::Commit(FieldValue::Number(10)));
    }

    #[test]
    fn commit_happens_once() {
        let mut field = EditableField::new(ValueKind::Numeric, "10");
        field.activate();
        assert_eq!(
            field.handle(key(KeyCode::Enter)),
            EditOutcome::Commit(FieldValue::Number(10))
        );
        assert_eq!(field.handle(key(KeyCode::Enter)), EditOutcome::Ignored);
        assert_eq!(field.blur(), EditOutcome::Ignored);
    }
}
