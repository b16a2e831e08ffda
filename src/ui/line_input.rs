use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the owner of a [`LineInput`] should do after a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
    /// Tab or BackTab: focus wants to move to the next or previous field.
    /// The draft is left untouched so the owner can commit it first.
    Leave { forward: bool },
}

/// Draft text for an inline value edit.
///
/// Kept as a char vector so cursor arithmetic never has to care about
/// UTF-8 boundaries. Values are short (names, reps, weights).
#[derive(Clone, Debug)]
pub struct LineInput {
    chars: Vec<char>,
    cursor: usize,
}

impl LineInput {
    /// Starts with the cursor after the seeded value.
    pub fn new(seed: &str) -> Self {
        let chars: Vec<char> = seed.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text before the cursor, the char under it (None at the end) and the rest.
    pub fn render_parts(&self) -> (String, Option<char>, String) {
        let before = self.chars[..self.cursor].iter().collect();
        match self.chars.get(self.cursor) {
            Some(&ch) => (before, Some(ch), self.chars[self.cursor + 1..].iter().collect()),
            None => (before, None, String::new()),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => InputResult::Submit,
            KeyCode::Esc => InputResult::Cancel,
            KeyCode::Tab => InputResult::Leave { forward: true },
            KeyCode::BackTab => InputResult::Leave { forward: false },
            code => {
                self.edit(code, ctrl);
                InputResult::Continue
            }
        }
    }

    fn edit(&mut self, code: KeyCode, ctrl: bool) {
        let end = self.chars.len();
        match (code, ctrl) {
            (KeyCode::Left, false) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, false) => self.cursor = (self.cursor + 1).min(end),
            (KeyCode::Left, true) => self.cursor = self.word_start(),
            (KeyCode::Right, true) => self.cursor = self.word_end(),
            (KeyCode::Home, _) | (KeyCode::Char('a'), true) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), true) => self.cursor = end,
            (KeyCode::Backspace, _) if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
            }
            (KeyCode::Delete, _) if self.cursor < end => {
                self.chars.remove(self.cursor);
            }
            (KeyCode::Char('u'), true) => {
                self.chars.drain(..self.cursor);
                self.cursor = 0;
            }
            (KeyCode::Char('k'), true) => self.chars.truncate(self.cursor),
            (KeyCode::Char('w'), true) => {
                let start = self.word_start();
                self.chars.drain(start..self.cursor);
                self.cursor = start;
            }
            (KeyCode::Char(ch), false) => {
                self.chars.insert(self.cursor, ch);
                self.cursor += 1;
            }
            _ => {}
        }
    }

    /// Start of the word left of the cursor, skipping trailing spaces first.
    fn word_start(&self) -> usize {
        let mut pos = self.cursor;
        while pos > 0 && self.chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !self.chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        pos
    }

    fn word_end(&self) -> usize {
        let end = self.chars.len();
        let mut pos = self.cursor;
        while pos < end && self.chars[pos].is_whitespace() {
            pos += 1;
        }
        while pos < end && !self.chars[pos].is_whitespace() {
            pos += 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    fn typed(input: &mut LineInput, s: &str) {
        for ch in s.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn seeded_cursor_sits_at_end() {
        let input = LineInput::new("Row");
        assert_eq!(input.cursor(), 3);
        assert_eq!(input.render_parts(), ("Row".into(), None, String::new()));
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = LineInput::new("15");
        input.handle(key(KeyCode::Left));
        typed(&mut input, "2");
        assert_eq!(input.value(), "125");
        assert_eq!(
            input.render_parts(),
            ("12".into(), Some('5'), String::new())
        );
    }

    #[test]
    fn backspace_and_delete_stop_at_edges() {
        let mut input = LineInput::new("ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "b");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn non_ascii_names_edit_per_char() {
        let mut input = LineInput::new("Überzug");
        input.handle(ctrl(KeyCode::Char('a')));
        input.handle(key(KeyCode::Delete));
        typed(&mut input, "Ö");
        assert_eq!(input.value(), "Öberzug");
    }

    #[test]
    fn ctrl_u_clears_left_of_cursor() {
        let mut input = LineInput::new("Bench Press");
        input.handle(ctrl(KeyCode::Left));
        input.handle(ctrl(KeyCode::Char('u')));
        assert_eq!(input.value(), "Press");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn ctrl_k_clears_right_of_cursor() {
        let mut input = LineInput::new("Bench Press");
        input.handle(ctrl(KeyCode::Char('a')));
        input.handle(ctrl(KeyCode::Right));
        input.handle(ctrl(KeyCode::Char('k')));
        assert_eq!(input.value(), "Bench");
    }

    #[test]
    fn ctrl_w_drops_previous_word() {
        let mut input = LineInput::new("incline bench  ");
        input.handle(ctrl(KeyCode::Char('w')));
        assert_eq!(input.value(), "incline ");
        input.handle(ctrl(KeyCode::Char('w')));
        input.handle(ctrl(KeyCode::Char('w')));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn tab_and_backtab_ask_to_leave_without_touching_draft() {
        let mut input = LineInput::new("8");
        typed(&mut input, "0");
        assert_eq!(
            input.handle(key(KeyCode::Tab)),
            InputResult::Leave { forward: true }
        );
        assert_eq!(
            input.handle(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
            InputResult::Leave { forward: false }
        );
        assert_eq!(input.value(), "80");
    }

    #[test]
    fn enter_submits_and_escape_cancels() {
        let mut input = LineInput::new("x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.handle(key(KeyCode::Char('y'))), InputResult::Continue);
    }
}
