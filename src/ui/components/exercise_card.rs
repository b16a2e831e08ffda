use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::session::reorder::CardControl;
use crate::session::workout::ExerciseRecord;
use crate::ui::editable_field::{EditableField, ValueKind};
use crate::ui::theme::Theme;

/// Border top, summary line, border bottom.
pub const CARD_CHROME_ROWS: u16 = 3;
/// Rows before the first body row inside a card (top border + summary).
pub const BODY_OFFSET: u16 = 2;
/// Columns at the right end of the title row that belong to the card control.
pub const CONTROL_COLS: u16 = 6;

const LABEL_WIDTH: usize = 9;

/// An editable value on the expanded card, in tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardField {
    Name,
    Weight,
    Reps(usize),
}

impl CardField {
    pub fn order(set_count: usize) -> Vec<CardField> {
        let mut fields = vec![CardField::Name, CardField::Weight];
        fields.extend((0..set_count).map(CardField::Reps));
        fields
    }

    pub fn kind(self) -> ValueKind {
        match self {
            CardField::Name => ValueKind::Text,
            CardField::Weight | CardField::Reps(_) => ValueKind::Numeric,
        }
    }

    pub fn body_row(self) -> u16 {
        match self {
            CardField::Name => 0,
            CardField::Weight => 1,
            CardField::Reps(i) => 2 + i as u16,
        }
    }

    pub fn from_body_row(row: u16, set_count: usize) -> Option<CardField> {
        match row {
            0 => Some(CardField::Name),
            1 => Some(CardField::Weight),
            n if ((n - 2) as usize) < set_count => Some(CardField::Reps((n - 2) as usize)),
            _ => None,
        }
    }

    pub fn current_value(self, record: &ExerciseRecord) -> String {
        match self {
            CardField::Name => record.name.clone(),
            CardField::Weight => format_weight(record.display_weight()),
            CardField::Reps(i) => record
                .sets
                .get(i)
                .map(|s| s.reps.to_string())
                .unwrap_or_default(),
        }
    }

    fn label(self) -> String {
        match self {
            CardField::Name => "Name".to_string(),
            CardField::Weight => "Weight".to_string(),
            CardField::Reps(i) => format!("Set {}", i + 1),
        }
    }
}

pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.0}")
    } else {
        format!("{weight:.1}")
    }
}

pub fn body_rows(record: &ExerciseRecord) -> u16 {
    2 + record.sets.len() as u16
}

/// Body rows shown for a card whose body is `fraction` revealed.
pub fn visible_body_rows(record: &ExerciseRecord, fraction: f64) -> u16 {
    (body_rows(record) as f64 * fraction.clamp(0.0, 1.0)).round() as u16
}

pub fn card_height(record: &ExerciseRecord, fraction: f64) -> u16 {
    CARD_CHROME_ROWS + visible_body_rows(record, fraction)
}

pub struct ExerciseCard<'a> {
    pub index: usize,
    pub record: &'a ExerciseRecord,
    pub fraction: f64,
    pub expanded: bool,
    pub enabled: bool,
    pub control: CardControl,
    pub focus: Option<CardField>,
    pub field: Option<&'a EditableField>,
    pub dragging: bool,
    pub drop_target: bool,
    pub theme: &'a Theme,
}

impl ExerciseCard<'_> {
    fn field_spans(&self, field: CardField) -> Vec<Span<'static>> {
        let colors = &self.theme.colors;
        let label = format!("  {:<width$}", field.label(), width = LABEL_WIDTH);
        let mut spans = vec![Span::styled(label, Style::default().fg(colors.muted()))];
        let focused = self.focus == Some(field);

        let editing = self
            .field
            .filter(|f| focused && f.is_editing())
            .and_then(|f| f.input());
        if let Some(input) = editing {
            let (before, cursor, after) = input.render_parts();
            let input_style = Style::default().fg(colors.fg()).bg(colors.input_bg());
            let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
            spans.push(Span::styled(before.to_string(), input_style));
            match cursor {
                Some(ch) => spans.push(Span::styled(ch.to_string(), cursor_style)),
                None => spans.push(Span::styled(" ", cursor_style)),
            }
            spans.push(Span::styled(after.to_string(), input_style));
        } else {
            let value = field.current_value(self.record);
            let style = if focused {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if self.enabled {
                Style::default().fg(colors.fg())
            } else {
                Style::default().fg(colors.muted())
            };
            spans.push(Span::styled(value, style));
        }

        let unit = match field {
            CardField::Name => "",
            CardField::Weight => " kg",
            CardField::Reps(_) => " reps",
        };
        if !unit.is_empty() {
            spans.push(Span::styled(unit, Style::default().fg(colors.muted())));
        }
        spans
    }
}

impl Widget for ExerciseCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border_color = if self.drop_target {
            colors.warning()
        } else if self.expanded {
            colors.border_focused()
        } else {
            colors.border()
        };
        let bg = if self.expanded {
            colors.card_expanded_bg()
        } else {
            colors.card_bg()
        };

        let title = Line::from(vec![
            Span::styled(
                format!(" {} ", self.index + 1),
                Style::default().fg(colors.muted()),
            ),
            Span::styled(
                format!("{} ", self.record.name),
                Style::default()
                    .fg(if self.expanded { colors.accent() } else { colors.fg() })
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let control = match self.control {
            CardControl::Delete => Span::styled(" [x] ", Style::default().fg(colors.delete())),
            CardControl::DragHandle => Span::styled(
                " [≡] ",
                Style::default().fg(colors.handle()).add_modifier(if self.dragging {
                    Modifier::REVERSED
                } else {
                    Modifier::empty()
                }),
            ),
        };

        let block = Block::bordered()
            .border_type(if self.expanded {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg))
            .title(title)
            .title_top(Line::from(control).right_aligned());
        let inner = block.inner(area);
        block.render(area, buf);

        let set_count = self.record.sets.len();
        let summary = format!(
            "  {} {} · {} kg",
            set_count,
            if set_count == 1 { "set" } else { "sets" },
            format_weight(self.record.display_weight())
        );
        let mut lines = vec![Line::from(Span::styled(
            summary,
            Style::default().fg(colors.muted()),
        ))];

        let shown = visible_body_rows(self.record, self.fraction) as usize;
        lines.extend(
            CardField::order(set_count)
                .into_iter()
                .take(shown)
                .map(|field| Line::from(self.field_spans(field))),
        );

        Paragraph::new(lines).render(inner, buf);
    }
}
