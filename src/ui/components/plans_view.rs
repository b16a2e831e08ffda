use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::plans::PlanBook;
use crate::session::workout::{PlanTemplate, WEEKDAYS, day_label};
use crate::ui::components::exercise_card::format_weight;
use crate::ui::editable_field::{EditableField, ValueKind};
use crate::ui::theme::Theme;

/// Editable value inside the open day of the plans accordion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanField {
    Name(usize),
    Reps(usize, usize),
}

impl PlanField {
    pub fn order(plan: &PlanTemplate) -> Vec<PlanField> {
        if plan.is_rest() {
            return Vec::new();
        }
        let mut fields = Vec::new();
        for (i, exercise) in plan.exercises.iter().enumerate() {
            fields.push(PlanField::Name(i));
            fields.extend((0..exercise.sets.len()).map(|s| PlanField::Reps(i, s)));
        }
        fields
    }

    pub fn kind(self) -> ValueKind {
        match self {
            PlanField::Name(_) => ValueKind::Text,
            PlanField::Reps(..) => ValueKind::Numeric,
        }
    }

    pub fn current_value(self, plan: &PlanTemplate) -> Option<String> {
        match self {
            PlanField::Name(e) => plan.exercises.get(e).map(|x| x.name.clone()),
            PlanField::Reps(e, s) => plan
                .exercises
                .get(e)
                .and_then(|x| x.sets.get(s))
                .map(|set| set.reps.to_string()),
        }
    }
}

pub struct PlansView<'a> {
    pub book: &'a PlanBook,
    pub selected: usize,
    pub focus: Option<PlanField>,
    pub field: Option<&'a EditableField>,
    pub theme: &'a Theme,
}

impl PlansView<'_> {
    fn value_spans(&self, field: PlanField, plan: &PlanTemplate) -> Vec<Span<'static>> {
        let colors = &self.theme.colors;
        let focused = self.focus == Some(field);
        let editing = self
            .field
            .filter(|f| focused && f.is_editing())
            .and_then(|f| f.input());
        if let Some(input) = editing {
            let (before, cursor, after) = input.render_parts();
            let input_style = Style::default().fg(colors.fg()).bg(colors.input_bg());
            return vec![
                Span::styled(before.to_string(), input_style),
                Span::styled(
                    cursor.map(String::from).unwrap_or_else(|| " ".to_string()),
                    Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg()),
                ),
                Span::styled(after.to_string(), input_style),
            ];
        }
        let style = if focused {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.fg())
        };
        vec![Span::styled(
            field.current_value(plan).unwrap_or_default(),
            style,
        )]
    }

    fn day_lines(&self, plan: &PlanTemplate) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        if plan.is_rest() {
            return vec![Line::styled(
                "      Rest Day",
                Style::default().fg(colors.muted()),
            )];
        }
        let mut lines = Vec::new();
        for (e, exercise) in plan.exercises.iter().enumerate() {
            let mut name = vec![Span::raw("      ")];
            name.extend(self.value_spans(PlanField::Name(e), plan));
            lines.push(Line::from(name));
            for (s, set) in exercise.sets.iter().enumerate() {
                let mut row = vec![Span::styled(
                    format!("        Set {}  ", s + 1),
                    Style::default().fg(colors.muted()),
                )];
                row.extend(self.value_spans(PlanField::Reps(e, s), plan));
                row.push(Span::styled(
                    format!(" reps × {} kg", format_weight(set.weight)),
                    Style::default().fg(colors.muted()),
                ));
                lines.push(Line::from(row));
            }
        }
        lines
    }
}

impl Widget for PlansView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Weekly Plans ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        let mut cursor_line = 0usize;
        for (i, weekday) in WEEKDAYS.iter().enumerate() {
            let plan = self.book.day(i);
            let open = self.book.open_day() == Some(i);
            let selected = self.selected == i;
            if selected {
                cursor_line = lines.len();
            }

            let summary = match plan {
                Some(p) if p.is_rest() => "Rest".to_string(),
                Some(p) => format!("{} · {} exercises", p.kind, p.exercises.len()),
                None => "No plan".to_string(),
            };
            let marker = if open { "▾" } else { "▸" };
            let day_style = if selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {marker} {:<10}", day_label(*weekday)), day_style),
                Span::styled(summary, Style::default().fg(colors.muted())),
            ]));

            if let (true, Some(plan)) = (open, plan) {
                let day_start = lines.len();
                if let Some(PlanField::Name(e) | PlanField::Reps(e, _)) = self.focus {
                    let before: usize = plan.exercises[..e.min(plan.exercises.len())]
                        .iter()
                        .map(|x| 1 + x.sets.len())
                        .sum();
                    let within = match self.focus {
                        Some(PlanField::Reps(_, s)) => 1 + s,
                        _ => 0,
                    };
                    cursor_line = day_start + before + within;
                }
                lines.extend(self.day_lines(plan));
            }
        }

        let height = inner.height as usize;
        let scroll = if height == 0 {
            0
        } else {
            cursor_line.saturating_sub(height.saturating_sub(1))
        };
        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .render(inner, buf);
    }
}
