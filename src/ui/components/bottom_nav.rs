use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::AppScreen;
use crate::ui::theme::Theme;

pub struct BottomNav<'a> {
    pub active: AppScreen,
    pub theme: &'a Theme,
}

impl<'a> BottomNav<'a> {
    pub fn new(active: AppScreen, theme: &'a Theme) -> Self {
        Self { active, theme }
    }
}

impl Widget for BottomNav<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        buf.set_style(area, Style::default().bg(colors.nav_bg()));

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                AppScreen::ALL
                    .iter()
                    .map(|_| Constraint::Ratio(1, AppScreen::ALL.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        for (i, screen) in AppScreen::ALL.iter().enumerate() {
            let active = *screen == self.active;
            let style = if active {
                Style::default()
                    .fg(colors.nav_active())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted())
            };
            let line = Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(colors.muted())),
                Span::styled(screen.label(), style),
            ])
            .centered();
            Paragraph::new(line).render(cells[i], buf);
        }
    }
}
