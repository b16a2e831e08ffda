use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{
    Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
};

use crate::session::editor::SessionEditor;
use crate::session::expansion::{CardBounds, SurfaceSnapshot};
use crate::ui::components::exercise_card::{
    BODY_OFFSET, CONTROL_COLS, CardField, ExerciseCard, card_height,
};
use crate::ui::editable_field::EditableField;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardSlot {
    /// First row of the card in document coordinates.
    pub top: u32,
    pub height: u16,
}

/// Where a pointer landed inside the card list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardHit {
    Control(usize),
    Field(usize, CardField),
    Card(usize),
}

/// Card geometry for one frame. The scrollable document is at least one
/// viewport tall per card so every card owns a band of the scroll range.
#[derive(Clone, Debug, Default)]
pub struct SessionLayout {
    pub slots: Vec<CardSlot>,
    pub content_height: u32,
    pub viewport: u32,
}

impl SessionLayout {
    pub fn measure(editor: &SessionEditor, viewport: u16) -> Self {
        let expansion = editor.expansion();
        let mut top = 0u32;
        let slots = (0..editor.len())
            .map(|i| {
                let height = card_height(editor.exercise(i), expansion.body_fraction(i));
                let slot = CardSlot { top, height };
                top += height as u32;
                slot
            })
            .collect();
        Self {
            slots,
            content_height: top,
            viewport: viewport as u32,
        }
    }

    pub fn total_height(&self) -> u32 {
        let bands = self.slots.len() as u32 * self.viewport;
        self.content_height.max(bands)
    }

    pub fn max_offset(&self) -> u32 {
        self.total_height().saturating_sub(self.viewport)
    }

    /// How far the card list itself is scrolled for a document offset.
    pub fn list_scroll(&self, offset: u32) -> u32 {
        offset.min(self.content_height.saturating_sub(self.viewport))
    }

    pub fn surface(&self, offset: u32) -> SurfaceSnapshot {
        let shift = self.list_scroll(offset) as i64;
        let cards = self
            .slots
            .iter()
            .map(|slot| {
                let top = slot.top as i64 - shift;
                CardBounds {
                    top: top as i32,
                    bottom: (top + slot.height as i64) as i32,
                }
            })
            .collect();
        SurfaceSnapshot {
            offset,
            total: self.total_height(),
            viewport: self.viewport,
            cards,
        }
    }

    /// Resolve a pointer at (`col`, `row`) relative to the list area.
    pub fn hit(
        &self,
        editor: &SessionEditor,
        offset: u32,
        width: u16,
        col: u16,
        row: u16,
    ) -> Option<CardHit> {
        let doc_row = row as u32 + self.list_scroll(offset);
        let index = self
            .slots
            .iter()
            .position(|s| s.top <= doc_row && doc_row < s.top + s.height as u32)?;
        let within = (doc_row - self.slots[index].top) as u16;

        if within == 0 && col >= width.saturating_sub(CONTROL_COLS) {
            return Some(CardHit::Control(index));
        }
        if within >= BODY_OFFSET {
            let field =
                CardField::from_body_row(within - BODY_OFFSET, editor.exercise(index).sets.len());
            if let Some(field) = field {
                if within + 1 < self.slots[index].height {
                    return Some(CardHit::Field(index, field));
                }
            }
        }
        Some(CardHit::Card(index))
    }

    /// Card under a document row, for drag targeting.
    pub fn card_at_row(&self, offset: u32, row: u16) -> Option<usize> {
        let doc_row = row as u32 + self.list_scroll(offset);
        self.slots
            .iter()
            .position(|s| s.top <= doc_row && doc_row < s.top + s.height as u32)
    }
}

pub struct SessionView<'a> {
    pub editor: &'a SessionEditor,
    pub layout: &'a SessionLayout,
    pub offset: u32,
    pub focus: Option<CardField>,
    pub field: Option<&'a EditableField>,
    pub theme: &'a Theme,
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        buf.set_style(area, Style::default().bg(colors.bg()));

        if self.editor.is_empty() {
            let message = if self.editor.is_editable() {
                "No exercises. Press [a] to add one."
            } else {
                "Rest Day"
            };
            let lines = vec![
                Line::from(""),
                Line::styled(message, Style::default().fg(colors.muted())),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let list = Rect {
            width: area.width.saturating_sub(1),
            ..area
        };
        let scroll = self.layout.list_scroll(self.offset);
        let expansion = self.editor.expansion();
        let reorder = self.editor.reorder_state();
        let control = reorder.card_control();

        for (i, slot) in self.layout.slots.iter().enumerate() {
            let slot_bottom = slot.top + slot.height as u32;
            if slot_bottom <= scroll || slot.top >= scroll + list.height as u32 {
                continue;
            }

            // Render off-screen then copy the visible rows, so partially
            // scrolled cards keep their borders where they belong.
            let card_area = Rect::new(0, 0, list.width, slot.height);
            let mut card_buf = Buffer::empty(card_area);
            let expanded = expansion.expanded() == Some(i);
            ExerciseCard {
                index: i,
                record: self.editor.exercise(i),
                fraction: expansion.body_fraction(i),
                expanded,
                enabled: self.editor.field_enabled(i),
                control,
                focus: if expanded { self.focus } else { None },
                field: if expanded { self.field } else { None },
                dragging: reorder.dragging() == Some(i),
                drop_target: reorder.dragging().is_some() && reorder.drop_target() == Some(i),
                theme: self.theme,
            }
            .render(card_area, &mut card_buf);

            for card_row in 0..slot.height {
                let doc_row = slot.top + card_row as u32;
                if doc_row < scroll || doc_row >= scroll + list.height as u32 {
                    continue;
                }
                let y = list.y + (doc_row - scroll) as u16;
                for x in 0..list.width {
                    if let (Some(src), Some(dst)) =
                        (card_buf.cell((x, card_row)), buf.cell_mut((list.x + x, y)))
                    {
                        *dst = src.clone();
                    }
                }
            }
        }

        let mut state = ScrollbarState::new(self.layout.max_offset() as usize)
            .position(self.offset as usize)
            .viewport_content_length(self.layout.viewport as usize);
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(colors.accent_dim()))
            .render(area, buf, &mut state);
    }
}
