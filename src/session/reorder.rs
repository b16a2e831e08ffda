/// A completed drag: move the element at `source` so it ends up at
/// `destination`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReorderIntent {
    pub source: usize,
    pub destination: usize,
}

impl ReorderIntent {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn is_valid(&self, len: usize) -> bool {
        self.source != self.destination && self.source < len && self.destination < len
    }
}

/// Per-card control shown next to the exercise name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardControl {
    Delete,
    DragHandle,
}

/// Remove the element at the intent's source and reinsert it at the
/// destination. Invalid intents leave the list untouched and return false.
pub fn apply<T>(items: &mut Vec<T>, intent: ReorderIntent) -> bool {
    if !intent.is_valid(items.len()) {
        return false;
    }
    let moved = items.remove(intent.source);
    items.insert(intent.destination, moved);
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DragState {
    source: usize,
    over: Option<usize>,
}

/// Tracks edit-order mode and a press-drag-release gesture over a drag handle.
#[derive(Debug, Default)]
pub struct ReorderController {
    edit_order: bool,
    drag: Option<DragState>,
}

impl ReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_edit_order(&self) -> bool {
        self.edit_order
    }

    pub fn toggle_edit_order(&mut self) {
        self.edit_order = !self.edit_order;
        self.drag = None;
    }

    pub fn card_control(&self) -> CardControl {
        if self.edit_order {
            CardControl::DragHandle
        } else {
            CardControl::Delete
        }
    }

    /// Press on a drag handle. Handles only exist in edit-order mode.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        if !self.edit_order {
            return false;
        }
        self.drag = Some(DragState {
            source: index,
            over: Some(index),
        });
        true
    }

    /// Pointer moved; `None` means it is not over any card.
    pub fn drag_over(&mut self, index: Option<usize>) {
        if let Some(drag) = self.drag.as_mut() {
            drag.over = index;
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        self.drag.map(|d| d.source)
    }

    pub fn drop_target(&self) -> Option<usize> {
        self.drag.and_then(|d| d.over)
    }

    /// Release. Yields an intent only when dropped on a different card.
    pub fn end_drag(&mut self) -> Option<ReorderIntent> {
        let drag = self.drag.take()?;
        let over = drag.over?;
        (over != drag.source).then(|| ReorderIntent::new(drag.source, over))
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}
