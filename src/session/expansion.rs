use std::time::Duration;

pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(500);
/// Rows kept between a revealed card and the viewport edge it crossed.
pub const DEFAULT_SCROLL_MARGIN: u32 = 2;

/// Generation token for one expansion animation. Completing a ticket that is
/// no longer current has no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationTicket(u64);

/// A switch from one card to another first collapses the previous card, then
/// expands the new one. Each half lasts half the configured duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collapsing { target: usize, next: usize },
    Expanding { target: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Absolute offset from the document top.
    To(u32),
    /// Relative adjustment; negative scrolls up.
    By(i32),
    ToBottom,
}

/// Card position relative to the viewport top, in rows. `bottom` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardBounds {
    pub top: i32,
    pub bottom: i32,
}

/// The live scroll state the expansion logic reads from. The rendering layer
/// implements this over whatever it draws into.
pub trait ScrollSurface {
    fn scroll_offset(&self) -> u32;
    fn total_height(&self) -> u32;
    fn viewport_height(&self) -> u32;
    fn card_bounds(&self, index: usize) -> Option<CardBounds>;
}

/// Scroll geometry measured once from the current layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    pub offset: u32,
    pub total: u32,
    pub viewport: u32,
    pub cards: Vec<CardBounds>,
}

impl ScrollSurface for SurfaceSnapshot {
    fn scroll_offset(&self) -> u32 {
        self.offset
    }

    fn total_height(&self) -> u32 {
        self.total
    }

    fn viewport_height(&self) -> u32 {
        self.viewport
    }

    fn card_bounds(&self, index: usize) -> Option<CardBounds> {
        self.cards.get(index).copied()
    }
}

/// Which of `section_count` equal bands of the scrollable range the viewport
/// is in. The scrollable range is `total_height - viewport_height`.
pub fn section_index_for(
    scroll_offset: u32,
    total_height: u32,
    viewport_height: u32,
    section_count: usize,
) -> usize {
    if section_count == 0 {
        return 0;
    }
    let range = total_height.saturating_sub(viewport_height) as u64;
    if range == 0 {
        return 0;
    }
    let index = (scroll_offset as u64 * section_count as u64) / range;
    (index as usize).min(section_count - 1)
}

/// First offset whose band is `index`. Inverse of [`section_index_for`].
pub fn band_start(index: usize, total_height: u32, viewport_height: u32, section_count: usize) -> u32 {
    if section_count == 0 {
        return 0;
    }
    let range = total_height.saturating_sub(viewport_height) as u64;
    let n = section_count as u64;
    ((index as u64 * range).div_ceil(n)) as u32
}

pub struct ExpansionController {
    expanded: Option<usize>,
    count: usize,
    phase: Phase,
    generation: u64,
    elapsed: Duration,
    duration: Duration,
    scroll_margin: u32,
}

impl ExpansionController {
    pub fn new(count: usize, duration: Duration, scroll_margin: u32) -> Self {
        Self {
            expanded: if count > 0 { Some(0) } else { None },
            count,
            phase: Phase::Idle,
            generation: 0,
            elapsed: Duration::ZERO,
            duration,
            scroll_margin,
        }
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn current_ticket(&self) -> Option<AnimationTicket> {
        self.is_animating().then_some(AnimationTicket(self.generation))
    }

    /// Progress through the current half of the transition, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        let half = self.half_duration();
        if half.is_zero() || !self.is_animating() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / half.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Visible fraction of a card's body, for rendering the accordion.
    pub fn body_fraction(&self, index: usize) -> f64 {
        match self.phase {
            Phase::Idle => {
                if self.expanded == Some(index) {
                    1.0
                } else {
                    0.0
                }
            }
            Phase::Collapsing { target, .. } if target == index => 1.0 - self.progress(),
            Phase::Expanding { target } if target == index => self.progress(),
            _ => 0.0,
        }
    }

    /// Direct selection of a card. Accepted even mid-animation: the running
    /// transition is cancelled and replaced.
    pub fn activate<S: ScrollSurface>(&mut self, index: usize, surface: &S) -> Vec<ScrollRequest> {
        if index >= self.count || self.expanded == Some(index) {
            return Vec::new();
        }
        let previous = self.expanded;
        self.expanded = Some(index);
        self.start_transition(index, previous);
        tracing::debug!(index, ?previous, "expanded by activation");

        let offset = band_start(
            index,
            surface.total_height(),
            surface.viewport_height(),
            self.count,
        );
        vec![ScrollRequest::To(offset)]
    }

    /// Infer the expanded card from the scroll position. Ignored while a
    /// transition is running.
    pub fn on_scroll<S: ScrollSurface>(&mut self, surface: &S) -> Vec<ScrollRequest> {
        if self.is_animating() || self.count == 0 {
            return Vec::new();
        }
        let candidate = section_index_for(
            surface.scroll_offset(),
            surface.total_height(),
            surface.viewport_height(),
            self.count,
        );
        if self.expanded == Some(candidate) {
            return Vec::new();
        }

        let mut requests = Vec::new();
        if candidate == self.count - 1 {
            requests.push(ScrollRequest::ToBottom);
        }
        if let Some(bounds) = surface.card_bounds(candidate) {
            let margin = self.scroll_margin as i32;
            let viewport = surface.viewport_height() as i32;
            if bounds.top < 0 {
                requests.push(ScrollRequest::By(bounds.top - margin));
            } else if bounds.bottom > viewport {
                requests.push(ScrollRequest::By(bounds.bottom - viewport + margin));
            }
        }

        let previous = self.expanded;
        self.expanded = Some(candidate);
        self.start_transition(candidate, previous);
        tracing::debug!(index = candidate, ?previous, "expanded by scroll");
        requests
    }

    /// Complete the transition identified by `ticket`. Returns false for a
    /// stale ticket.
    pub fn finish(&mut self, ticket: AnimationTicket) -> bool {
        if ticket.0 != self.generation || !self.is_animating() {
            return false;
        }
        self.phase = Phase::Idle;
        self.elapsed = Duration::ZERO;
        true
    }

    /// Advance the built-in timer. Returns true when the transition finished
    /// on this tick.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(ticket) = self.current_ticket() else {
            return false;
        };
        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed < self.half_duration() {
            return false;
        }
        match self.phase {
            Phase::Collapsing { next, .. } => {
                self.phase = Phase::Expanding { target: next };
                self.elapsed = Duration::ZERO;
                false
            }
            _ => self.finish(ticket),
        }
    }

    /// Stop all animation work. Any ticket issued before this is stale.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.elapsed = Duration::ZERO;
    }

    /// The list was rearranged or shrank. `locate` maps an index from before
    /// the change to the element's index now, or None when it was removed.
    ///
    /// The expanded card stays expanded wherever it went. If it was removed
    /// the first card takes over; an empty list has nothing expanded.
    pub fn relocate(&mut self, new_len: usize, locate: impl Fn(usize) -> Option<usize>) {
        self.count = new_len;
        let Some(current) = self.expanded else {
            return;
        };
        if new_len == 0 {
            self.expanded = None;
            self.teardown();
            return;
        }
        let Some(moved) = locate(current) else {
            self.expanded = Some(0);
            self.start_transition(0, None);
            return;
        };
        self.expanded = Some(moved);
        let phase = match self.phase {
            Phase::Idle => Some(Phase::Idle),
            Phase::Collapsing { target, next } => locate(target)
                .zip(locate(next))
                .map(|(target, next)| Phase::Collapsing { target, next }),
            Phase::Expanding { target } => locate(target).map(|target| Phase::Expanding { target }),
        };
        match phase {
            Some(phase) => self.phase = phase,
            None => self.teardown(),
        }
    }

    /// A card was appended. The first card of an empty list becomes expanded.
    pub fn on_appended(&mut self, new_len: usize) {
        self.count = new_len;
        if self.expanded.is_none() && new_len > 0 {
            self.expanded = Some(0);
            self.start_transition(0, None);
        }
    }

    fn start_transition(&mut self, target: usize, previous: Option<usize>) {
        self.generation += 1;
        self.elapsed = Duration::ZERO;
        self.phase = match previous {
            Some(prev) if prev != target && prev < self.count => Phase::Collapsing {
                target: prev,
                next: target,
            },
            _ => Phase::Expanding { target },
        };
    }

    fn half_duration(&self) -> Duration {
        self.duration / 2
    }
}
