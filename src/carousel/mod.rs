//! Gallery carousel controller.
//!
//! Owns which photo is open in the full-screen viewer, runs the timed slide
//! transition between photos, turns drags into navigation and asks a
//! [`Preloader`] to warm the neighbours of the photo on screen.
//!
//! Navigation is single-flight: while a transition is animating, further
//! navigation requests are dropped. The visible image only changes when the
//! deferred commit fires from [`CarouselController::tick`].

pub mod gesture;
pub mod schedule;

use std::time::{Duration, Instant};

use crate::assets::ImageItem;
use gesture::{GestureTracker, InputKind, Swipe};
use schedule::{DeferredQueue, TaskToken};

/// Default length of the slide transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Direction the outgoing frame slides while a transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    #[default]
    None,
    Left,
    Right,
}

/// Navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

impl NavDirection {
    /// Moving to the next photo slides content toward the left.
    pub fn slide(&self) -> SlideDirection {
        match self {
            NavDirection::Next => SlideDirection::Left,
            NavDirection::Previous => SlideDirection::Right,
        }
    }
}

/// Observable viewer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselState {
    /// Open photo, `None` when the viewer is closed
    pub selected_index: Option<usize>,
    pub slide_direction: SlideDirection,
    pub is_animating: bool,
}

/// Best-effort background fetch of photos likely to be shown next.
pub trait Preloader {
    fn preload(&mut self, item: &ImageItem);
}

/// Full-screen viewer state machine
pub struct CarouselController<P: Preloader> {
    items: Vec<ImageItem>,
    state: CarouselState,
    transition: Duration,
    commits: DeferredQueue<usize>,
    pending: Option<TaskToken>,
    animation_started: Option<Instant>,
    gestures: GestureTracker,
    preloader: P,
}

impl<P: Preloader> CarouselController<P> {
    pub fn new(items: Vec<ImageItem>, transition: Duration, preloader: P) -> Self {
        Self {
            items,
            state: CarouselState::default(),
            transition,
            commits: DeferredQueue::new(),
            pending: None,
            animation_started: None,
            gestures: GestureTracker::new(),
            preloader,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.state.selected_index.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected_index
    }

    /// Previous/next controls are only offered with more than one photo.
    pub fn has_neighbors(&self) -> bool {
        self.items.len() > 1
    }

    pub fn preloader(&self) -> &P {
        &self.preloader
    }

    pub fn preloader_mut(&mut self) -> &mut P {
        &mut self.preloader
    }

    /// Open the viewer at `index`. Jumps directly, without animation, even
    /// when the viewer is already showing another photo.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn open(&mut self, index: usize) {
        assert!(
            index < self.items.len(),
            "carousel index {} out of range for {} images",
            index,
            self.items.len()
        );
        self.cancel_pending();
        let changed = self.state.selected_index != Some(index);
        self.state = CarouselState {
            selected_index: Some(index),
            slide_direction: SlideDirection::None,
            is_animating: false,
        };
        tracing::debug!(index, "Carousel opened");
        if changed {
            self.preload_neighbors(index);
        }
    }

    /// Close the viewer, cancelling any transition still waiting to commit.
    pub fn close(&mut self) {
        if self.cancel_pending() {
            tracing::debug!("Pending carousel commit cancelled on close");
        }
        self.state = CarouselState::default();
    }

    /// Request a move to the previous or next photo.
    ///
    /// Returns false when the request was dropped: viewer closed, a single
    /// photo, or a transition still in flight.
    pub fn navigate(&mut self, direction: NavDirection, now: Instant) -> bool {
        let Some(current) = self.state.selected_index else {
            return false;
        };
        if !self.has_neighbors() || self.state.is_animating {
            return false;
        }

        let len = self.items.len();
        let target = match direction {
            NavDirection::Next => (current + 1) % len,
            NavDirection::Previous => (current + len - 1) % len,
        };

        self.state.is_animating = true;
        self.state.slide_direction = direction.slide();
        self.animation_started = Some(now);
        self.pending = Some(self.commits.schedule(now + self.transition, target));
        true
    }

    /// Fire the deferred commit if its delay has elapsed. Returns true when
    /// the open photo changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(target) = self.commits.take_due(now).pop() else {
            return false;
        };
        self.pending = None;
        self.animation_started = None;

        let changed = self.state.selected_index != Some(target);
        self.state = CarouselState {
            selected_index: Some(target),
            slide_direction: SlideDirection::None,
            is_animating: false,
        };
        if changed {
            self.preload_neighbors(target);
        }
        changed
    }

    /// Record the start of a drag or swipe.
    pub fn on_gesture_start(&mut self, x: f64, y: f64, kind: InputKind) {
        self.gestures.start(x, y, kind);
    }

    /// Finish a drag or swipe, navigating when it was a horizontal swipe.
    /// Returns true if a navigation was accepted.
    pub fn on_gesture_end(&mut self, x: f64, y: f64, now: Instant) -> bool {
        match self.gestures.finish(x, y) {
            Some(Swipe::Advance) => self.navigate(NavDirection::Next, now),
            Some(Swipe::Retreat) => self.navigate(NavDirection::Previous, now),
            None => false,
        }
    }

    pub fn gesture_in_progress(&self) -> bool {
        self.gestures.is_active()
    }

    /// Ask the preloader for both neighbours of `index`.
    pub fn preload_neighbors(&mut self, index: usize) {
        let len = self.items.len();
        if len <= 1 {
            return;
        }
        let next = (index + 1) % len;
        let prev = (index + len - 1) % len;
        self.preloader.preload(&self.items[next]);
        if prev != next {
            self.preloader.preload(&self.items[prev]);
        }
    }

    pub fn selected_item(&self) -> Option<&ImageItem> {
        self.state.selected_index.map(|i| &self.items[i])
    }

    pub fn previous_item(&self) -> Option<&ImageItem> {
        let i = self.state.selected_index?;
        let len = self.items.len();
        Some(&self.items[(i + len - 1) % len])
    }

    pub fn next_item(&self) -> Option<&ImageItem> {
        let i = self.state.selected_index?;
        Some(&self.items[(i + 1) % self.items.len()])
    }

    /// How far the outgoing frame has slid, from 0.0 to 1.0.
    pub fn transition_progress(&self, now: Instant) -> f32 {
        match self.animation_started {
            Some(started) if self.state.is_animating => {
                if self.transition.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(started);
                (elapsed.as_secs_f32() / self.transition.as_secs_f32()).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// "3 / 17" style indicator for the open photo
    pub fn position_label(&self) -> Option<String> {
        self.state
            .selected_index
            .map(|i| format!("{} / {}", i + 1, self.items.len()))
    }

    /// Deadline of the pending commit, so the UI loop can poll faster.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.commits.next_due()
    }

    fn cancel_pending(&mut self) -> bool {
        self.animation_started = None;
        match self.pending.take() {
            Some(token) => self.commits.cancel(token),
            None => false,
        }
    }
}
