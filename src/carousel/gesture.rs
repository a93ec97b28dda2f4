//! Swipe and drag detection for the image viewer.

/// Minimum horizontal travel for a touch swipe.
pub const TOUCH_SWIPE_THRESHOLD: f64 = 30.0;

/// Minimum horizontal travel for a mouse drag. Larger than the touch
/// threshold since small pointer drags are usually clicks.
pub const POINTER_SWIPE_THRESHOLD: f64 = 50.0;

/// Input modality that produced a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Touch,
    Pointer,
}

impl InputKind {
    pub fn threshold(&self) -> f64 {
        match self {
            InputKind::Touch => TOUCH_SWIPE_THRESHOLD,
            InputKind::Pointer => POINTER_SWIPE_THRESHOLD,
        }
    }
}

/// Where a gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub start_x: f64,
    pub start_y: f64,
    pub kind: InputKind,
}

/// Result of classifying a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Moved right-to-left: advance
    Advance,
    /// Moved left-to-right: go back
    Retreat,
}

/// Tracks at most one in-progress gesture.
#[derive(Debug, Default)]
pub struct GestureTracker {
    sample: Option<GestureSample>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gesture start, replacing any unfinished one.
    pub fn start(&mut self, x: f64, y: f64, kind: InputKind) {
        self.sample = Some(GestureSample {
            start_x: x,
            start_y: y,
            kind,
        });
    }

    /// Finish the current gesture. The sample is consumed whether or not it
    /// qualifies as a swipe.
    pub fn finish(&mut self, x: f64, y: f64) -> Option<Swipe> {
        let sample = self.sample.take()?;
        classify(sample.start_x - x, sample.start_y - y, sample.kind)
    }

    pub fn is_active(&self) -> bool {
        self.sample.is_some()
    }

    pub fn sample(&self) -> Option<&GestureSample> {
        self.sample.as_ref()
    }
}

/// Classify a displacement (start minus end) as a horizontal swipe.
pub fn classify(delta_x: f64, delta_y: f64, kind: InputKind) -> Option<Swipe> {
    if delta_x.abs() > delta_y.abs() && delta_x.abs() > kind.threshold() {
        if delta_x > 0.0 {
            Some(Swipe::Advance)
        } else {
            Some(Swipe::Retreat)
        }
    } else {
        None
    }
}
