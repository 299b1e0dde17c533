//! Horizontal swipe resolution.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved right-to-left; advances to the next slide.
    Next,
    /// Finger moved left-to-right; goes back to the previous slide.
    Prev,
}

/// Resolves a `start - end` displacement; at or below `threshold` is a tap,
/// as is a non-finite displacement.
pub fn resolve(start_x: f64, end_x: f64, threshold: f64) -> Option<SwipeDirection> {
    let delta = start_x - end_x;
    if !delta.is_finite() || delta.abs() <= threshold {
        return None;
    }
    if delta > 0.0 {
        Some(SwipeDirection::Next)
    } else {
        Some(SwipeDirection::Prev)
    }
}

/// Holds the start of the current touch only. A new touch-start replaces it
/// and touch-end always consumes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeTracker {
    start_x: Option<f64>,
}

impl SwipeTracker {
    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    pub fn finish(&mut self, x: f64, threshold: f64) -> Option<SwipeDirection> {
        let start_x = self.start_x.take()?;
        resolve(start_x, x, threshold)
    }

    pub fn in_progress(&self) -> bool {
        self.start_x.is_some()
    }
}
