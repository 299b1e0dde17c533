use std::time::Duration;

use serde::Deserialize;
use shared::domain::SlideId;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    presentation::Presentation,
    scheduler::{Scheduler, TimerHandle},
    swipe::{SwipeDirection, SwipeTracker},
};

pub const DEFAULT_AUTOPLAY_DELAY: Duration = Duration::from_millis(5000);
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardScope {
    /// Arrow keys navigate wherever focus is on the page.
    #[default]
    Global,
    /// Arrow keys navigate only while the carousel region has focus.
    FocusedOnly,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub autoplay: bool,
    pub autoplay_delay_ms: u64,
    pub swipe_threshold_px: f64,
    pub keyboard_scope: KeyboardScope,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            autoplay_delay_ms: DEFAULT_AUTOPLAY_DELAY.as_millis() as u64,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            keyboard_scope: KeyboardScope::Global,
        }
    }
}

impl CarouselConfig {
    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselInput {
    Prev,
    Next,
    Indicator(usize),
    Key(Key),
    PointerEnter,
    PointerLeave,
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
    FocusGained,
    FocusLost,
    Timer(TimerHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    #[error("carousel has {slides} slides but {indicators} indicators")]
    IndicatorCountMismatch { slides: usize, indicators: usize },
    #[error("autoplay delay must be greater than zero")]
    InvalidAutoplayDelay,
}

pub struct SlideshowController<S: Scheduler, P: Presentation> {
    slides: Vec<SlideId>,
    indicators: usize,
    active: usize,
    autoplay: Option<TimerHandle>,
    swipe: SwipeTracker,
    focused: bool,
    shut_down: bool,
    config: CarouselConfig,
    scheduler: S,
    presentation: P,
}

impl<S: Scheduler, P: Presentation> SlideshowController<S, P> {
    /// Builds the controller, activates slide 0 and starts autoplay when
    /// enabled. `indicators` must equal the slide count, or be 0 for markup
    /// without an indicator strip, and the autoplay delay must be non-zero
    /// even when autoplay starts disabled. An empty slide set yields an inert
    /// controller.
    pub fn new(
        slides: Vec<SlideId>,
        indicators: usize,
        scheduler: S,
        presentation: P,
        config: CarouselConfig,
    ) -> Result<Self, CarouselError> {
        if indicators != 0 && indicators != slides.len() {
            return Err(CarouselError::IndicatorCountMismatch {
                slides: slides.len(),
                indicators,
            });
        }
        if config.autoplay_delay_ms == 0 {
            return Err(CarouselError::InvalidAutoplayDelay);
        }

        let mut controller = Self {
            slides,
            indicators,
            active: 0,
            autoplay: None,
            swipe: SwipeTracker::default(),
            focused: false,
            shut_down: false,
            config,
            scheduler,
            presentation,
        };

        if controller.is_inert() {
            info!("carousel has no slides; controller is inert");
            return Ok(controller);
        }

        controller.activate(0);
        if controller.config.autoplay {
            controller.start_autoplay();
        }
        info!(
            slides = controller.slides.len(),
            autoplay = controller.is_autoplaying(),
            "carousel ready"
        );
        Ok(controller)
    }

    fn is_inert(&self) -> bool {
        self.slides.is_empty() || self.shut_down
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_slide(&self) -> Option<&SlideId> {
        self.slides.get(self.active)
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn autoplay_timer(&self) -> Option<TimerHandle> {
        self.autoplay
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn activate(&mut self, index: usize) {
        self.presentation.set_slide_active(index, true);
        if index < self.indicators {
            self.presentation.set_indicator_active(index, true);
        }
    }

    fn deactivate(&mut self, index: usize) {
        self.presentation.set_slide_active(index, false);
        if index < self.indicators {
            self.presentation.set_indicator_active(index, false);
        }
    }

    pub fn go_to(&mut self, index: usize) -> Option<Transition> {
        if self.is_inert() {
            return None;
        }
        if index >= self.slides.len() {
            warn!(
                index,
                slides = self.slides.len(),
                "ignoring out-of-range slide index"
            );
            return None;
        }

        let from = self.active;
        self.deactivate(from);
        self.active = index;
        self.activate(index);
        debug!(from, to = index, "slide transition");
        Some(Transition { from, to: index })
    }

    pub fn next(&mut self) -> Option<Transition> {
        if self.is_inert() {
            return None;
        }
        self.go_to((self.active + 1) % self.slides.len())
    }

    pub fn prev(&mut self) -> Option<Transition> {
        if self.is_inert() {
            return None;
        }
        let len = self.slides.len();
        self.go_to((self.active + len - 1) % len)
    }

    pub fn start_autoplay(&mut self) {
        if self.is_inert() {
            return;
        }
        self.stop_autoplay();
        let handle = self.scheduler.schedule_repeating(self.config.autoplay_delay());
        self.autoplay = Some(handle);
        debug!(timer = handle.0, "autoplay started");
    }

    pub fn stop_autoplay(&mut self) {
        if let Some(handle) = self.autoplay.take() {
            self.scheduler.cancel(handle);
            debug!(timer = handle.0, "autoplay stopped");
        }
    }

    /// Cancels autoplay for good; every later input is ignored.
    pub fn shutdown(&mut self) {
        self.stop_autoplay();
        self.shut_down = true;
        info!("carousel shut down");
    }

    /// Single dispatch point for every input source.
    pub fn handle(&mut self, input: CarouselInput) -> Option<Transition> {
        if self.is_inert() {
            return None;
        }

        match input {
            CarouselInput::Prev => self.prev(),
            CarouselInput::Next => self.next(),
            CarouselInput::Indicator(index) => self.go_to(index),
            CarouselInput::Key(key) => self.handle_key(key),
            CarouselInput::PointerEnter => {
                self.stop_autoplay();
                None
            }
            CarouselInput::PointerLeave => {
                self.start_autoplay();
                None
            }
            CarouselInput::TouchStart { x } => {
                self.swipe.start(x);
                None
            }
            CarouselInput::TouchEnd { x } => {
                match self.swipe.finish(x, self.config.swipe_threshold_px)? {
                    SwipeDirection::Next => self.next(),
                    SwipeDirection::Prev => self.prev(),
                }
            }
            CarouselInput::FocusGained => {
                self.focused = true;
                None
            }
            CarouselInput::FocusLost => {
                self.focused = false;
                None
            }
            CarouselInput::Timer(handle) => self.handle_timer(handle),
        }
    }

    fn handle_key(&mut self, key: Key) -> Option<Transition> {
        if self.config.keyboard_scope == KeyboardScope::FocusedOnly && !self.focused {
            return None;
        }
        match key {
            Key::ArrowLeft => self.prev(),
            Key::ArrowRight => self.next(),
            Key::Other => None,
        }
    }

    fn handle_timer(&mut self, handle: TimerHandle) -> Option<Transition> {
        if self.autoplay != Some(handle) {
            debug!(timer = handle.0, "ignoring stale autoplay tick");
            return None;
        }
        self.next()
    }

    /// True when `handle` is this controller's live autoplay timer.
    pub fn owns_timer(&self, handle: TimerHandle) -> bool {
        self.autoplay == Some(handle)
    }
}

impl<S: Scheduler, P: Presentation> Drop for SlideshowController<S, P> {
    fn drop(&mut self) {
        self.stop_autoplay();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
