//! Hero carousel interaction state machine.
//!
//! [`SlideshowController`] reconciles timer ticks, prev/next controls,
//! indicator clicks, arrow keys and touch swipes into a single active slide
//! index. Presentation is driven one-way through [`Presentation`]; timers are
//! requested through a [`Scheduler`] and come back as ordered inputs.

mod controller;
pub mod presentation;
pub mod scheduler;
pub mod swipe;

pub use controller::{
    CarouselConfig, CarouselError, CarouselInput, Key, KeyboardScope, SlideshowController,
    Transition, DEFAULT_AUTOPLAY_DELAY, DEFAULT_SWIPE_THRESHOLD_PX,
};
pub use presentation::{Presentation, PresentationChange, RecordingPresentation};
pub use scheduler::{Scheduler, TimerHandle, TokioScheduler, VirtualScheduler, MIN_PERIOD};
pub use swipe::{SwipeDirection, SwipeTracker};
