//! Page host: owns the carousel and nav controllers and feeds them from a
//! single ordered event queue. Timer firings land in the same queue as user
//! input, so every handler runs to completion before the next one starts.

use navigation::{NavInput, NavItem, NavMenu, Propagation};
use shared::domain::SlideId;
use slideshow::{
    CarouselConfig, CarouselError, CarouselInput, Presentation, SlideshowController, TimerHandle,
    TokioScheduler, Transition,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Most recent transitions kept by [`Page::transitions`].
pub const TRANSITION_LOG_CAP: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    Carousel(CarouselInput),
    Nav(NavInput),
    Timer(TimerHandle),
    /// Page is being torn down; stops the loop after shutting controllers down.
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Transition(Transition),
    Nav(Propagation),
    Idle,
    Unloaded,
}

pub struct PageLayout {
    pub slides: Vec<SlideId>,
    pub indicators: usize,
    pub nav: Vec<NavItem>,
    pub viewport_width: u32,
}

pub struct Page<P: Presentation> {
    carousel: SlideshowController<TokioScheduler<PageEvent>, P>,
    nav: NavMenu<TokioScheduler<PageEvent>>,
    transitions: Vec<Transition>,
    transition_count: u64,
}

impl<P: Presentation> Page<P> {
    /// Must be called from within a tokio runtime; autoplay starts immediately.
    pub fn new(
        layout: PageLayout,
        presentation: P,
        config: CarouselConfig,
        queue: mpsc::UnboundedSender<PageEvent>,
    ) -> Result<Self, CarouselError> {
        let scheduler = TokioScheduler::with_sink(queue, PageEvent::Timer);
        let nav = NavMenu::new(layout.nav, layout.viewport_width, scheduler.clone());
        let carousel = SlideshowController::new(
            layout.slides,
            layout.indicators,
            scheduler,
            presentation,
            config,
        )?;

        Ok(Self {
            carousel,
            nav,
            transitions: Vec::new(),
            transition_count: 0,
        })
    }

    pub fn carousel(&self) -> &SlideshowController<TokioScheduler<PageEvent>, P> {
        &self.carousel
    }

    pub fn nav(&self) -> &NavMenu<TokioScheduler<PageEvent>> {
        &self.nav
    }

    /// The most recent slide changes, oldest first. Older entries are
    /// dropped once the log reaches [`TRANSITION_LOG_CAP`].
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn dispatch(&mut self, event: PageEvent) -> Outcome {
        match event {
            PageEvent::Carousel(input) => self.carousel_input(input),
            PageEvent::Nav(input) => Outcome::Nav(self.nav.handle(input)),
            PageEvent::Timer(handle) if self.carousel.owns_timer(handle) => {
                self.carousel_input(CarouselInput::Timer(handle))
            }
            PageEvent::Timer(handle) if self.nav.owns_timer(handle) => {
                Outcome::Nav(self.nav.handle(NavInput::Timer(handle)))
            }
            PageEvent::Timer(handle) => {
                debug!(timer = handle.0, "dropping tick for cancelled timer");
                Outcome::Idle
            }
            PageEvent::Unload => {
                self.carousel.shutdown();
                Outcome::Unloaded
            }
        }
    }

    fn carousel_input(&mut self, input: CarouselInput) -> Outcome {
        match self.carousel.handle(input) {
            Some(transition) => {
                if self.transitions.len() == TRANSITION_LOG_CAP {
                    self.transitions.drain(..TRANSITION_LOG_CAP / 2);
                }
                self.transitions.push(transition);
                self.transition_count += 1;
                Outcome::Transition(transition)
            }
            None => Outcome::Idle,
        }
    }

    /// Drains `events` until a [`PageEvent::Unload`] is dispatched.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<PageEvent>) {
        while let Some(event) = events.recv().await {
            if self.dispatch(event) == Outcome::Unloaded {
                break;
            }
        }
        info!(transitions = self.transition_count, "page loop finished");
    }
}

/// Presentation that reports class changes through tracing.
#[derive(Debug, Default)]
pub struct LogPresentation;

impl Presentation for LogPresentation {
    fn set_slide_active(&mut self, index: usize, active: bool) {
        if active {
            info!(slide = index, "slide shown");
        }
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        debug!(indicator = index, active, "indicator updated");
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
