//! One-way presentation adapter.
//!
//! The controller pushes class changes through [`Presentation`]; it never
//! reads presentation state back.

pub trait Presentation {
    fn set_slide_active(&mut self, index: usize, active: bool);
    fn set_indicator_active(&mut self, index: usize, active: bool);
}

impl<P: Presentation + ?Sized> Presentation for &mut P {
    fn set_slide_active(&mut self, index: usize, active: bool) {
        (**self).set_slide_active(index, active);
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        (**self).set_indicator_active(index, active);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationChange {
    Slide { index: usize, active: bool },
    Indicator { index: usize, active: bool },
}

/// Keeps the `active` class state of every slide and indicator.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    slides: Vec<bool>,
    indicators: Vec<bool>,
    changes: Vec<PresentationChange>,
}

impl RecordingPresentation {
    pub fn new(slides: usize, indicators: usize) -> Self {
        Self {
            slides: vec![false; slides],
            indicators: vec![false; indicators],
            changes: Vec::new(),
        }
    }

    pub fn active_slides(&self) -> Vec<usize> {
        active_positions(&self.slides)
    }

    pub fn active_indicators(&self) -> Vec<usize> {
        active_positions(&self.indicators)
    }

    pub fn changes(&self) -> &[PresentationChange] {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Vec<PresentationChange> {
        std::mem::take(&mut self.changes)
    }
}

fn active_positions(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(index, active)| active.then_some(index))
        .collect()
}

impl Presentation for RecordingPresentation {
    fn set_slide_active(&mut self, index: usize, active: bool) {
        if let Some(flag) = self.slides.get_mut(index) {
            *flag = active;
        }
        self.changes.push(PresentationChange::Slide { index, active });
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        if let Some(flag) = self.indicators.get_mut(index) {
            *flag = active;
        }
        self.changes
            .push(PresentationChange::Indicator { index, active });
    }
}
