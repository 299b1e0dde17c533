//! Responsive main navigation: mobile menu toggle plus dropdown submenus.
//!
//! Above the breakpoint dropdowns open on hover (pure CSS) and parent links
//! are followed normally. At or below it, a click on a dropdown parent opens
//! its submenu instead, with at most one submenu open at a time.

use std::time::Duration;

use serde::Deserialize;
use slideshow::{Scheduler, TimerHandle};
use tracing::debug;

pub const MOBILE_BREAKPOINT_PX: u32 = 768;
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub has_dropdown: bool,
}

impl NavItem {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            has_dropdown: false,
        }
    }

    pub fn dropdown(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            has_dropdown: true,
            ..Self::link(label, href)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    /// The hamburger button.
    ToggleMenu,
    /// Any top-level link, dropdown parent or not.
    LinkClicked(usize),
    /// A click anywhere outside the nav and the toggle button.
    ClickOutside,
    Resized { width: u32 },
    Timer(TimerHandle),
}

/// Whether the browser should still follow the clicked link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Follow,
    PreventDefault,
}

pub struct NavMenu<S: Scheduler> {
    items: Vec<NavItem>,
    menu_open: bool,
    open_dropdown: Option<usize>,
    viewport_width: u32,
    pending_resize: Option<TimerHandle>,
    scheduler: S,
}

impl<S: Scheduler> NavMenu<S> {
    pub fn new(items: Vec<NavItem>, viewport_width: u32, scheduler: S) -> Self {
        Self {
            items,
            menu_open: false,
            open_dropdown: None,
            viewport_width,
            pending_resize: None,
            scheduler,
        }
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport_width <= MOBILE_BREAKPOINT_PX
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn open_dropdown(&self) -> Option<usize> {
        self.open_dropdown
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn owns_timer(&self, handle: TimerHandle) -> bool {
        self.pending_resize == Some(handle)
    }

    pub fn handle(&mut self, input: NavInput) -> Propagation {
        match input {
            NavInput::ToggleMenu => {
                self.menu_open = !self.menu_open;
                self.open_dropdown = None;
                debug!(open = self.menu_open, "mobile menu toggled");
                Propagation::Follow
            }
            NavInput::LinkClicked(index) => self.link_clicked(index),
            NavInput::ClickOutside => {
                self.menu_open = false;
                self.open_dropdown = None;
                Propagation::Follow
            }
            NavInput::Resized { width } => {
                self.viewport_width = width;
                if let Some(pending) = self.pending_resize.take() {
                    self.scheduler.cancel(pending);
                }
                self.pending_resize = Some(self.scheduler.schedule_once(RESIZE_DEBOUNCE));
                Propagation::Follow
            }
            NavInput::Timer(handle) => {
                if self.pending_resize == Some(handle) {
                    self.pending_resize = None;
                    if !self.is_mobile() {
                        self.open_dropdown = None;
                        debug!(width = self.viewport_width, "desktop width; dropdowns closed");
                    }
                }
                Propagation::Follow
            }
        }
    }

    fn link_clicked(&mut self, index: usize) -> Propagation {
        let Some(item) = self.items.get(index) else {
            return Propagation::Follow;
        };

        if item.has_dropdown && self.is_mobile() {
            self.open_dropdown = if self.open_dropdown == Some(index) {
                None
            } else {
                Some(index)
            };
            debug!(item = index, open = self.open_dropdown.is_some(), "dropdown toggled");
            return Propagation::PreventDefault;
        }

        self.menu_open = false;
        Propagation::Follow
    }
}

impl<S: Scheduler> Drop for NavMenu<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_resize.take() {
            self.scheduler.cancel(pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use slideshow::VirtualScheduler;

    use super::*;

    fn items() -> Vec<NavItem> {
        vec![
            NavItem::link("Home", "/"),
            NavItem::dropdown("About", "/about/"),
            NavItem::dropdown("Programs", "/programs/"),
            NavItem::link("Visit", "/visit/"),
        ]
    }

    fn menu(width: u32) -> (NavMenu<VirtualScheduler>, VirtualScheduler) {
        let scheduler = VirtualScheduler::new();
        (NavMenu::new(items(), width, scheduler.clone()), scheduler)
    }

    fn settle(menu: &mut NavMenu<VirtualScheduler>, scheduler: &VirtualScheduler, by: Duration) {
        for handle in scheduler.advance(by) {
            menu.handle(NavInput::Timer(handle));
        }
    }

    #[test]
    fn mobile_dropdown_parent_toggles_and_prevents_navigation() {
        let (mut menu, _scheduler) = menu(400);

        assert_eq!(menu.handle(NavInput::LinkClicked(1)), Propagation::PreventDefault);
        assert_eq!(menu.open_dropdown(), Some(1));
        assert_eq!(menu.handle(NavInput::LinkClicked(1)), Propagation::PreventDefault);
        assert_eq!(menu.open_dropdown(), None);
    }

    #[test]
    fn opening_one_dropdown_closes_the_other() {
        let (mut menu, _scheduler) = menu(768);

        menu.handle(NavInput::LinkClicked(1));
        menu.handle(NavInput::LinkClicked(2));
        assert_eq!(menu.open_dropdown(), Some(2));
    }

    #[test]
    fn desktop_dropdown_parent_is_followed() {
        let (mut menu, _scheduler) = menu(1280);

        assert_eq!(menu.handle(NavInput::LinkClicked(1)), Propagation::Follow);
        assert_eq!(menu.open_dropdown(), None);
    }

    #[test]
    fn regular_link_closes_mobile_menu() {
        let (mut menu, _scheduler) = menu(400);
        menu.handle(NavInput::ToggleMenu);
        assert!(menu.is_menu_open());

        menu.handle(NavInput::LinkClicked(1));
        assert!(menu.is_menu_open(), "dropdown parent keeps the menu open");

        assert_eq!(menu.handle(NavInput::LinkClicked(3)), Propagation::Follow);
        assert!(!menu.is_menu_open());
    }

    #[test]
    fn click_outside_closes_everything() {
        let (mut menu, _scheduler) = menu(400);
        menu.handle(NavInput::ToggleMenu);
        menu.handle(NavInput::LinkClicked(2));

        menu.handle(NavInput::ClickOutside);
        assert!(!menu.is_menu_open());
        assert_eq!(menu.open_dropdown(), None);
    }

    #[test]
    fn resize_to_desktop_closes_dropdowns_after_debounce() {
        let (mut menu, scheduler) = menu(400);
        menu.handle(NavInput::LinkClicked(1));

        menu.handle(NavInput::Resized { width: 900 });
        settle(&mut menu, &scheduler, Duration::from_millis(200));
        menu.handle(NavInput::Resized { width: 1024 });
        settle(&mut menu, &scheduler, Duration::from_millis(200));
        assert_eq!(menu.open_dropdown(), Some(1), "debounce restarted");

        settle(&mut menu, &scheduler, Duration::from_millis(50));
        assert_eq!(menu.open_dropdown(), None);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn resize_within_mobile_keeps_dropdown_open() {
        let (mut menu, scheduler) = menu(400);
        menu.handle(NavInput::LinkClicked(2));

        menu.handle(NavInput::Resized { width: 600 });
        settle(&mut menu, &scheduler, RESIZE_DEBOUNCE);
        assert_eq!(menu.open_dropdown(), Some(2));
    }

    #[test]
    fn nav_items_deserialize_from_config() {
        let items: Vec<NavItem> = serde_json::from_str(
            r#"[{"label":"About","href":"/about/","has_dropdown":true},{"label":"Visit","href":"/visit/"}]"#,
        )
        .expect("items");

        assert_eq!(items, vec![NavItem::dropdown("About", "/about/"), NavItem::link("Visit", "/visit/")]);
    }
}
