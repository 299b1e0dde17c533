use std::{fs, io, path::Path};

use anyhow::Context;
use navigation::NavItem;
use serde::Deserialize;
use site_client::{calendar::DEFAULT_MAX_RESULTS, CheckoutSettings, TickerConfig};
use slideshow::CarouselConfig;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "site.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub newsletter_script_url: Option<String>,
    pub events_api_url: Option<String>,
    pub viewport_width: u32,
    pub calendar: CalendarSettings,
    pub news: TickerConfig,
    pub checkout: CheckoutSettings,
    pub carousel: CarouselConfig,
    pub nav: Vec<NavItem>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            newsletter_script_url: None,
            events_api_url: None,
            viewport_width: 1280,
            calendar: CalendarSettings::default(),
            news: TickerConfig::default(),
            checkout: CheckoutSettings::default(),
            carousel: CarouselConfig::default(),
            nav: default_nav(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub calendar_id: String,
    pub api_key: Option<String>,
    pub timezone: String,
    pub max_results: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_id: String::new(),
            api_key: None,
            timezone: "America/New_York".into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

fn default_nav() -> Vec<NavItem> {
    vec![
        NavItem::link("Home", "/"),
        NavItem::dropdown("About", "/about/"),
        NavItem::dropdown("Events", "/events/"),
        NavItem::dropdown("Support", "/support/"),
        NavItem::link("Contact", "/contact/"),
    ]
}

/// Reads `path` when present, then layers `APP__*` environment overrides on top.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__NEWSLETTER_SCRIPT_URL") {
        settings.newsletter_script_url = Some(v);
    }
    if let Some(v) = var("APP__EVENTS_API_URL") {
        settings.events_api_url = Some(v);
    }

    if let Some(v) = var("APP__CALENDAR_ID") {
        settings.calendar.calendar_id = v;
    }
    if let Some(v) = var("GOOGLE_API_KEY") {
        settings.calendar.api_key = Some(v);
    }
    if let Some(v) = var("APP__CALENDAR_API_KEY") {
        settings.calendar.api_key = Some(v);
    }

    if let Some(v) = var("APP__SITE_ORIGIN") {
        settings.checkout.origin = v;
    }
    if let Some(v) = var("STRIPE_PUBLISHABLE_KEY") {
        settings.checkout.publishable_key = Some(v);
    }
    if let Some(v) = var("APP__STRIPE_PUBLISHABLE_KEY") {
        settings.checkout.publishable_key = Some(v);
    }

    if let Some(v) = var("APP__CAROUSEL_AUTOPLAY_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.carousel.autoplay_delay_ms = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__CAROUSEL_AUTOPLAY_DELAY_MS"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
