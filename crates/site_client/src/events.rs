use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use shared::{domain::EventId, protocol::EventRecord};
use tracing::{debug, warn};

use crate::{configured, error::SiteClientError};

const SERVICE: &str = "events";
pub const HOMEPAGE_EVENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// First few upcoming events on the homepage.
    Homepage,
    /// Every event, on the events page.
    All,
}

impl Listing {
    fn empty_message(self) -> &'static str {
        match self {
            Listing::Homepage => "No upcoming events at this time. Check back soon!",
            Listing::All => "No upcoming events scheduled.",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Listing::Homepage => {
                "Unable to load events at this time. View our events page (/events/) for more information."
            }
            Listing::All => "Unable to load events. Please try again later.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    Register { href: String },
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventCard {
    pub id: EventId,
    pub name: String,
    pub date_label: String,
    pub time: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub image: Option<String>,
    pub price_label: String,
    pub spots_label: Option<String>,
    pub category: Option<String>,
    pub action: CardAction,
}

impl EventCard {
    pub fn anchor(&self) -> String {
        format!("event-{}", self.id)
    }

    /// "Sat, Mar 1, 2025 • 10:00 AM", or just the date.
    pub fn when(&self) -> String {
        match &self.time {
            Some(time) => format!("{} • {time}", self.date_label),
            None => self.date_label.clone(),
        }
    }

    /// Exact, case-sensitive match; `all` matches every card.
    pub fn matches_category(&self, category: &str) -> bool {
        category == "all" || self.category.as_deref() == Some(category)
    }
}

impl From<&EventRecord> for EventCard {
    fn from(event: &EventRecord) -> Self {
        let price_label = match event.price {
            Some(price) if price > 0.0 => format!("${price}"),
            _ => "Free".to_string(),
        };
        let action = match event.spots_available {
            Some(spots) if spots > 0 => CardAction::Register {
                href: format!("/events/#event-{}", event.id),
            },
            _ => CardAction::Full,
        };

        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            date_label: format_event_date(&event.date),
            time: event.time.clone().filter(|time| !time.trim().is_empty()),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().filter(|loc| !loc.trim().is_empty()),
            image: event.image.clone().filter(|src| !src.trim().is_empty()),
            price_label,
            spots_label: event
                .spots_available
                .map(|spots| format!("{spots} spots available")),
            category: event.category.clone(),
            action,
        }
    }
}

/// Formats sheet dates as "Sat, Mar 1, 2025"; unparseable input is shown as-is.
pub fn format_event_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));

    match date {
        Some(date) => date.format("%a, %b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

pub fn filter_by_category<'a>(cards: &'a [EventCard], category: &str) -> Vec<&'a EventCard> {
    cards
        .iter()
        .filter(|card| card.matches_category(category))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventsView {
    Loading,
    Empty(String),
    Failed(String),
    Loaded(Vec<EventCard>),
}

pub struct EventsClient {
    http: Client,
    api_url: Option<String>,
}

impl EventsClient {
    pub fn new(http: Client, api_url: Option<String>) -> Self {
        Self { http, api_url }
    }

    pub async fn fetch_events(&self) -> Result<Vec<EventRecord>, SiteClientError> {
        let api_url = configured(self.api_url.as_deref())
            .ok_or(SiteClientError::NotConfigured { service: SERVICE })?;

        let events = self
            .http
            .get(api_url)
            .query(&[("action", "getEvents")])
            .send()
            .await
            .map_err(SiteClientError::http(SERVICE))?
            .error_for_status()
            .map_err(SiteClientError::http(SERVICE))?
            .json::<Vec<EventRecord>>()
            .await
            .map_err(SiteClientError::http(SERVICE))?;

        debug!(count = events.len(), "events fetched");
        Ok(events)
    }

    pub async fn view(&self, listing: Listing) -> EventsView {
        match self.fetch_events().await {
            Ok(events) if events.is_empty() => EventsView::Empty(listing.empty_message().into()),
            Ok(events) => {
                let shown = match listing {
                    Listing::Homepage => &events[..events.len().min(HOMEPAGE_EVENT_LIMIT)],
                    Listing::All => &events[..],
                };
                EventsView::Loaded(shown.iter().map(EventCard::from).collect())
            }
            Err(err) => {
                warn!(error = %err, "error loading events");
                EventsView::Failed(listing.failure_message().into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
