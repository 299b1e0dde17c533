use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use reqwest::Client;
use shared::protocol::{CalendarEvent, CalendarEventsResponse, CalendarTime};
use tracing::warn;
use url::Url;

use crate::{configured, error::SiteClientError};

const SERVICE: &str = "calendar";
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";
pub const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub month: String,
    pub day: u32,
    pub title: String,
    pub time_range: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl From<&CalendarEvent> for CalendarEntry {
    fn from(event: &CalendarEvent) -> Self {
        let (month, day) = match (&event.start.date_time, &event.start.date) {
            (Some(start), _) => (start.format("%b").to_string(), start.day()),
            (None, Some(date)) => (date.format("%b").to_string(), date.day()),
            (None, None) => (String::new(), 0),
        };

        Self {
            month,
            day,
            title: event
                .summary
                .clone()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| "Untitled Event".to_string()),
            time_range: time_range(&event.start, event.end.as_ref()),
            location: event.location.clone(),
            description: event.description.clone(),
        }
    }
}

/// "10:00 AM - 11:30 AM" for timed events; all-day events have no range.
fn time_range(start: &CalendarTime, end: Option<&CalendarTime>) -> Option<String> {
    const CLOCK: &str = "%-I:%M %p";
    let start = start.date_time?;
    let start_label = start.format(CLOCK).to_string();
    match end.and_then(|end| end.date_time) {
        Some(end) => Some(format!("{start_label} - {}", end.format(CLOCK))),
        None => Some(start_label),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarView {
    Empty(String),
    Failed(String),
    Loaded(Vec<CalendarEntry>),
}

pub struct CalendarClient {
    http: Client,
    base_url: String,
    calendar_id: String,
    api_key: Option<String>,
}

impl CalendarClient {
    pub fn new(http: Client, calendar_id: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_base_url(http, CALENDAR_API_BASE, calendar_id, api_key)
    }

    pub fn with_base_url(
        http: Client,
        base_url: impl Into<String>,
        calendar_id: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            calendar_id: calendar_id.into(),
            api_key,
        }
    }

    pub fn events_url(&self, now: DateTime<Utc>, max_results: u32) -> Result<Url, SiteClientError> {
        let api_key = configured(self.api_key.as_deref())
            .ok_or(SiteClientError::NotConfigured { service: SERVICE })?;
        let mut url = Url::parse(&self.base_url).map_err(|source| SiteClientError::Url {
            url: self.base_url.clone(),
            source,
        })?;
        url.path_segments_mut()
            .map_err(|()| SiteClientError::NotConfigured { service: SERVICE })?
            .pop_if_empty()
            .push(&self.calendar_id)
            .push("events");
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("timeMin", &now.to_rfc3339_opts(SecondsFormat::Millis, true))
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");
        Ok(url)
    }

    pub async fn fetch_upcoming(
        &self,
        now: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CalendarEvent>, SiteClientError> {
        let url = self.events_url(now, max_results)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SiteClientError::http(SERVICE))?
            .json::<CalendarEventsResponse>()
            .await
            .map_err(SiteClientError::http(SERVICE))?;

        if let Some(error) = response.error {
            return Err(SiteClientError::Rejected {
                service: SERVICE,
                message: error.message,
            });
        }
        Ok(response.items)
    }

    pub async fn view(&self, now: DateTime<Utc>, max_results: u32) -> CalendarView {
        match self.fetch_upcoming(now, max_results).await {
            Ok(events) if events.is_empty() => {
                CalendarView::Empty("No upcoming events scheduled.".into())
            }
            Ok(events) => CalendarView::Loaded(events.iter().map(CalendarEntry::from).collect()),
            Err(err @ SiteClientError::Rejected { .. }) => {
                warn!(error = %err, "calendar api error");
                CalendarView::Failed("Unable to load events. Please check back later.".into())
            }
            Err(err) => {
                warn!(error = %err, "error fetching calendar events");
                CalendarView::Failed("Unable to load events. Please try again later.".into())
            }
        }
    }
}

/// Public embed URL for the calendar iframe. The calendar id travels as
/// unpadded base64, the form Google's own embed snippet uses.
pub fn embed_url(calendar_id: &str, timezone: &str) -> Url {
    let mut url = Url::parse("https://calendar.google.com/calendar/embed")
        .expect("embed base is a valid url");
    url.query_pairs_mut()
        .append_pair("height", "600")
        .append_pair("wkst", "1")
        .append_pair("ctz", timezone)
        .append_pair("title", "Events")
        .append_pair("src", &STANDARD_NO_PAD.encode(calendar_id))
        .append_pair("color", "#D81B60");
    url
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
