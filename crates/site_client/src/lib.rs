use std::time::Duration;

use reqwest::Client;

pub mod calendar;
pub mod checkout;
pub mod error;
pub mod events;
pub mod newsletter;
pub mod rss;

pub use calendar::{CalendarClient, CalendarEntry, CalendarView};
pub use checkout::{
    CheckoutClient, CheckoutPlan, CheckoutRedirector, CheckoutSettings, CheckoutTarget,
    RedirectOptions,
};
pub use error::SiteClientError;
pub use events::{CardAction, EventCard, EventsClient, EventsView, Listing};
pub use newsletter::{FormMessage, NewsletterClient};
pub use rss::{NewsItem, RssTicker, TickerConfig, TickerEntry, TickerView};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared HTTP client for every collaborator endpoint.
pub fn http_client() -> Result<Client, SiteClientError> {
    Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .user_agent(concat!("site-client/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| SiteClientError::Http {
            service: "http client",
            source,
        })
}

/// Treats blank values and unreplaced `YOUR_...` placeholders as unset.
pub(crate) fn configured(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.contains("YOUR_") {
        None
    } else {
        Some(value)
    }
}
