use std::{sync::LazyLock, time::Duration};

use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use shared::{
    domain::MessageKind,
    protocol::{SubscribeRequest, SubscribeResponse},
};
use tracing::{error, info, warn};

use crate::{configured, error::SiteClientError};

const SERVICE: &str = "newsletter";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Maps the submitting page's path to the label stored with the signup.
pub fn page_source(path: &str) -> &'static str {
    const SECTIONS: [(&str, &str); 6] = [
        ("/contact", "Contact Page"),
        ("/events", "Events Page"),
        ("/about", "About Page"),
        ("/programs", "Programs Page"),
        ("/visit", "Visit Page"),
        ("/support", "Support Page"),
    ];

    if let Some((_, label)) = SECTIONS.iter().find(|(prefix, _)| path.contains(prefix)) {
        return label;
    }
    if path == "/" || path == "/index.html" {
        return "Homepage";
    }
    "Footer"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
    /// Set when the email field should be emptied.
    pub clear_input: bool,
}

impl FormMessage {
    pub const HIDE_AFTER: Duration = Duration::from_secs(5);

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
            clear_input: true,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            clear_input: false,
        }
    }
}

pub struct NewsletterClient {
    http: Client,
    script_url: Option<String>,
}

impl NewsletterClient {
    pub fn new(http: Client, script_url: Option<String>) -> Self {
        Self { http, script_url }
    }

    pub fn is_configured(&self) -> bool {
        configured(self.script_url.as_deref()).is_some()
    }

    pub async fn subscribe(
        &self,
        email: &str,
        page_path: &str,
    ) -> Result<SubscribeResponse, SiteClientError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(SiteClientError::validation(
                "email",
                "Please enter a valid email address",
            ));
        }
        let script_url = configured(self.script_url.as_deref())
            .ok_or(SiteClientError::NotConfigured { service: SERVICE })?;

        let request = SubscribeRequest {
            email: email.to_string(),
            source: page_source(page_path).to_string(),
            timestamp: Utc::now(),
        };

        let response = self
            .http
            .post(script_url)
            .json(&request)
            .send()
            .await
            .map_err(SiteClientError::http(SERVICE))?
            .json::<SubscribeResponse>()
            .await
            .map_err(SiteClientError::http(SERVICE))?;

        info!(
            source = %request.source,
            success = response.success,
            "newsletter signup submitted"
        );
        Ok(response)
    }

    /// Form-level submit: every outcome becomes a message for the form.
    pub async fn submit(&self, email: &str, page_path: &str) -> FormMessage {
        match self.subscribe(email, page_path).await {
            Ok(response) if response.success => FormMessage::success(response.message),
            Ok(response) if response.message.trim().is_empty() => {
                FormMessage::error("Subscription failed. Please try again.")
            }
            Ok(response) => FormMessage::error(response.message),
            Err(SiteClientError::Validation { reason, .. }) => FormMessage::error(reason),
            Err(err @ SiteClientError::NotConfigured { .. }) => {
                error!(error = %err, "newsletter script url is not set");
                FormMessage::error(
                    "Newsletter service is not yet configured. Please contact us directly.",
                )
            }
            Err(err) => {
                warn!(error = %err, "newsletter subscription failed");
                FormMessage::error("An error occurred. Please try again or contact us directly.")
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/newsletter_tests.rs"]
mod tests;
