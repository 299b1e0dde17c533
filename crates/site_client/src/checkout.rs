use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{CheckoutMode, CheckoutSessionId, DonationFrequency, MembershipLevel, PriceId},
    protocol::{CheckoutMetadata, CheckoutSessionResponse, CustomCheckoutRequest},
};
use tracing::{info, warn};
use url::Url;

use crate::{configured, error::SiteClientError};

const SESSION_SERVICE: &str = "checkout session";
const REDIRECT_SERVICE: &str = "checkout redirect";
const PROVIDER_SERVICE: &str = "payment provider";

pub const DONATION_PRESETS: [u32; 6] = [25, 50, 100, 250, 500, 1000];
pub const DEFAULT_SESSION_ENDPOINT: &str = "/api/create-checkout-session";

pub fn donation_price_id(amount: f64) -> Option<PriceId> {
    if amount.fract() != 0.0 {
        return None;
    }
    DONATION_PRESETS
        .into_iter()
        .find(|preset| f64::from(*preset) == amount)
        .map(|preset| PriceId::new(format!("price_donation_{preset}")))
}

pub fn membership_price_id(level: MembershipLevel) -> PriceId {
    PriceId::new(format!("price_membership_{}", level.as_str()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CheckoutSettings {
    /// Site origin used for the thank-you page, e.g. `https://example.org`.
    pub origin: String,
    pub session_endpoint: String,
    pub publishable_key: Option<String>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".into(),
            session_endpoint: DEFAULT_SESSION_ENDPOINT.into(),
            publishable_key: None,
        }
    }
}

impl CheckoutSettings {
    pub fn publishable_key(&self) -> Result<&str, SiteClientError> {
        configured(self.publishable_key.as_deref()).ok_or(SiteClientError::NotConfigured {
            service: PROVIDER_SERVICE,
        })
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}/thank-you.html?session_id={{CHECKOUT_SESSION_ID}}",
            self.origin.trim_end_matches('/')
        )
    }

    pub fn session_url(&self) -> Result<Url, SiteClientError> {
        let invalid = |source| SiteClientError::Url {
            url: format!("{}{}", self.origin, self.session_endpoint),
            source,
        };
        Url::parse(&self.origin)
            .and_then(|origin| origin.join(&self.session_endpoint))
            .map_err(invalid)
    }
}

#[derive(Debug, Clone)]
pub enum CheckoutPlan {
    /// A catalogued price the provider can check out directly.
    Price { price_id: PriceId, mode: CheckoutMode },
    /// Arbitrary amount; needs a server-created session first.
    CustomSession(CustomCheckoutRequest),
}

pub fn plan_donation(
    amount: f64,
    frequency: DonationFrequency,
    email: Option<&str>,
) -> Result<CheckoutPlan, SiteClientError> {
    if !amount.is_finite() || amount < 1.0 {
        return Err(SiteClientError::validation(
            "amount",
            "Please enter a valid donation amount",
        ));
    }

    if let Some(price_id) = donation_price_id(amount) {
        return Ok(CheckoutPlan::Price {
            price_id,
            mode: frequency.checkout_mode(),
        });
    }

    Ok(CheckoutPlan::CustomSession(CustomCheckoutRequest {
        amount: (amount * 100.0).round() as u64,
        is_recurring: frequency.is_recurring(),
        email: email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string),
        metadata: CheckoutMetadata {
            source: "website_donation".into(),
            kind: frequency.metadata_label().into(),
        },
    }))
}

pub fn plan_membership(level: Option<&str>) -> Result<CheckoutPlan, SiteClientError> {
    let level = level.map(str::trim).filter(|level| !level.is_empty()).ok_or_else(|| {
        SiteClientError::validation("membership_type", "Please select a membership level")
    })?;
    let level = MembershipLevel::parse(level).ok_or_else(|| {
        SiteClientError::validation("membership_type", "Invalid membership type selected")
    })?;

    Ok(CheckoutPlan::Price {
        price_id: membership_price_id(level),
        mode: CheckoutMode::Subscription,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub price: PriceId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectOptions {
    pub line_items: Vec<LineItem>,
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub billing_address_collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    Price(RedirectOptions),
    Session(CheckoutSessionId),
}

/// Hands the shopper over to the hosted payment page.
#[async_trait]
pub trait CheckoutRedirector: Send + Sync {
    async fn redirect(
        &self,
        publishable_key: &str,
        target: &CheckoutTarget,
    ) -> Result<(), SiteClientError>;
}

pub struct CheckoutClient<R> {
    http: Client,
    settings: CheckoutSettings,
    redirector: R,
}

impl<R: CheckoutRedirector> CheckoutClient<R> {
    pub fn new(http: Client, settings: CheckoutSettings, redirector: R) -> Self {
        Self {
            http,
            settings,
            redirector,
        }
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    pub fn redirector(&self) -> &R {
        &self.redirector
    }

    pub fn redirect_options(
        &self,
        price_id: PriceId,
        mode: CheckoutMode,
        cancel_url: &str,
        email: Option<&str>,
    ) -> RedirectOptions {
        RedirectOptions {
            line_items: vec![LineItem {
                price: price_id,
                quantity: 1,
            }],
            mode,
            success_url: self.settings.success_url(),
            cancel_url: cancel_url.to_string(),
            customer_email: email
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string),
            billing_address_collection: "auto".into(),
        }
    }

    pub async fn create_custom_session(
        &self,
        request: &CustomCheckoutRequest,
    ) -> Result<CheckoutSessionId, SiteClientError> {
        let url = self.settings.session_url()?;
        let session = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(SiteClientError::http(SESSION_SERVICE))?
            .json::<CheckoutSessionResponse>()
            .await
            .map_err(SiteClientError::http(SESSION_SERVICE))?;

        if let Some(message) = session.error {
            return Err(SiteClientError::Rejected {
                service: SESSION_SERVICE,
                message,
            });
        }
        session.id.ok_or_else(|| SiteClientError::Rejected {
            service: SESSION_SERVICE,
            message: "response carried no session id".into(),
        })
    }

    /// Resolves the plan to a provider target and redirects to it.
    pub async fn checkout(
        &self,
        plan: CheckoutPlan,
        cancel_url: &str,
        email: Option<&str>,
    ) -> Result<CheckoutTarget, SiteClientError> {
        let publishable_key = self.settings.publishable_key()?;

        let target = match plan {
            CheckoutPlan::Price { price_id, mode } => {
                info!(price = %price_id, mode = mode.as_str(), "redirecting to checkout");
                CheckoutTarget::Price(self.redirect_options(price_id, mode, cancel_url, email))
            }
            CheckoutPlan::CustomSession(request) => {
                let session = self.create_custom_session(&request).await?;
                info!(session = %session, amount_cents = request.amount, "custom checkout session created");
                CheckoutTarget::Session(session)
            }
        };

        self.redirector
            .redirect(publishable_key, &target)
            .await
            .inspect_err(|err| warn!(error = %err, "checkout redirect failed"))?;
        Ok(target)
    }

    pub async fn donate(
        &self,
        amount: f64,
        frequency: DonationFrequency,
        email: Option<&str>,
        cancel_url: &str,
    ) -> Result<CheckoutTarget, SiteClientError> {
        let plan = plan_donation(amount, frequency, email)?;
        self.checkout(plan, cancel_url, email).await
    }

    pub async fn join(
        &self,
        level: Option<&str>,
        email: Option<&str>,
        cancel_url: &str,
    ) -> Result<CheckoutTarget, SiteClientError> {
        let plan = plan_membership(level)?;
        self.checkout(plan, cancel_url, email).await
    }
}

/// The alert text a shopper sees for a failed checkout.
pub fn user_message(err: &SiteClientError) -> String {
    match err {
        SiteClientError::Validation { reason, .. } => reason.clone(),
        SiteClientError::NotConfigured {
            service: PROVIDER_SERVICE,
        } => "Stripe is not loaded. Please refresh the page and try again.".into(),
        SiteClientError::Rejected {
            service: SESSION_SERVICE,
            message,
        } => format!("Error: {message}"),
        SiteClientError::Rejected {
            service: REDIRECT_SERVICE,
            message,
        } => format!("Payment error: {message}"),
        _ => "An error occurred. Please try again.".into(),
    }
}

/// Builds the error a redirector reports when the provider refuses a target.
pub fn redirect_rejected(message: impl Into<String>) -> SiteClientError {
    SiteClientError::Rejected {
        service: REDIRECT_SERVICE,
        message: message.into(),
    }
}

#[cfg(test)]
#[path = "tests/checkout_tests.rs"]
mod tests;
