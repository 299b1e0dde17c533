use std::sync::{Arc, Mutex};

use super::*;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot};

type Captured = Arc<tokio::sync::Mutex<Option<oneshot::Sender<Value>>>>;

#[derive(Default)]
struct RecordingRedirector {
    redirects: Mutex<Vec<(String, CheckoutTarget)>>,
    refuse_with: Option<String>,
}

impl RecordingRedirector {
    fn refusing(message: &str) -> Self {
        Self {
            refuse_with: Some(message.into()),
            ..Self::default()
        }
    }

    fn redirects(&self) -> Vec<(String, CheckoutTarget)> {
        self.redirects.lock().expect("redirects").clone()
    }
}

#[async_trait]
impl CheckoutRedirector for RecordingRedirector {
    async fn redirect(
        &self,
        publishable_key: &str,
        target: &CheckoutTarget,
    ) -> Result<(), SiteClientError> {
        self.redirects
            .lock()
            .expect("redirects")
            .push((publishable_key.to_string(), target.clone()));
        match &self.refuse_with {
            Some(message) => Err(redirect_rejected(message.clone())),
            None => Ok(()),
        }
    }
}

async fn spawn_session_api(reply: Value) -> (String, oneshot::Receiver<Value>) {
    let (tx, rx) = oneshot::channel();
    let captured: Captured = Arc::new(tokio::sync::Mutex::new(Some(tx)));
    let app = Router::new()
        .route(
            DEFAULT_SESSION_ENDPOINT,
            post(
                move |State(captured): State<Captured>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        if let Some(tx) = captured.lock().await.take() {
                            let _ = tx.send(body);
                        }
                        Json(reply)
                    }
                },
            ),
        )
        .with_state(captured);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

fn settings(origin: &str) -> CheckoutSettings {
    CheckoutSettings {
        origin: origin.into(),
        publishable_key: Some("pk_test_123".into()),
        ..CheckoutSettings::default()
    }
}

#[test]
fn preset_amounts_map_to_price_ids() {
    assert_eq!(
        donation_price_id(100.0),
        Some(PriceId::new("price_donation_100"))
    );
    assert_eq!(donation_price_id(75.0), None);
    assert_eq!(donation_price_id(25.5), None);
    assert_eq!(
        membership_price_id(MembershipLevel::Benefactor),
        PriceId::new("price_membership_benefactor")
    );
}

#[test]
fn donation_below_one_dollar_is_rejected() {
    for amount in [0.0, 0.99, -5.0, f64::NAN] {
        let err = plan_donation(amount, DonationFrequency::OneTime, None).expect_err("invalid");
        assert_eq!(user_message(&err), "Please enter a valid donation amount");
    }
}

#[test]
fn monthly_preset_uses_subscription_mode() {
    let plan = plan_donation(50.0, DonationFrequency::Monthly, None).expect("plan");
    assert!(matches!(
        plan,
        CheckoutPlan::Price { ref price_id, mode: CheckoutMode::Subscription }
            if price_id.as_str() == "price_donation_50"
    ));
}

#[test]
fn custom_amount_is_sent_in_cents() {
    let CheckoutPlan::CustomSession(request) =
        plan_donation(37.5, DonationFrequency::OneTime, Some(" donor@example.org "))
            .expect("plan")
    else {
        panic!("expected custom session");
    };

    assert_eq!(request.amount, 3750);
    assert!(!request.is_recurring);
    assert_eq!(request.email.as_deref(), Some("donor@example.org"));
    assert_eq!(request.metadata.source, "website_donation");
    assert_eq!(request.metadata.kind, "one-time");
}

#[test]
fn membership_level_must_be_known() {
    let err = plan_membership(None).expect_err("missing");
    assert_eq!(user_message(&err), "Please select a membership level");

    let err = plan_membership(Some("platinum")).expect_err("unknown");
    assert_eq!(user_message(&err), "Invalid membership type selected");

    assert!(matches!(
        plan_membership(Some("student")),
        Ok(CheckoutPlan::Price { mode: CheckoutMode::Subscription, .. })
    ));
}

#[test]
fn redirect_options_serialize_in_provider_shape() {
    let client = CheckoutClient::new(
        Client::new(),
        settings("https://nature.example.org/"),
        RecordingRedirector::default(),
    );

    let options = client.redirect_options(
        PriceId::new("price_donation_25"),
        CheckoutMode::Payment,
        "https://nature.example.org/support/donate.html",
        Some(""),
    );

    assert_eq!(
        serde_json::to_value(&options).expect("json"),
        json!({
            "lineItems": [{"price": "price_donation_25", "quantity": 1}],
            "mode": "payment",
            "successUrl": "https://nature.example.org/thank-you.html?session_id={CHECKOUT_SESSION_ID}",
            "cancelUrl": "https://nature.example.org/support/donate.html",
            "billingAddressCollection": "auto"
        })
    );
}

#[tokio::test]
async fn preset_donation_redirects_with_price() {
    let client = CheckoutClient::new(
        Client::new(),
        settings("https://nature.example.org"),
        RecordingRedirector::default(),
    );

    let target = client
        .donate(250.0, DonationFrequency::OneTime, Some("donor@example.org"), "/support/")
        .await
        .expect("checkout");

    let CheckoutTarget::Price(options) = &target else {
        panic!("expected price redirect");
    };
    assert_eq!(options.line_items[0].price.as_str(), "price_donation_250");
    assert_eq!(options.mode, CheckoutMode::Payment);
    assert_eq!(options.customer_email.as_deref(), Some("donor@example.org"));
    assert_eq!(
        client.redirector().redirects(),
        vec![("pk_test_123".to_string(), target)]
    );
}

#[tokio::test]
async fn custom_donation_creates_session_then_redirects() {
    let (origin, request_rx) = spawn_session_api(json!({"id": "cs_test_abc"})).await;
    let client = CheckoutClient::new(
        Client::new(),
        settings(&origin),
        RecordingRedirector::default(),
    );

    let target = client
        .donate(42.0, DonationFrequency::Monthly, None, "/support/")
        .await
        .expect("checkout");

    assert_eq!(
        target,
        CheckoutTarget::Session(CheckoutSessionId::new("cs_test_abc"))
    );
    let body = request_rx.await.expect("session request");
    assert_eq!(
        body,
        json!({
            "amount": 4200,
            "isRecurring": true,
            "metadata": {"source": "website_donation", "type": "recurring"}
        })
    );
    assert_eq!(client.redirector().redirects().len(), 1);
}

#[tokio::test]
async fn session_error_is_surfaced_without_redirect() {
    let (origin, _request_rx) = spawn_session_api(json!({"error": "Amount too large"})).await;
    let client = CheckoutClient::new(
        Client::new(),
        settings(&origin),
        RecordingRedirector::default(),
    );

    let err = client
        .donate(99_999.0, DonationFrequency::OneTime, None, "/support/")
        .await
        .expect_err("rejected");

    assert_eq!(user_message(&err), "Error: Amount too large");
    assert!(client.redirector().redirects().is_empty());
}

#[tokio::test]
async fn placeholder_key_means_provider_not_loaded() {
    let client = CheckoutClient::new(
        Client::new(),
        CheckoutSettings {
            publishable_key: Some("pk_test_YOUR_PUBLISHABLE_KEY_HERE".into()),
            ..CheckoutSettings::default()
        },
        RecordingRedirector::default(),
    );

    let err = client
        .join(Some("family"), None, "/support/membership.html")
        .await
        .expect_err("not configured");

    assert_eq!(
        user_message(&err),
        "Stripe is not loaded. Please refresh the page and try again."
    );
    assert!(client.redirector().redirects().is_empty());
}

#[tokio::test]
async fn provider_refusal_becomes_payment_error() {
    let client = CheckoutClient::new(
        Client::new(),
        settings("https://nature.example.org"),
        RecordingRedirector::refusing("Your card was declined"),
    );

    let err = client
        .join(Some("patron"), None, "/support/membership.html")
        .await
        .expect_err("refused");

    assert_eq!(user_message(&err), "Payment error: Your card was declined");
}
