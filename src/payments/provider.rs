use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::StripeConfig;

/// What the orchestrator sends to the provider to open a checkout.
/// `course_id` rides along as the session's client reference so that
/// confirmation can check which course a session actually paid for.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub course_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub product_name: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Provider-hosted pending payment, identified by an opaque session id.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn is_paid(self) -> bool {
        self == PaymentStatus::Paid
    }
}

/// Provider-reported state of a session: whether it was paid and which
/// course the session was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub payment: PaymentStatus,
    pub course_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// External payment provider boundary. Entitlement is only ever granted
/// after `session_status` reports the session as paid for the course
/// being confirmed; the redirect arriving at the success URL proves
/// nothing by itself.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(&self, req: &SessionRequest)
        -> Result<CheckoutSession, PaymentError>;
    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, PaymentError>;
}

/// Stripe Checkout over the form-encoded v1 REST API.
pub struct StripeCheckout {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeCheckout {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    client_reference_id: Option<String>,
}

/// Flatten a [`SessionRequest`] into Stripe's bracketed form fields.
fn session_form(req: &SessionRequest) -> Vec<(String, String)> {
    vec![
        ("mode".into(), "payment".into()),
        ("client_reference_id".into(), req.course_id.to_string()),
        ("payment_method_types[0]".into(), "card".into()),
        (
            "line_items[0][price_data][currency]".into(),
            req.currency.clone(),
        ),
        (
            "line_items[0][price_data][product_data][name]".into(),
            req.product_name.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            req.amount_cents.to_string(),
        ),
        ("line_items[0][quantity]".into(), "1".into()),
        ("customer_email".into(), req.customer_email.clone()),
        ("success_url".into(), req.success_url.clone()),
        ("cancel_url".into(), req.cancel_url.clone()),
    ]
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
    async fn create_session(
        &self,
        req: &SessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&session_form(req))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(%status, "stripe session create failed");
            return Err(PaymentError::Provider(format!("{status}: {body}")));
        }

        let session: StripeSession = resp.json().await?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::Provider("session has no redirect url".into()))?;

        debug!(session_id = %session.id, "stripe session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, PaymentError> {
        let resp = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base, session_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(%status, session_id, "stripe session lookup failed");
            return Err(PaymentError::Provider(format!("{status}: {body}")));
        }

        let session: StripeSession = resp.json().await?;
        debug!(session_id = %session.id, payment_status = ?session.payment_status, "stripe session status");
        let payment = match session.payment_status.as_deref() {
            Some("paid") => PaymentStatus::Paid,
            _ => PaymentStatus::Unpaid,
        };
        let course_id = session
            .client_reference_id
            .as_deref()
            .and_then(|v| v.parse().ok());
        Ok(SessionStatus { payment, course_id })
    }
}
