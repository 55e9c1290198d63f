use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment gateway is not configured")]
    NotConfigured,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Creates a payment intent and returns its client secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, GatewayError>;
}

/// Price in major units to the smallest currency unit.
pub fn to_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(http: reqwest::Client, secret_key: String) -> Self {
        Self { http, secret_key }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    client_secret: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, GatewayError> {
        let amount = amount_cents.to_string();
        let resp = self
            .http
            .post("https://api.stripe.com/v1/payment_intents")
            .bearer_auth(&self.secret_key)
            .form(&[
                ("currency", currency),
                ("amount", amount.as_str()),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let intent: PaymentIntent = resp.json().await?;
        Ok(intent.client_secret)
    }
}

pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_intent(&self, _amount_cents: i64, _currency: &str) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cents_rounds() {
        assert_eq!(to_cents(99.0), 9900);
        assert_eq!(to_cents(19.99), 1999);
        assert_eq!(to_cents(0.1 + 0.2), 30);
    }
}
