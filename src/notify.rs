use std::sync::Arc;

use async_trait::async_trait;

use crate::{config::MailConfig, models::Booking};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound booking confirmation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError>;
}

/// Send the confirmation on a detached task. The caller never observes the outcome.
pub fn dispatch_confirmation(notifier: Arc<dyn Notifier>, booking: Booking) {
    tokio::spawn(async move {
        match notifier.booking_confirmed(&booking).await {
            Ok(()) => tracing::info!(booking_id = %booking.id, "confirmation email sent"),
            Err(e) => tracing::warn!(booking_id = %booking.id, error = %e, "confirmation email failed"),
        }
    });
}

pub fn subject(booking: &Booking) -> String {
    format!("Your appointment for {} is confirmed", booking.treatment)
}

pub fn html_body(booking: &Booking) -> String {
    format!(
        "<h1>Your appointment is confirmed</h1>\
         <div>\
         <p>Your appointment for : {}</p>\
         <p>Please visit us on {} at {}</p>\
         <p>Thanks from doctors portal</p>\
         </div>",
        booking.treatment, booking.appoint_date, booking.slot
    )
}

/// Mailgun HTTP API sender.
pub struct MailgunNotifier {
    http: reqwest::Client,
    cfg: MailConfig,
}

impl MailgunNotifier {
    pub fn new(http: reqwest::Client, cfg: MailConfig) -> Self {
        Self { http, cfg }
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError> {
        let url = format!("https://api.mailgun.net/v3/{}/messages", self.cfg.domain);
        let subject = subject(booking);
        let html = html_body(booking);

        let resp = self
            .http
            .post(url)
            .basic_auth("api", Some(&self.cfg.api_key))
            .form(&[
                ("from", self.cfg.from.as_str()),
                ("to", booking.email.as_str()),
                ("subject", subject.as_str()),
                ("text", "Your appointment is confirmed"),
                ("html", html.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Used when no mail provider is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(&self, booking: &Booking) -> Result<(), NotifyError> {
        tracing::info!(
            to = %booking.email,
            subject = %subject(booking),
            "mail provider not configured; confirmation not sent"
        );
        Ok(())
    }
}
