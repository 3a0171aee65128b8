use crate::configuration::MailjetSettings;
use crate::data_models::AlertEvent;
use crate::db::User;
use crate::notify::errors::NotifyError;
use crate::notify::mailjet::{MailProvider, Mailbox, MailjetClient, OutgoingMail};
use crate::notify::templates::{alert_html, alert_text, AlertContent};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

const SUCCESS_STATUS: u16 = 200;

/// Currency immediately followed by the amount with two decimals, `£40.00`.
pub fn format_price(price: Decimal, currency: &str) -> String {
    format!("{}{:.2}", currency, price.round_dp(2))
}

/// `local@domain.tld`: non-empty local part, a dot in the domain and at least
/// two characters after the last dot.
pub fn is_valid_email(email: &str) -> Result<(), NotifyError> {
    if let Some((local, domain)) = email.split_once('@') {
        let suffix = domain.rsplit('.').next().unwrap_or_default();
        if !local.is_empty() && domain.contains('.') && suffix.chars().count() > 1 {
            return Ok(());
        }
    }
    Err(NotifyError::InvalidRecipient(email.to_string()))
}

/// Turns alert events into emails and hands them to the provider.
#[derive(Debug, Clone)]
pub struct PriceAlert {
    provider: Arc<dyn MailProvider>,
    sender: Mailbox,
    timeout: Duration,
}

impl PriceAlert {
    pub fn new(provider: Arc<dyn MailProvider>, sender: Mailbox, timeout: Duration) -> Self {
        Self {
            provider,
            sender,
            timeout,
        }
    }

    pub fn from_settings(settings: &MailjetSettings) -> Self {
        let sender = Mailbox {
            email: settings.sender_email.to_string(),
            name: settings.sender_name.to_string(),
        };
        Self::new(
            Arc::new(MailjetClient::new(settings)),
            sender,
            settings.timeout(),
        )
    }

    pub fn compose(&self, user: &User, event: &AlertEvent) -> Result<OutgoingMail, NotifyError> {
        let recipient = user.email.as_deref().unwrap_or_default();
        is_valid_email(recipient)?;
        let currency = event.currency.as_str();
        let current_price = format_price(event.price, currency);
        let threshold = format_price(event.threshold, currency);
        let content = AlertContent {
            name: user.display_name(),
            product_name: &event.product_name,
            product_url: &event.product_url,
            current_price: &current_price,
            threshold: &threshold,
            recipient,
        };
        Ok(OutgoingMail {
            from: self.sender.clone(),
            to: Mailbox {
                email: recipient.to_string(),
                name: user.display_name().to_string(),
            },
            subject: format!("Price Alert: {}", event.product_name),
            text: alert_text(&content),
            html: alert_html(&content),
        })
    }

    pub async fn send_alert(&self, user: &User, event: &AlertEvent) -> Result<(), NotifyError> {
        let mail = self.compose(user, event)?;
        let response = timeout(self.timeout, self.provider.send(&mail))
            .await
            .map_err(|_| NotifyError::DeliveryFailed {
                status: None,
                payload: format!("no answer within {}s", self.timeout.as_secs_f32()),
            })??;
        if response.status != SUCCESS_STATUS {
            warn!(
                recipient = %mail.to.email,
                status = response.status,
                "Failed to send email: {}",
                response.body
            );
            return Err(NotifyError::DeliveryFailed {
                status: Some(response.status),
                payload: response.body,
            });
        }
        info!(recipient = %mail.to.email, product = %event.product_name, "Email sent successfully");
        Ok(())
    }
}
