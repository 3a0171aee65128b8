use crate::configuration::MailjetSettings;
use crate::notify::errors::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

/// One rendered message, ready for whichever provider sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait MailProvider: Send + Sync + Debug {
    /// Hands the message over. Only transport problems are errors, the status is the caller's call.
    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, NotifyError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendRequest<'a> {
    messages: Vec<MessagePayload<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessagePayload<'a> {
    from: &'a Mailbox,
    to: Vec<&'a Mailbox>,
    subject: &'a str,
    text_part: &'a str,
    #[serde(rename = "HTMLPart")]
    html_part: &'a str,
}

impl<'a> From<&'a OutgoingMail> for SendRequest<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            messages: vec![MessagePayload {
                from: &mail.from,
                to: vec![&mail.to],
                subject: &mail.subject,
                text_part: &mail.text,
                html_part: &mail.html,
            }],
        }
    }
}

/// Client for the Mailjet v3.1 send API.
#[derive(Debug, Clone)]
pub struct MailjetClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl MailjetClient {
    pub fn new(settings: &MailjetSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.to_string(),
            api_secret: settings.api_secret.to_string(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/v3.1/send", self.base_url)
    }
}

#[async_trait]
impl MailProvider for MailjetClient {
    async fn send(&self, mail: &OutgoingMail) -> Result<ProviderResponse, NotifyError> {
        let response = self
            .client
            .post(self.send_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&SendRequest::from(mail))
            .send()
            .await
            .map_err(|e| NotifyError::DeliveryFailed {
                status: None,
                payload: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(ProviderResponse { status, body })
    }
}
