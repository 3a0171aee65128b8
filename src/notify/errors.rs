use thiserror::Error;

fn status_text(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no response".to_string(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("the email address '{0}' is not valid")]
    InvalidRecipient(String),
    #[error("failed to send email ({}): {payload}", status_text(.status))]
    DeliveryFailed {
        status: Option<u16>,
        payload: String,
    },
}
