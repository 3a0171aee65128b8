mod errors;
mod mailjet;
mod price_alert;
mod templates;

pub use errors::NotifyError;
pub use mailjet::{Mailbox, MailProvider, MailjetClient, OutgoingMail, ProviderResponse};
pub use price_alert::{format_price, is_valid_email, PriceAlert};
