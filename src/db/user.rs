use crate::notify::{is_valid_email, NotifyError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const FALLBACK_NAME: &str = "visitor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notifications_enabled: bool,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: None,
            notifications_enabled: false,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            FALLBACK_NAME
        } else {
            &self.name
        }
    }

    /// Replaces the address. A rejected address leaves the old one in place.
    pub fn set_email(&mut self, email: &str) -> Result<(), NotifyError> {
        let email = email.trim();
        is_valid_email(email)?;
        self.email = Some(email.to_string());
        Ok(())
    }

    pub fn enable_notifications(&mut self) -> Result<(), NotifyError> {
        let email = self.email.as_deref().unwrap_or_default();
        is_valid_email(email)?;
        self.notifications_enabled = true;
        Ok(())
    }

    pub fn disable_notifications(&mut self) {
        self.notifications_enabled = false;
    }
}
