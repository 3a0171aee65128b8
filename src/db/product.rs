use crate::data_models::Currency;
use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn non_negative(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(validator::ValidationError::new("negative_price"));
    }
    Ok(())
}

/// What a user hands in when they start tracking something.
#[derive(Debug, Clone, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[validate(custom(function = "non_negative"))]
    pub threshold: Decimal,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub url: String,
    pub threshold: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub last_price: Option<Decimal>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
    /// Cleared when an alert fires, set again once the price climbs back over the threshold.
    #[serde(default = "armed")]
    pub alert_armed: bool,
}

fn armed() -> bool {
    true
}

impl TrackedProduct {
    pub fn new(user_id: Uuid, product: NewProduct) -> Result<Self, ValidationError> {
        product.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name: product.name.trim().to_string(),
            url: product.url.trim().to_string(),
            threshold: product.threshold,
            currency: product.currency,
            last_price: None,
            last_checked: None,
            alert_armed: true,
        })
    }

    pub fn record_price(&mut self, price: Decimal, checked_at: DateTime<Utc>) {
        self.last_price = Some(price);
        self.last_checked = Some(checked_at);
    }

    pub fn dummy(user_id: Uuid, url: &str, threshold: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: "test product".to_string(),
            url: url.to_string(),
            threshold,
            currency: Currency::default(),
            last_price: None,
            last_checked: None,
            alert_armed: true,
        }
    }
}
