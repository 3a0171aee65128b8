use crate::db::TrackedProduct;
use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const CURRENCY_SYMBOLS: [&str; 14] = [
    "£", "$", "€", "¥", "₹", "₩", "₽", "₺", "₪", "₫", "₱", "฿", "zł", "kr",
];

const CURRENCY_CODES: [&str; 30] = [
    "AUD", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF", "IDR", "ILS",
    "INR", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON", "RUB", "SEK", "SGD",
    "THB", "TRY", "USD", "ZAR",
];

/// Currency a product is priced in, either a symbol (`£`) or a 3-letter code (`GBP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency("£".to_string())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if CURRENCY_SYMBOLS.contains(&value) {
            return Ok(Currency(value.to_string()));
        }
        let code = value.to_ascii_uppercase();
        if CURRENCY_CODES.contains(&code.as_str()) {
            return Ok(Currency(code));
        }
        Err(ValidationError::UnknownCurrency(value.to_string()))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A detected threshold crossing, waiting to be turned into an email.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub product_name: String,
    pub product_url: String,
    pub currency: Currency,
    pub price: Decimal,
    pub threshold: Decimal,
    pub triggered_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(product: &TrackedProduct, price: Decimal, triggered_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id,
            user_id: product.user_id,
            product_name: product.name.to_string(),
            product_url: product.url.to_string(),
            currency: product.currency.clone(),
            price,
            threshold: product.threshold,
            triggered_at,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proxy {
    pub ip: String,
    pub port: u16,
    pub https: bool,
}

impl Display for Proxy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let protocol = if self.https { "https" } else { "http" };
        write!(f, "{}://{}:{}", protocol, self.ip, self.port)
    }
}

impl Proxy {
    pub fn dummy(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            port: 1,
            https: false,
        }
    }
}
