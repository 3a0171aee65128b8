use crate::configuration::FetcherSettings;
use crate::data_models::Proxy;
use crate::db::TrackedProduct;
use crate::parser::errors::FetchError;
use crate::parser::traits::Parser;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use tracing::debug;
use url::Url;

const DEFAULT_LOOKUPS: [(&str, Option<&str>); 5] = [
    (r#"meta[itemprop="price"]"#, Some("content")),
    (r#"meta[property="product:price:amount"]"#, Some("content")),
    (r#"meta[property="og:price:amount"]"#, Some("content")),
    (r#"[itemprop="price"]"#, None),
    (".price", None),
];

/// Where to find the price on pages of one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRules {
    pub host: String,
    pub price_lookup: String,
    #[serde(default)]
    pub attribute: Option<String>,
}

impl SourceRules {
    fn matches(&self, url: &Url) -> bool {
        let wanted = self.host.trim_start_matches("www.");
        url.host_str()
            .map(|host| host.trim_start_matches("www."))
            .is_some_and(|host| host == wanted || host.ends_with(&format!(".{wanted}")))
    }
}

fn first_amount(raw: &str) -> String {
    let mut chars = raw.chars().skip_while(|c| !c.is_ascii_digit()).peekable();
    let mut amount = String::new();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' | ',' | '.' => amount.push(c),
            // digit group separators: "1 299,00", "1'299.00"
            ' ' | '\u{a0}' | '\u{202f}' | '\''
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) => {}
            _ => break,
        }
    }
    amount.trim_end_matches([',', '.']).to_string()
}

/// Turns shop text such as `£1,299.99`, `1.299,99 €` or `10,11 €` into a decimal.
pub fn clean_price(raw: &str) -> Result<Decimal, FetchError> {
    let amount = first_amount(raw);
    if amount.is_empty() {
        return Err(FetchError::UnparsablePrice(raw.to_string()));
    }
    let normalized = match (amount.rfind(','), amount.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => amount.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => amount.replace(',', ""),
        (Some(comma), None) => {
            let decimals = amount.len() - comma - 1;
            if amount.matches(',').count() == 1 && decimals != 3 {
                amount.replace(',', ".")
            } else {
                amount.replace(',', "")
            }
        }
        (None, Some(_)) if amount.matches('.').count() > 1 => amount.replace('.', ""),
        _ => amount,
    };
    Decimal::from_str(&normalized).map_err(|_| FetchError::UnparsablePrice(raw.to_string()))
}

/// Anything able to tell the current price of a tracked product.
#[async_trait]
pub trait PriceSource: Send + Sync + Debug {
    async fn fetch_price(&self, product: &TrackedProduct) -> Result<Decimal, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct PriceParser {
    settings: FetcherSettings,
}

impl Parser for PriceParser {}

impl PriceParser {
    pub fn new(settings: FetcherSettings) -> Self {
        Self { settings }
    }

    pub fn check_url(raw: &str) -> Result<Url, FetchError> {
        let url = Url::parse(raw.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(FetchError::UnsupportedScheme(scheme.to_string())),
        }
    }

    pub fn find_proxy(&self) -> Option<&Proxy> {
        let mut rng = rand::thread_rng();
        self.settings.proxies.choose(&mut rng)
    }

    fn lookups_for(&self, url: &Url) -> Vec<(String, Option<String>)> {
        let shop_rules = self
            .settings
            .sources
            .iter()
            .filter(|rules| rules.matches(url))
            .map(|rules| (rules.price_lookup.to_string(), rules.attribute.clone()));
        let defaults = DEFAULT_LOOKUPS
            .iter()
            .map(|(lookup, attribute)| (lookup.to_string(), attribute.map(str::to_string)));
        shop_rules.chain(defaults).collect()
    }

    pub fn extract_price(&self, url: &Url, page: &str) -> Result<Decimal, FetchError> {
        let document = Html::parse_document(page);
        for (lookup, attribute) in self.lookups_for(url) {
            let Some(text) = Self::select_data_point(&document, &lookup, attribute.as_deref())?
            else {
                continue;
            };
            match clean_price(&text) {
                Ok(price) => return Ok(price),
                Err(e) => debug!(lookup = %lookup, "skipping match: {}", e),
            }
        }
        Err(FetchError::PriceNotFound(url.to_string()))
    }
}

#[async_trait]
impl PriceSource for PriceParser {
    async fn fetch_price(&self, product: &TrackedProduct) -> Result<Decimal, FetchError> {
        let url = Self::check_url(&product.url)?;
        let proxy = self.find_proxy();
        let client = Self::create_client(proxy, &self.settings)?;
        debug!(url = %url, proxy = ?proxy.map(|p| p.to_string()), "fetching price");
        let response = client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let page = response.text().await?;
        self.extract_price(&url, &page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("Failed to parse url")
    }

    #[test]
    fn clean_price_comma_endeuro_works() {
        let price = clean_price("10,11\u{a0}€").expect("Failed to clean");
        assert_eq!(price, Decimal::new(1011, 2));
    }

    #[test]
    fn clean_price_point_starteuro_works() {
        let price = clean_price("€10.11").expect("Failed to clean");
        assert_eq!(price, Decimal::new(1011, 2));
    }

    #[test]
    fn clean_price_thousands_works() {
        assert_eq!(
            clean_price("£1,299.99").expect("Failed to clean"),
            Decimal::new(129999, 2)
        );
        assert_eq!(
            clean_price("1.299,99 €").expect("Failed to clean"),
            Decimal::new(129999, 2)
        );
        assert_eq!(
            clean_price("$1,299").expect("Failed to clean"),
            Decimal::new(1299, 0)
        );
        assert_eq!(
            clean_price("1 299,00 kr").expect("Failed to clean"),
            Decimal::new(129900, 2)
        );
    }

    #[test]
    fn clean_price_takes_first_amount() {
        let price = clean_price("Now £40.00 was £55.00").expect("Failed to clean");
        assert_eq!(price, Decimal::new(4000, 2));
    }

    #[test]
    fn clean_price_without_digits_fails() {
        assert!(matches!(
            clean_price("Out of stock"),
            Err(FetchError::UnparsablePrice(_))
        ));
    }

    #[test]
    fn check_url_rejects_other_schemes() {
        assert!(PriceParser::check_url("https://shop.example.com/item").is_ok());
        assert!(matches!(
            PriceParser::check_url("ftp://shop.example.com/item"),
            Err(FetchError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            PriceParser::check_url("shop.example.com"),
            Err(FetchError::UrlParsingError(_))
        ));
    }

    #[test]
    fn extract_price_from_meta_works() {
        let page = r#"<html><head>
            <meta property="product:price:amount" content="39.99">
            </head><body><span class="price">£45.00</span></body></html>"#;
        let parser = PriceParser::default();
        let price = parser
            .extract_price(&url("https://shop.example.com/kettle"), page)
            .expect("Failed to extract");
        assert_eq!(price, Decimal::new(3999, 2));
    }

    #[test]
    fn extract_price_from_text_works() {
        let page = r#"<div><span class="price">
            £45.00
        </span></div>"#;
        let parser = PriceParser::default();
        let price = parser
            .extract_price(&url("https://shop.example.com/kettle"), page)
            .expect("Failed to extract");
        assert_eq!(price, Decimal::new(4500, 2));
    }

    #[test]
    fn shop_rules_take_precedence() {
        let page = r#"<div>
            <span class="price">£45.00</span>
            <div id="offer" data-amount="12,50"></div>
        </div>"#;
        let settings = FetcherSettings {
            sources: vec![SourceRules {
                host: "example.com".to_string(),
                price_lookup: "#offer".to_string(),
                attribute: Some("data-amount".to_string()),
            }],
            ..FetcherSettings::default()
        };
        let parser = PriceParser::new(settings);
        let price = parser
            .extract_price(&url("https://www.example.com/kettle"), page)
            .expect("Failed to extract");
        assert_eq!(price, Decimal::new(1250, 2));
        let other = parser
            .extract_price(&url("https://other.org/kettle"), page)
            .expect("Failed to extract");
        assert_eq!(other, Decimal::new(4500, 2));
    }

    #[test]
    fn missing_price_fails() {
        let parser = PriceParser::default();
        let result = parser.extract_price(&url("https://shop.example.com"), "<p>Sold out</p>");
        assert!(matches!(result, Err(FetchError::PriceNotFound(_))));
    }

    #[test]
    fn find_proxy_without_proxies_is_none() {
        let parser = PriceParser::default();
        assert!(parser.find_proxy().is_none());
        let settings = FetcherSettings {
            proxies: vec![Proxy::dummy("127.0.0.1")],
            ..FetcherSettings::default()
        };
        let parser = PriceParser::new(settings);
        assert_eq!(parser.find_proxy(), Some(&Proxy::dummy("127.0.0.1")));
    }
}
