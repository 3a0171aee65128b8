use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    BadStatus { url: String, status: u16 },
    #[error("scraper selector error: {0}")]
    CrawlerSelectorError(String),
    #[error("url parsing error {0}")]
    UrlParsingError(#[from] url::ParseError),
    #[error("only http and https links can be fetched, got {0}")]
    UnsupportedScheme(String),
    #[error("no price found on {0}")]
    PriceNotFound(String),
    #[error("'{0}' is not a price")]
    UnparsablePrice(String),
}
