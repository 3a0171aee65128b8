use crate::configuration::FetcherSettings;
use crate::data_models::Proxy;
use crate::parser::errors::FetchError;
use reqwest::redirect::Policy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use url::Url;

pub trait Parser {
    fn clean_data_point(input: ElementRef) -> String {
        let element = input.text().collect::<Vec<_>>().join(" ");
        element.trim().replace('\n', " ")
    }

    fn create_client(
        proxy: Option<&Proxy>,
        settings: &FetcherSettings,
    ) -> Result<Client, FetchError> {
        let mut client = Client::builder()
            .redirect(Policy::limited(30))
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.as_str());
        if let Some(proxy) = proxy {
            let url_proxy = Url::from_str(&proxy.to_string())?;
            client = client.proxy(reqwest::Proxy::all(url_proxy)?)
        }
        client.build().map_err(FetchError::Request)
    }

    /// First non-empty match for `selector_name`, read from `attribute` when given.
    fn select_data_point(
        document: &Html,
        selector_name: &str,
        attribute: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        let selector = Selector::parse(selector_name)
            .map_err(|_| FetchError::CrawlerSelectorError(selector_name.to_string()))?;
        let found = document
            .select(&selector)
            .filter_map(|elem| match attribute {
                Some(name) => elem.attr(name).map(|data| data.trim().to_string()),
                None => Some(Self::clean_data_point(elem)),
            })
            .find(|data| !data.is_empty());
        Ok(found)
    }
}
