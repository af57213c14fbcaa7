use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{
    configuration::Config,
    error::Error,
    types::{CmcListings, CmcQuotes},
};

/// CoinMarketCap REST client. One instance is built at startup and shared
/// read-only across callers; every request carries the configured timeout so
/// a stalled upstream degrades to the next fallback tier instead of hanging
/// the caller.
#[derive(Debug, Clone)]
pub struct CoinMarketCap {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinMarketCap {
    pub fn new(config: &Config) -> Result<Self, Error> {
        // fail fast on a malformed base url override
        Url::parse(&config.cmc_base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(CoinMarketCap {
            client,
            base_url: config.cmc_base_url.trim_end_matches('/').to_owned(),
            api_key: config.cmc_api_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Top listings by market cap, quoted in `convert`.
    pub async fn get_latest_listings(
        &self,
        limit: usize,
        convert: &str,
    ) -> Result<CmcListings, Error> {
        let response = self
            .request("cryptocurrency/listings/latest")?
            .query(&[("limit", limit.to_string()), ("convert", convert.to_owned())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "listings request failed with status {}",
                response.status()
            )));
        }

        Ok(response.json::<CmcListings>().await?)
    }

    /// Current quote for one symbol, quoted in `convert`.
    pub async fn get_latest_quotes(
        &self,
        symbol: &str,
        convert: &str,
    ) -> Result<CmcQuotes, Error> {
        let response = self
            .request("cryptocurrency/quotes/latest")?
            .query(&[("symbol", symbol), ("convert", convert)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "quote request for {} failed with status {}",
                symbol,
                response.status()
            )));
        }

        Ok(response.json::<CmcQuotes>().await?)
    }

    fn request(&self, path: &str) -> Result<reqwest::RequestBuilder, Error> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::SourceUnavailable(String::from("api key not configured"))
        })?;

        Ok(self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("X-CMC_PRO_API_KEY", api_key)
            .header("Accept", "application/json"))
    }
}
