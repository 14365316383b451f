//! Provider clients. Each submodule fetches one kind of figure and returns a
//! formatted [`Observation`]; [`SourceClient::observe`] turns any failure into
//! the `N/A` placeholder.

pub mod brent;
pub mod eodhd;
pub mod metalprice;
pub mod mospi;
pub mod worldbank;
pub mod yahoo;

use crate::config::toml_config::{CredentialsConfig, EndpointsConfig, HttpConfig, MetricSource};
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Shared HTTP client plus the per-kind timeouts.
pub struct Http {
    client: Client,
    pdf_timeout: Duration,
}

impl Http {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            pdf_timeout: Duration::from_secs(config.pdf_timeout_seconds),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn get_text(&self, url: Url) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    pub async fn get_document(&self, url: Url) -> Result<Vec<u8>> {
        tracing::debug!("GET {} (document)", url);
        let response = self
            .client
            .get(url)
            .timeout(self.pdf_timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Appends path segments to a provider base URL, percent-encoding each one.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SnapshotError::ConfigError {
            message: format!("{} cannot be used as a base URL", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub worldbank: Url,
    pub eodhd: Url,
    pub yahoo: Url,
    pub metalprice: Url,
    pub mospi: Url,
    pub tradingeconomics: Url,
}

impl TryFrom<&EndpointsConfig> for Endpoints {
    type Error = SnapshotError;

    fn try_from(config: &EndpointsConfig) -> Result<Self> {
        Ok(Self {
            worldbank: Url::parse(&config.worldbank)?,
            eodhd: Url::parse(&config.eodhd)?,
            yahoo: Url::parse(&config.yahoo)?,
            metalprice: Url::parse(&config.metalprice)?,
            mospi: Url::parse(&config.mospi)?,
            tradingeconomics: Url::parse(&config.tradingeconomics)?,
        })
    }
}

pub struct SourceClient {
    http: Http,
    endpoints: Endpoints,
    credentials: CredentialsConfig,
}

impl SourceClient {
    pub fn new(
        http: &HttpConfig,
        endpoints: &EndpointsConfig,
        credentials: &CredentialsConfig,
    ) -> Result<Self> {
        Ok(Self {
            http: Http::new(http)?,
            endpoints: Endpoints::try_from(endpoints)?,
            credentials: credentials.clone(),
        })
    }

    /// Fetches one metric. Never fails: errors are logged and degrade to `N/A`.
    pub async fn observe(&self, source: &MetricSource) -> Observation {
        match self.fetch(source).await {
            Ok(observation) => observation,
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", source.describe(), e);
                Observation::unavailable()
            }
        }
    }

    async fn fetch(&self, source: &MetricSource) -> Result<Observation> {
        match source {
            MetricSource::WorldBank {
                country,
                indicator,
                unit,
            } => {
                worldbank::latest(&self.http, &self.endpoints.worldbank, country, indicator, *unit)
                    .await
            }
            MetricSource::BondYield { ticker } => {
                eodhd::bond_yield(
                    &self.http,
                    &self.endpoints.eodhd,
                    ticker,
                    self.credentials.eodhd_api_key(),
                )
                .await
            }
            MetricSource::Quote { ticker, prefix } => {
                yahoo::last_close(&self.http, &self.endpoints.yahoo, ticker, prefix).await
            }
            MetricSource::Metal {
                symbol,
                fallback_ticker,
            } => {
                metalprice::spot_price(
                    &self.http,
                    &self.endpoints,
                    self.credentials.metalprice_api_key(),
                    symbol,
                    fallback_ticker,
                )
                .await
            }
            MetricSource::MospiCpi => mospi::latest_cpi(&self.http, &self.endpoints.mospi).await,
            MetricSource::BrentCrude { ticker } => {
                brent::price(&self.http, &self.endpoints, ticker).await
            }
        }
    }
}
