use super::{endpoint_url, yahoo, Endpoints, Http};
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Deserialize)]
struct LatestRates {
    timestamp: i64,
    rates: HashMap<String, f64>,
}

/// USD spot price of a metal. Uses MetalPriceAPI when a key is configured and
/// falls back to the Yahoo Finance futures quote otherwise or on failure.
pub async fn spot_price(
    http: &Http,
    endpoints: &Endpoints,
    api_key: Option<&str>,
    symbol: &str,
    fallback_ticker: &str,
) -> Result<Observation> {
    if let Some(api_key) = api_key {
        match latest(http, &endpoints.metalprice, api_key, symbol).await {
            Ok(observation) => return Ok(observation),
            Err(e) => tracing::warn!("Error fetching MetalPriceAPI for {}: {}", symbol, e),
        }
    } else {
        tracing::debug!("No MetalPriceAPI key, using {} for {}", fallback_ticker, symbol);
    }

    yahoo::last_close(http, &endpoints.yahoo, fallback_ticker, "$").await
}

async fn latest(http: &Http, base: &Url, api_key: &str, symbol: &str) -> Result<Observation> {
    let mut url = endpoint_url(base, &["v1", "latest"])?;
    url.query_pairs_mut()
        .append_pair("api_key", api_key)
        .append_pair("base", "USD")
        .append_pair("currencies", symbol);

    let rates: LatestRates = http.get_json(url).await?;
    parse_rates(rates, symbol)
}

// Rates are quoted as units of metal per USD.
fn parse_rates(rates: LatestRates, symbol: &str) -> Result<Observation> {
    let rate = rates
        .rates
        .get(symbol)
        .copied()
        .filter(|rate| *rate > 0.0)
        .ok_or_else(|| SnapshotError::unexpected("MetalPriceAPI", format!("no usable rate for {}", symbol)))?;

    let date = chrono::DateTime::from_timestamp(rates.timestamp, 0)
        .ok_or_else(|| SnapshotError::unexpected("MetalPriceAPI", format!("bad timestamp {}", rates.timestamp)))?
        .format("%Y-%m-%d")
        .to_string();

    Ok(Observation::new(format::price("$", 1.0 / rate), date))
}
