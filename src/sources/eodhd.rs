use super::{endpoint_url, Http};
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct EodBar {
    date: String,
    close: f64,
}

/// Latest close of a government bond (`{ticker}.GBOND`), as a yield.
pub async fn bond_yield(http: &Http, base: &Url, ticker: &str, api_key: &str) -> Result<Observation> {
    let symbol = format!("{}.GBOND", ticker);
    let mut url = endpoint_url(base, &["api", "eod", &symbol])?;
    url.query_pairs_mut()
        .append_pair("api_token", api_key)
        .append_pair("fmt", "json")
        .append_pair("order", "d")
        .append_pair("limit", "1");

    let bars: Vec<EodBar> = http.get_json(url).await?;
    let bar = bars
        .into_iter()
        .next()
        .ok_or_else(|| SnapshotError::unexpected("EODHD", format!("no bars for {}", symbol)))?;

    Ok(Observation::new(format::percent(bar.close), bar.date))
}
