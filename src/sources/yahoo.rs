use super::{endpoint_url, Http};
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    // seconds east of UTC for the exchange
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Last daily close of `ticker`, dated in the exchange's local calendar.
pub async fn last_close(http: &Http, base: &Url, ticker: &str, prefix: &str) -> Result<Observation> {
    let mut url = endpoint_url(base, &["v8", "finance", "chart", ticker])?;
    url.query_pairs_mut()
        .append_pair("range", "1d")
        .append_pair("interval", "1d");

    let response: ChartResponse = http.get_json(url).await?;
    let (close, date) = latest_bar(response, ticker)?;
    Ok(Observation::new(format::price(prefix, close), date))
}

fn latest_bar(response: ChartResponse, ticker: &str) -> Result<(f64, String)> {
    if let Some(error) = response.chart.error {
        return Err(SnapshotError::unexpected(
            "Yahoo Finance",
            format!("{} for {}: {}", error.code, ticker, error.description),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SnapshotError::unexpected("Yahoo Finance", format!("no chart for {}", ticker)))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let (timestamp, close) = result
        .timestamp
        .iter()
        .zip(closes.iter())
        .rev()
        .find_map(|(ts, close)| close.map(|c| (*ts, c)))
        .ok_or_else(|| SnapshotError::unexpected("Yahoo Finance", format!("no closes for {}", ticker)))?;

    let date = chrono::DateTime::from_timestamp(timestamp + result.meta.gmtoffset, 0)
        .ok_or_else(|| SnapshotError::unexpected("Yahoo Finance", format!("bad timestamp {}", timestamp)))?
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();

    Ok((close, date))
}
