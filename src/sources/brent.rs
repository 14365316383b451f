use super::{endpoint_url, yahoo, Endpoints, Http};
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static BRENT_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)Brent.*?([0-9]+(?:\.[0-9]+)?)\s*USD/Bbl.*?on\s*([A-Za-z]+\s+\d{1,2},\s+\d{4})",
    )
    .expect("valid brent pattern")
});

/// Brent crude in USD/bbl: the futures quote first, then the Trading Economics page.
pub async fn price(http: &Http, endpoints: &Endpoints, ticker: &str) -> Result<Observation> {
    match yahoo::last_close(http, &endpoints.yahoo, ticker, "$").await {
        Ok(observation) => return Ok(observation),
        Err(e) => tracing::warn!("Error fetching {} from Yahoo Finance: {}", ticker, e),
    }

    let url = endpoint_url(&endpoints.tradingeconomics, &["commodity", "brent-crude-oil"])?;
    let html = http.get_text(url).await?;
    parse_commodity_page(&html)
        .ok_or_else(|| SnapshotError::unexpected("Trading Economics", "Brent quote not found on page"))
}

fn parse_commodity_page(html: &str) -> Option<Observation> {
    let caps = BRENT_QUOTE.captures(html)?;
    let price: f64 = caps[1].parse().ok()?;
    let date = NaiveDate::parse_from_str(&caps[2], "%B %d, %Y").ok()?;
    Some(Observation::new(
        format::price("$", price),
        date.format("%Y-%m-%d").to_string(),
    ))
}
