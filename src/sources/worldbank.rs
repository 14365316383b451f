use super::{endpoint_url, Http};
use crate::config::toml_config::WorldBankUnit;
use crate::domain::model::Observation;
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use serde::Deserialize;
use url::Url;

/// One data point of an indicator series. The API answers with
/// `[page_meta, [point, ...]]`, or `[{"message": [...]}]` on error.
#[derive(Debug, Deserialize)]
struct DataPoint {
    value: Option<f64>,
    date: String,
}

/// Most recent non-empty value of `indicator` for `country` (ISO-2).
pub async fn latest(
    http: &Http,
    base: &Url,
    country: &str,
    indicator: &str,
    unit: WorldBankUnit,
) -> Result<Observation> {
    let mut url = endpoint_url(base, &["v2", "country", country, "indicator", indicator])?;
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("mrnev", "1");

    let body: serde_json::Value = http.get_json(url).await?;
    parse_response(body, unit)
}

fn parse_response(body: serde_json::Value, unit: WorldBankUnit) -> Result<Observation> {
    let points = body
        .as_array()
        .and_then(|parts| parts.get(1))
        .filter(|points| !points.is_null())
        .ok_or_else(|| SnapshotError::unexpected("World Bank", "no data page in response"))?;

    let points: Vec<DataPoint> = serde_json::from_value(points.clone())?;
    let Some(point) = points.into_iter().next() else {
        return Err(SnapshotError::unexpected("World Bank", "empty data page"));
    };

    let Some(value) = point.value else {
        return Ok(Observation::unavailable());
    };

    let value = match unit {
        WorldBankUnit::Percent => format::percent(value),
        WorldBankUnit::UsdBillions => format::usd_billions(value),
    };
    Ok(Observation::new(value, point.date))
}
