use anyhow::Result;
use httpmock::prelude::*;
use macro_snapshot::utils::validation::Validate;
use macro_snapshot::{LocalStorage, SnapshotConfig, SnapshotEngine, SnapshotPipeline};
use serde_json::{json, Value};
use tempfile::TempDir;

fn config_toml(base_url: &str, output_dir: &str) -> String {
    format!(
        r#"
[output]
directory = "{dir}"

[http]
timeout_seconds = 5

[endpoints]
worldbank = "{base}"
eodhd = "{base}"
yahoo = "{base}"
metalprice = "{base}"
mospi = "{base}"
tradingeconomics = "{base}"

[credentials]
eodhd_api_key = "test-eod"
metalprice_api_key = "test-metal"

[[sections]]
name = "india"

[[sections.metrics]]
label = "GDP"
source = "world_bank"
country = "IN"
indicator = "NY.GDP.MKTP.CD"
unit = "usd_billions"

[[sections.metrics]]
label = "Debt"
source = "world_bank"
country = "IN"
indicator = "GC.DOD.TOTL.GD.ZS"

[[sections.metrics]]
label = "CPI"
source = "mospi_cpi"

[[sections.metrics]]
label = "10 yr bond yield"
source = "bond_yield"
ticker = "IN10Y"

[[sections.metrics]]
label = "Mkt Cap NSE"
source = "quote"
ticker = "NSEI"

[[sections]]
name = "commodities"

[[sections.metrics]]
label = "Gold price"
source = "metal"
symbol = "XAU"
fallback_ticker = "GC=F"

[[sections.metrics]]
label = "Silver price"
source = "metal"
symbol = "XAG"
fallback_ticker = "SI=F"

[[sections.metrics]]
label = "Brent crude"
source = "brent_crude"
"#,
        base = base_url,
        dir = output_dir.replace('\\', "/"),
    )
}

fn chart(gmtoffset: i64, timestamp: i64, close: f64) -> Value {
    json!({"chart": {"result": [{
        "meta": {"gmtoffset": gmtoffset},
        "timestamp": [timestamp],
        "indicators": {"quote": [{"close": [close]}]}
    }], "error": null}})
}

async fn run(config: SnapshotConfig) -> Result<Value> {
    config.validate()?;
    let dir = config.output.directory.clone();
    let file_name = config.output.file_name.clone();

    let pipeline = SnapshotPipeline::new(LocalStorage::new(dir.clone()), config)?;
    let output_path = SnapshotEngine::new(pipeline).run().await?;

    let expected = std::path::Path::new(&dir).join(&file_name);
    assert_eq!(output_path, expected.display().to_string());
    let written = std::fs::read_to_string(expected)?;
    Ok(serde_json::from_str(&written)?)
}

#[tokio::test]
async fn test_snapshot_with_all_providers() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let gdp = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/country/IN/indicator/NY.GDP.MKTP.CD")
            .query_param("format", "json")
            .query_param("mrnev", "1");
        then.status(200).json_body(json!([
            {"page": 1, "pages": 1},
            [{"value": 3549918918556.0, "date": "2023"}]
        ]));
    });
    let debt = server.mock(|when, then| {
        when.method(GET).path("/v2/country/IN/indicator/GC.DOD.TOTL.GD.ZS");
        then.status(200)
            .json_body(json!([{"page": 1}, [{"value": null, "date": "2023"}]]));
    });
    let cpi_page = server.mock(|when, then| {
        when.method(GET).path("/cpi");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html><body><p>No releases published yet</p></body></html>");
    });
    let bond = server.mock(|when, then| {
        when.method(GET)
            .path("/api/eod/IN10Y.GBOND")
            .query_param("api_token", "test-eod")
            .query_param("order", "d");
        then.status(200)
            .json_body(json!([{"date": "2024-06-14", "open": 7.0, "close": 6.9812}]));
    });
    let nsei = server.mock(|when, then| {
        when.method(GET)
            .path("/v8/finance/chart/NSEI")
            .query_param("range", "1d");
        then.status(200).json_body(chart(19800, 1718336700, 23465.6));
    });
    let gold = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/latest")
            .query_param("api_key", "test-metal")
            .query_param("currencies", "XAU");
        then.status(200)
            .json_body(json!({"success": true, "timestamp": 1718323200, "rates": {"XAU": 0.0004}}));
    });
    let silver_rates = server.mock(|when, then| {
        when.method(GET).path("/v1/latest").query_param("currencies", "XAG");
        then.status(200)
            .json_body(json!({"success": false, "error": {"code": 101}}));
    });
    let silver_futures = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/SI=F");
        then.status(200).json_body(chart(-14400, 1718323200, 29.5));
    });
    let brent_futures = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/BZ=F");
        then.status(404).json_body(json!({"chart": {"result": null, "error": {
            "code": "Not Found", "description": "No data found"
        }}}));
    });
    let brent_page = server.mock(|when, then| {
        when.method(GET).path("/commodity/brent-crude-oil");
        then.status(200).body(
            "<html><div>Brent futures traded at 82.63 USD/Bbl on June 14, 2024.</div></html>",
        );
    });

    let config = SnapshotConfig::from_toml_str(&config_toml(
        &server.base_url(),
        temp_dir.path().to_str().unwrap(),
    ))?;
    let snapshot = run(config).await?;

    for mock in [
        &gdp, &debt, &cpi_page, &bond, &nsei, &gold, &silver_rates, &silver_futures,
        &brent_futures, &brent_page,
    ] {
        mock.assert();
    }

    assert!(snapshot["last_updated"].as_str().unwrap().ends_with(" IST"));

    assert_eq!(
        snapshot["india"],
        json!([
            {"metric": "GDP", "value": "$3549.92B", "date": "2023"},
            {"metric": "Debt", "value": "N/A", "date": "N/A"},
            {"metric": "CPI", "value": "N/A", "date": "N/A"},
            {"metric": "10 yr bond yield", "value": "6.98%", "date": "2024-06-14"},
            {"metric": "Mkt Cap NSE", "value": "23465.60", "date": "2024-06-14"}
        ])
    );
    assert_eq!(
        snapshot["commodities"],
        json!([
            {"metric": "Gold price", "value": "$2500.00", "date": "2024-06-14"},
            {"metric": "Silver price", "value": "$29.50", "date": "2024-06-13"},
            {"metric": "Brent crude", "value": "$82.63", "date": "2024-06-14"}
        ])
    );

    Ok(())
}

#[tokio::test]
async fn test_snapshot_degrades_when_providers_fail() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let failing = server.mock(|when, then| {
        when.method(GET);
        then.status(500).body("upstream unavailable");
    });

    let config = SnapshotConfig::from_toml_str(&config_toml(
        &server.base_url(),
        temp_dir.path().to_str().unwrap(),
    ))?;
    let snapshot = run(config).await?;

    assert!(failing.hits() >= 8);
    for section in ["india", "commodities"] {
        for row in snapshot[section].as_array().unwrap() {
            assert_eq!(row["value"], "N/A", "{} / {}", section, row["metric"]);
            assert_eq!(row["date"], "N/A");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_cpi_downloads_latest_release() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let page = server.mock(|when, then| {
        when.method(GET).path("/cpi");
        then.status(200).body(
            r#"<ul>
                <li><a href="/files/CPI_Press_Release_12Apr24.pdf">April</a></li>
                <li><a href="/files/CPI_Press_Release_12Jun24.pdf">June</a></li>
                <li><a href="/files/WPI_Press_Release_14Jun24.pdf">WPI</a></li>
                <li><a href="files/CPI_May24.pdf">May</a></li>
            </ul>"#,
        );
    });
    let latest = server.mock(|when, then| {
        when.method(GET).path("/files/CPI_Press_Release_12Jun24.pdf");
        then.status(200)
            .header("Content-Type", "application/pdf")
            .body("not really a pdf");
    });
    let older = server.mock(|when, then| {
        when.method(GET).path("/files/CPI_Press_Release_12Apr24.pdf");
        then.status(200).body("%PDF-1.4");
    });

    let mut config = SnapshotConfig::default();
    config.output.directory = temp_dir.path().display().to_string();
    config.endpoints.mospi = server.base_url();
    config.sections.retain(|s| s.name == "india");
    config.sections[0]
        .metrics
        .retain(|m| m.label == "CPI");

    let snapshot = run(config).await?;

    page.assert();
    latest.assert();
    older.assert_hits(0);
    assert_eq!(
        snapshot["india"],
        json!([{"metric": "CPI", "value": "N/A", "date": "N/A"}])
    );

    Ok(())
}

#[tokio::test]
async fn test_cpi_extracted_from_release_pdf() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let page = server.mock(|when, then| {
        when.method(GET).path("/cpi");
        then.status(200).body(
            r#"<a href="/files/CPI_Press_Release_12May24.pdf">May</a>
               <a href="/files/CPI_Press_Release_12Jun24.pdf">June</a>"#,
        );
    });
    let release = server.mock(|when, then| {
        when.method(GET).path("/files/CPI_Press_Release_12Jun24.pdf");
        then.status(200)
            .header("Content-Type", "application/pdf")
            .body(include_bytes!("fixtures/CPI_Press_Release_12Jun24.pdf").as_slice());
    });

    let mut config = SnapshotConfig::default();
    config.output.directory = temp_dir.path().display().to_string();
    config.endpoints.mospi = server.base_url();
    config.sections.retain(|s| s.name == "india");
    config.sections[0].metrics.retain(|m| m.label == "CPI");

    let snapshot = run(config).await?;

    page.assert();
    release.assert();
    assert_eq!(
        snapshot["india"],
        json!([{"metric": "CPI", "value": "4.75%", "date": "May 2024"}])
    );

    Ok(())
}

#[test]
fn test_default_layout_matches_published_sections() {
    let config = SnapshotConfig::default();
    let labels: Vec<(&str, Vec<&str>)> = config
        .sections
        .iter()
        .map(|s| {
            (
                s.name.as_str(),
                s.metrics.iter().map(|m| m.label.as_str()).collect(),
            )
        })
        .collect();

    assert_eq!(
        labels,
        vec![
            (
                "india",
                vec![
                    "GDP",
                    "Debt",
                    "Fiscal deficit (% of GDP)",
                    "CPI",
                    "10 yr bond yield",
                    "Mkt Cap NSE"
                ]
            ),
            ("us", vec!["GDP", "Debt", "10 yr bond yield", "Mkt Cap (Index proxy)"]),
            ("china", vec!["GDP", "Debt", "10 yr bond yield", "Mkt Cap (Index proxy)"]),
            ("commodities", vec!["Gold price", "Silver price", "Brent crude"]),
        ]
    );
}
