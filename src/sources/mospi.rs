//! India CPI scraped from the MoSPI press-release PDFs.
//!
//! The CPI page links one PDF per monthly release. File names carry the
//! release date in forms like `CPI_Press_Release_12Jun24.pdf` or
//! `CPI_May24.pdf`, which is the only ordering the site offers.

use super::{endpoint_url, Http};
use crate::domain::model::{Observation, UNAVAILABLE};
use crate::utils::error::{Result, SnapshotError};
use crate::utils::format;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Pages of the release that are searched for the headline figure.
const PAGES_SCANNED: usize = 6;

const MONTH_ALTERNATION: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(\d{{1,2}})({})(\d{{2}})", MONTH_ALTERNATION))
        .expect("valid day-month-year pattern")
});

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)({})(\d{{2}})", MONTH_ALTERNATION)).expect("valid month-year pattern")
});

static HEADLINE_INFLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)All\s+India.*?Inflation.*?([0-9]+(?:\.[0-9]+)?)\s*%?")
        .expect("valid inflation pattern")
});

static RELEASE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})",
    )
    .expect("valid release month pattern")
});

pub async fn latest_cpi(http: &Http, site: &Url) -> Result<Observation> {
    let page_url = endpoint_url(site, &["cpi"])?;
    let html = http.get_text(page_url).await?;

    let links = cpi_pdf_links(&html, site);
    tracing::debug!("Found {} CPI release PDFs", links.len());
    let Some(latest) = latest_release(&links) else {
        return Ok(Observation::unavailable());
    };

    tracing::debug!("Latest CPI release: {}", latest);
    let pdf = http.get_document(latest.clone()).await?;
    let text = pdf_text(pdf).await?;
    Ok(parse_release_text(&text, latest.as_str()))
}

/// Absolute URLs of every linked PDF whose address mentions CPI, in page order.
pub fn cpi_pdf_links(html: &str, site: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("[href]").expect("valid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.to_ascii_lowercase().ends_with(".pdf"))
        .filter(|href| href.to_ascii_uppercase().contains("CPI"))
        .filter_map(|href| site.join(href).ok())
        .collect()
}

/// Picks the link with the latest file-name date; undated links sort first and
/// ties keep the earlier link.
pub fn latest_release(links: &[Url]) -> Option<&Url> {
    let mut best: Option<(&Url, Option<NaiveDate>)> = None;
    for link in links {
        let date = release_date(link.as_str());
        match best {
            Some((_, best_date)) if date <= best_date => {}
            _ => best = Some((link, date)),
        }
    }
    best.map(|(link, _)| link)
}

/// Date embedded in a release URL (`12Jun24` or `Jun24`, two-digit years are 20xx).
pub fn release_date(url: &str) -> Option<NaiveDate> {
    if let Some(caps) = DAY_MONTH_YEAR.captures(url) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(2000 + year, month, day);
    }

    let caps = MONTH_YEAR.captures(url)?;
    let month = month_number(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, 1)
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" | "sept" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

// Text extraction is CPU bound and panics on some malformed files.
async fn pdf_text(pdf: Vec<u8>) -> Result<String> {
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&pdf))
        .await
        .map_err(|e| SnapshotError::PdfError {
            message: format!("extraction aborted: {}", e),
        })?
        .map_err(|e| SnapshotError::PdfError {
            message: e.to_string(),
        })?;

    Ok(release_text(pages))
}

/// Joins the leading pages of a release; later pages are annexure tables.
fn release_text(pages: Vec<String>) -> String {
    pages
        .into_iter()
        .take(PAGES_SCANNED)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headline figure and reference month from the release text.
pub fn parse_release_text(text: &str, pdf_url: &str) -> Observation {
    let value = HEADLINE_INFLATION
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(format::percent)
        .unwrap_or_else(|| UNAVAILABLE.to_string());

    let date = match RELEASE_MONTH.captures(text) {
        Some(caps) => format!("{} {}", title_case(&caps[1]), &caps[2]),
        None => release_date(pdf_url)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
    };

    Observation::new(value, date)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
