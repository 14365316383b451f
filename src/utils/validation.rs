use crate::utils::error::{Result, SnapshotError};
use chrono::format::{Item, StrftimeItems};
use chrono::FixedOffset;
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SnapshotError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_unique<'a>(
    field_name: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(SnapshotError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

/// Parses a `+HH:MM` / `-HH:MM` offset.
pub fn parse_utc_offset(field_name: &str, value: &str) -> Result<FixedOffset> {
    let invalid = |reason: &str| SnapshotError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid("Offset must start with '+' or '-'")),
    };

    let two_digits = |part: &str| -> Option<i32> {
        (part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit()))
            .then(|| part.parse().ok())
            .flatten()
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| invalid("Offset must look like +HH:MM"))?;
    let hours = two_digits(hours).ok_or_else(|| invalid("Offset hours must be two digits"))?;
    let minutes =
        two_digits(minutes).ok_or_else(|| invalid("Offset minutes must be two digits"))?;
    if hours > 23 || minutes > 59 {
        return Err(invalid("Offset out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| invalid("Offset out of range"))
}

/// Rejects strftime patterns chrono cannot render, e.g. an unknown `%Q`.
pub fn validate_strftime(field_name: &str, pattern: &str) -> Result<()> {
    validate_non_empty_string(field_name, pattern)?;
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(SnapshotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Unsupported strftime specifier".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoints.worldbank", "https://example.com").is_ok());
        assert!(validate_url("endpoints.worldbank", "http://example.com").is_ok());
        assert!(validate_url("endpoints.worldbank", "").is_err());
        assert!(validate_url("endpoints.worldbank", "invalid-url").is_err());
        assert!(validate_url("endpoints.worldbank", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("http.timeout_seconds", 10, 1, 300).is_ok());
        assert!(validate_range("http.timeout_seconds", 0, 1, 300).is_err());
        assert!(validate_range("http.timeout_seconds", 301, 1, 300).is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("sections", ["india", "us"]).is_ok());
        assert!(validate_unique("sections", ["india", "us", "india"]).is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        let ist = parse_utc_offset("report.utc_offset", "+05:30").unwrap();
        assert_eq!(ist.local_minus_utc(), 5 * 3600 + 30 * 60);

        let est = parse_utc_offset("report.utc_offset", "-05:00").unwrap();
        assert_eq!(est.local_minus_utc(), -5 * 3600);

        assert!(parse_utc_offset("report.utc_offset", "05:30").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+5").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+24:00").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+-05:30").is_err());
        assert!(parse_utc_offset("report.utc_offset", "++05:30").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+5:30").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+05:3").is_err());
        assert!(parse_utc_offset("report.utc_offset", "+05:-3").is_err());
    }

    #[test]
    fn test_validate_strftime() {
        assert!(validate_strftime("report.timestamp_format", "%Y-%m-%d %I:%M %p").is_ok());
        assert!(validate_strftime("report.timestamp_format", "%Y-%Q").is_err());
        assert!(validate_strftime("report.timestamp_format", "%").is_err());
        assert!(validate_strftime("report.timestamp_format", "  ").is_err());
    }
}
