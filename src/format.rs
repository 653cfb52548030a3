// 💲 Formatting helpers - money and dates for the presentation layer
//
// Money follows en-US conventions: symbol first, comma thousands separators,
// minor units per currency. Dates render as "MMM dd, yyyy".

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parse a date-bearing field into a UTC instant.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 timestamps, and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps (read as UTC).
pub fn parse_date(input: &str) -> AnalyticsResult<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    Err(AnalyticsError::InvalidDate(input.to_string()))
}

/// Parse a date-bearing field and keep only its calendar date (UTC).
pub fn parse_calendar_date(input: &str) -> AnalyticsResult<NaiveDate> {
    parse_date(input).map(|dt| dt.date_naive())
}

// ============================================================================
// DATE FORMATTING
// ============================================================================

/// Render a date as `"Jan 05, 2025"`.
pub fn format_date(input: &str) -> AnalyticsResult<String> {
    let date = parse_calendar_date(input)?;
    Ok(date.format("%b %d, %Y").to_string())
}

/// Chart label for a calendar month, e.g. `"Jan 2025"`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Sortable month key, e.g. `"2025-01"`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ============================================================================
// CURRENCY FORMATTING
// ============================================================================

/// Symbol and number of fraction digits for an ISO 4217 code.
fn currency_style(code: &str) -> (Option<&'static str>, usize) {
    match code {
        "USD" => (Some("$"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "JPY" => (Some("¥"), 0),
        "KRW" => (Some("₩"), 0),
        "INR" => (Some("₹"), 2),
        "CNY" => (Some("CN¥"), 2),
        "CAD" => (Some("CA$"), 2),
        "AUD" => (Some("A$"), 2),
        "MXN" => (Some("MX$"), 2),
        "BRL" => (Some("R$"), 2),
        _ => (None, 2),
    }
}

/// Insert comma separators into the integer part of a plain decimal string.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

/// Format a money amount in en-US style for the given ISO currency code.
///
/// `format_currency(19.99, "USD") == "$19.99"`,
/// `format_currency(-1234.5, "EUR") == "-€1,234.50"`.
/// Codes without a known symbol render as `"CHF 10.00"`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let (symbol, fraction_digits) = currency_style(&code);

    let magnitude = format!("{:.*}", fraction_digits, amount.abs());
    let is_negative = amount < 0.0 && magnitude.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if is_negative { "-" } else { "" };
    let grouped = group_thousands(&magnitude);

    match symbol {
        Some(symbol) => format!("{}{}{}", sign, symbol, grouped),
        None => format!("{}{} {}", sign, code, grouped),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_format_currency_usd() {
        assert_eq!(format_currency(19.99, "USD"), "$19.99");
        assert_eq!(format_currency(0.0, "USD"), "$0.00");
        assert_eq!(format_currency(1234567.891, "USD"), "$1,234,567.89");
    }

    #[test]
    fn test_format_currency_other_codes() {
        assert_eq!(format_currency(-1234.5, "EUR"), "-€1,234.50");
        assert_eq!(format_currency(1500.0, "jpy"), "¥1,500");
        assert_eq!(format_currency(10.0, "CHF"), "CHF 10.00");
    }

    #[test]
    fn test_format_currency_no_negative_zero() {
        assert_eq!(format_currency(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("999.00"), "999.00");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456.7"), "123,456.7");
    }

    #[test]
    fn test_parse_date_formats() {
        let d = parse_date("2025-01-15").unwrap();
        assert_eq!(d.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(d.hour(), 0);

        let d = parse_date("2025-01-15T10:30:00Z").unwrap();
        assert_eq!(d.hour(), 10);

        let d = parse_date("2025-01-15T23:30:00-05:00").unwrap();
        assert_eq!(d.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());

        let d = parse_date("2025-01-15T08:00:00").unwrap();
        assert_eq!(d.hour(), 8);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(
            parse_date("not a date"),
            Err(AnalyticsError::InvalidDate("not a date".to_string()))
        );
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-01-05").unwrap(), "Jan 05, 2025");
        assert_eq!(format_date("2024-12-31T18:00:00Z").unwrap(), "Dec 31, 2024");
        assert!(format_date("31/12/2024").is_err());
    }

    #[test]
    fn test_month_key_and_label() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(month_key(date), "2025-03");
        assert_eq!(month_label(date), "Mar 2025");
    }
}
