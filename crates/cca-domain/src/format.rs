//! Display formatting following es-ES conventions.
//!
//! Numbers use `.` for thousands and `,` for decimals. Like the es-ES locale,
//! grouping only kicks in from five integer digits (`1234` but `12.345`).
//! Dates are rendered in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NOT_AVAILABLE: &str = "N/A";

/// Format a count or amount with up to three fraction digits
#[must_use]
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => localize(v, 3, false),
        _ => "0".to_string(),
    }
}

/// Format a signed change. Zero or missing changes render nothing.
#[must_use]
pub fn format_change(change: Option<f64>, is_percentage: bool) -> Option<String> {
    let change = change.filter(|c| *c != 0.0 && c.is_finite())?;
    let sign = if change > 0.0 { "+" } else { "" };

    Some(if is_percentage {
        format!("{sign}{change:.2}%")
    } else {
        format!("{sign}{}", format_number(Some(change)))
    })
}

/// Format an amount as euros, e.g. `12.345,60 €`
#[must_use]
pub fn format_currency_eur(amount: Option<f64>) -> String {
    match amount {
        Some(v) if v.is_finite() => format!("{}\u{a0}€", localize(v, 2, true)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `DD/MM/YY`, or `N/A` when absent
#[must_use]
pub fn format_short_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.format("%d/%m/%y").to_string())
}

/// `DD/MM/YYYY`, or `N/A` when absent
#[must_use]
pub fn format_long_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// `DD/MM/YY - DD/MM/YY`
#[must_use]
pub fn format_date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    format!("{} - {}", format_short_date(start), format_short_date(end))
}

/// Chart axis label from a backend date string. Unparseable or empty input
/// yields an empty label.
#[must_use]
pub fn format_chart_label(raw: &str) -> String {
    parse_backend_date(raw).map_or_else(String::new, |d| d.format("%d/%m/%y").to_string())
}

/// Parse the date shapes the backend emits: RFC 3339 timestamps, naive
/// timestamps and plain `YYYY-MM-DD` days.
#[must_use]
pub fn parse_backend_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn localize(value: f64, max_fraction: usize, fixed: bool) -> String {
    let rendered = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = if fixed { frac_part } else { frac_part.trim_end_matches('0') };

    let negative = value < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac_part.is_empty());

    let mut out = String::with_capacity(rendered.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    if digits.len() < 5 {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(None), "0");
        assert_eq!(format_number(Some(0.0)), "0");
        assert_eq!(format_number(Some(999.0)), "999");
        assert_eq!(format_number(Some(1234.0)), "1234");
        assert_eq!(format_number(Some(12_345.0)), "12.345");
        assert_eq!(format_number(Some(1_234_567.0)), "1.234.567");
        assert_eq!(format_number(Some(12_345.678_9)), "12.345,679");
        assert_eq!(format_number(Some(-12_345.5)), "-12.345,5");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(None, false), None);
        assert_eq!(format_change(Some(0.0), true), None);
        assert_eq!(format_change(Some(15.0), false).as_deref(), Some("+15"));
        assert_eq!(format_change(Some(-3.456), true).as_deref(), Some("-3.46%"));
        assert_eq!(format_change(Some(12.5), true).as_deref(), Some("+12.50%"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency_eur(Some(5.0)), "5,00\u{a0}€");
        assert_eq!(format_currency_eur(Some(1234.5)), "1234,50\u{a0}€");
        assert_eq!(format_currency_eur(Some(12_345.6)), "12.345,60\u{a0}€");
        assert_eq!(format_currency_eur(None), "N/A");
    }

    #[test]
    fn test_dates() {
        let d = Utc.with_ymd_and_hms(2025, 3, 7, 10, 0, 0).unwrap();
        assert_eq!(format_short_date(Some(d)), "07/03/25");
        assert_eq!(format_long_date(Some(d)), "07/03/2025");
        assert_eq!(format_short_date(None), "N/A");
        assert_eq!(format_date_range(Some(d), None), "07/03/25 - N/A");
    }

    #[test]
    fn test_chart_label() {
        assert_eq!(format_chart_label("2025-01-02"), "02/01/25");
        assert_eq!(format_chart_label("2025-01-02T23:00:00.000Z"), "02/01/25");
        assert_eq!(format_chart_label(""), "");
        assert_eq!(format_chart_label("ayer"), "");
    }
}
