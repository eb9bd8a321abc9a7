//! Text formatting for command output.

use chrono::NaiveDate;
use construction_core::DATE_FORMAT;

pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// Formats a dollar amount with thousands separators and `decimals`
/// fractional digits, e.g. `$100,000` or `$1,250.50`.
pub(crate) fn currency(amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

pub(crate) fn currency_or_na(amount: Option<f64>, decimals: usize) -> String {
    amount.map_or_else(|| NOT_AVAILABLE.to_string(), |a| currency(a, decimals))
}

/// Quantities print without a trailing `.0` for whole numbers.
pub(crate) fn quantity(value: f64) -> String {
    value.to_string()
}

pub(crate) fn date_or(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map_or_else(|| fallback.to_string(), |d| d.format(DATE_FORMAT).to_string())
}

pub(crate) fn text_or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}
