//! Parsing and validation of user-supplied field values.
//!
//! These helpers are shared by the interactive prompts (which retry until a
//! value parses) and the flag path (which drops a malformed optional value
//! with a warning). Each returns a [`ValidationError`] describing what was
//! wrong with the input.
//!
//! # Examples
//!
//! ```
//! use construction_core::{parse_amount, parse_date, ValidationError};
//!
//! assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
//! assert!(matches!(parse_amount("-3"), Err(ValidationError::Negative(_))));
//! assert!(parse_date("2024-02-30").is_err());
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::RecordId;

/// Date format accepted for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace-only.
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    /// Input is not a number.
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
    /// Number is below zero where only non-negative values make sense.
    #[error("'{0}' must not be negative")]
    Negative(String),
    /// Number must be strictly greater than zero.
    #[error("'{0}' must be greater than zero")]
    NotPositive(String),
    /// Input is not a whole number of days or a valid id.
    #[error("'{0}' is not a valid whole number")]
    InvalidInteger(String),
    /// Input is not a `YYYY-MM-DD` calendar date.
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Trims `input` and rejects it if nothing is left.
pub fn require_text(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(trimmed.to_string())
}

/// Parses a non-negative money amount (budget, unit cost).
///
/// A leading `$` and thousands separators are accepted.
pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    let value = parse_number(input)?;
    if value < 0.0 {
        return Err(ValidationError::Negative(input.trim().to_string()));
    }
    Ok(value)
}

/// Parses a strictly positive quantity (order size).
pub fn parse_quantity(input: &str) -> Result<f64, ValidationError> {
    let value = parse_number(input)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive(input.trim().to_string()));
    }
    Ok(value)
}

/// Parses a non-negative stock level.
pub fn parse_stock_level(input: &str) -> Result<f64, ValidationError> {
    let value = parse_number(input)?;
    if value < 0.0 {
        return Err(ValidationError::Negative(input.trim().to_string()));
    }
    Ok(value)
}

/// Parses a non-negative whole number of days.
pub fn parse_days(input: &str) -> Result<i64, ValidationError> {
    let trimmed = input.trim();
    let days: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidInteger(trimmed.to_string()))?;
    if days < 0 {
        return Err(ValidationError::Negative(trimmed.to_string()));
    }
    Ok(days)
}

/// Parses a positive record id.
pub fn parse_id(input: &str) -> Result<RecordId, ValidationError> {
    let trimmed = input.trim();
    let id: RecordId = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidInteger(trimmed.to_string()))?;
    if id <= 0 {
        return Err(ValidationError::NotPositive(trimmed.to_string()));
    }
    Ok(id)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

fn parse_number(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Riverside ").unwrap(), "Riverside");
        assert_eq!(
            require_text("name", "   ").unwrap_err(),
            ValidationError::Empty("name")
        );
    }

    #[test]
    fn test_parse_amount_accepts_currency_formatting() {
        assert_eq!(parse_amount("100000").unwrap(), 100_000.0);
        assert_eq!(parse_amount("$100,000").unwrap(), 100_000.0);
        assert_eq!(parse_amount(" 5.50 ").unwrap(), 5.5);
        assert_eq!(parse_amount("0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert!(matches!(
            parse_amount("lots"),
            Err(ValidationError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_amount("-10"),
            Err(ValidationError::Negative(_))
        ));
        assert!(matches!(
            parse_amount("NaN"),
            Err(ValidationError::InvalidNumber(_))
        ));
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_quantity_requires_positive() {
        assert_eq!(parse_quantity("20").unwrap(), 20.0);
        assert_eq!(parse_quantity("2.5").unwrap(), 2.5);
        assert!(matches!(
            parse_quantity("0"),
            Err(ValidationError::NotPositive(_))
        ));
        assert!(parse_quantity("-1").is_err());
    }

    #[test]
    fn test_parse_stock_level_allows_zero() {
        assert_eq!(parse_stock_level("0").unwrap(), 0.0);
        assert!(parse_stock_level("-5").is_err());
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days("30").unwrap(), 30);
        assert!(matches!(
            parse_days("1.5"),
            Err(ValidationError::InvalidInteger(_))
        ));
        assert!(matches!(parse_days("-2"), Err(ValidationError::Negative(_))));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(parse_id("0").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(matches!(
            parse_date("15/03/2024"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(parse_date("2024-02-30").is_err());
    }
}
