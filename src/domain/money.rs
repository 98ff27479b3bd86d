use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Currency marker expected at the start of shorthand text.
pub const CURRENCY_MARKER: &str = "Rp";

/// Largest magnitude a price can carry without losing precision once stored
/// as a float (2^53).
pub const MAX_EXACT_AMOUNT: i64 = 9_007_199_254_740_992;

/// Sign, currency marker, optional whitespace, then the amount with `.` as
/// thousands separator. Commas are consumed so that `1.000,50` is rejected
/// as a whole instead of silently truncated.
static SHORTHAND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-]?)Rp\s*(?P<amount>[0-9.,]+)").expect("valid shorthand regex")
});

/// The structured result of parsing shorthand text such as `+Rp 60.000 PC Gaming`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAmount {
    /// Signed whole amount. Positive is income, negative is expense.
    pub price: i64,
    /// Label following the price prefix, trimmed. May be empty.
    pub name: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid format: expected a price like '+Rp 60.000' at the start")]
    InvalidFormat,

    #[error("invalid amount: '{0}' is not a whole number")]
    InvalidAmount(String),
}

/// Parse shorthand text into a signed price and a label.
///
/// Examples:
/// - `"+Rp 60.000 PC Gaming"` -> `60000`, `"PC Gaming"`
/// - `"-Rp 15.500 Lunch"` -> `-15500`, `"Lunch"`
/// - `"Rp1.234.567"` -> `1234567`, `""`
pub fn parse_shorthand(raw: &str) -> Result<ParsedAmount, ParseError> {
    let captures = SHORTHAND_PREFIX
        .captures(raw)
        .ok_or(ParseError::InvalidFormat)?;

    let prefix_len = captures.get(0).map_or(0, |m| m.end());
    let sign = captures.name("sign").map_or("", |m| m.as_str());
    let amount = captures.name("amount").map_or("", |m| m.as_str());

    let digits: String = amount.chars().filter(|c| *c != '.').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::InvalidAmount(amount.to_string()));
    }

    let magnitude = digits
        .parse::<i64>()
        .ok()
        .filter(|value| *value <= MAX_EXACT_AMOUNT)
        .ok_or_else(|| ParseError::InvalidAmount(amount.to_string()))?;
    let price = if sign == "-" { -magnitude } else { magnitude };

    Ok(ParsedAmount {
        price,
        name: raw[prefix_len..].trim().to_string(),
    })
}

/// Format an amount the way Indonesian locales display money.
/// Example: 60000.0 -> "Rp 60.000", -1234.5 -> "-Rp 1.234,5"
pub fn format_rupiah(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{} {}", sign, CURRENCY_MARKER, group_thousands(amount.abs()))
}

fn group_thousands(value: f64) -> String {
    // Up to three fraction digits, matching the usual locale output.
    let rounded = format!("{:.3}", value);
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        grouped
    } else {
        format!("{},{}", grouped, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_income_and_expense() {
        assert_eq!(
            parse_shorthand("+Rp 60.000 PC Gaming"),
            Ok(ParsedAmount {
                price: 60000,
                name: "PC Gaming".to_string()
            })
        );
        assert_eq!(
            parse_shorthand("-Rp 15.500 Lunch"),
            Ok(ParsedAmount {
                price: -15500,
                name: "Lunch".to_string()
            })
        );
    }

    #[test]
    fn test_parse_defaults_to_positive() {
        let parsed = parse_shorthand("Rp 2.000 Refund").unwrap();
        assert_eq!(parsed.price, 2000);
        assert_eq!(parsed.name, "Refund");
    }

    #[test]
    fn test_parse_strips_all_separators() {
        assert_eq!(parse_shorthand("Rp 1.234.567 Car").unwrap().price, 1234567);
        assert_eq!(parse_shorthand("-Rp1.000Coffee").unwrap().price, -1000);
        assert_eq!(parse_shorthand("-Rp1.000Coffee").unwrap().name, "Coffee");
    }

    #[test]
    fn test_parse_trims_label() {
        let parsed = parse_shorthand("+Rp   500    Parking   ").unwrap();
        assert_eq!(parsed.price, 500);
        assert_eq!(parsed.name, "Parking");
    }

    #[test]
    fn test_parse_allows_empty_label() {
        let parsed = parse_shorthand("+Rp 60.000").unwrap();
        assert_eq!(parsed.price, 60000);
        assert_eq!(parsed.name, "");

        assert_eq!(parse_shorthand("-Rp 5   ").unwrap().name, "");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert_eq!(parse_shorthand("no price here"), Err(ParseError::InvalidFormat));
        assert_eq!(parse_shorthand(""), Err(ParseError::InvalidFormat));
        assert_eq!(parse_shorthand("60.000 Rp"), Err(ParseError::InvalidFormat));
        assert_eq!(parse_shorthand("+Rp PC Gaming"), Err(ParseError::InvalidFormat));
        assert_eq!(parse_shorthand("$ 100 Lunch"), Err(ParseError::InvalidFormat));
        // Anchored at the very first character.
        assert_eq!(parse_shorthand(" +Rp 100 Lunch"), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_parse_rejects_non_numeric_amount() {
        assert_eq!(
            parse_shorthand("+Rp ... Dots"),
            Err(ParseError::InvalidAmount("...".to_string()))
        );
        assert_eq!(
            parse_shorthand("Rp 1.000,50 Snack"),
            Err(ParseError::InvalidAmount("1.000,50".to_string()))
        );
        assert!(matches!(
            parse_shorthand("Rp 99999999999999999999 Lottery"),
            Err(ParseError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_parse_rejects_amounts_beyond_exact_range() {
        let parsed = parse_shorthand("Rp 9.007.199.254.740.992 Max").unwrap();
        assert_eq!(parsed.price, MAX_EXACT_AMOUNT);
        assert_eq!(parsed.price as f64 as i64, MAX_EXACT_AMOUNT);

        assert_eq!(
            parse_shorthand("-Rp 9.007.199.254.740.992 Min").unwrap().price,
            -MAX_EXACT_AMOUNT
        );
        assert_eq!(
            parse_shorthand("Rp 9.007.199.254.740.993 Too much"),
            Err(ParseError::InvalidAmount("9.007.199.254.740.993".to_string()))
        );
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(500.0), "Rp 500");
        assert_eq!(format_rupiah(60000.0), "Rp 60.000");
        assert_eq!(format_rupiah(1234567.0), "Rp 1.234.567");
        assert_eq!(format_rupiah(-15500.0), "-Rp 15.500");
        assert_eq!(format_rupiah(1234.5), "Rp 1.234,5");
        assert_eq!(format_rupiah(0.125), "Rp 0,125");
    }
}
