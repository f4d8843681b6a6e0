//! Amount extraction from free text.
//!
//! Patterns are tried in a fixed order and the first match wins:
//! 1. number + thousand suffix ("25k", "25 nghìn", "25 thousand")
//! 2. number + million suffix ("1.5m", "2 triệu", "3tr")
//! 3. grouped digits ("100,000" / "100.000")
//! 4. bare digits
//!
//! Small bare numbers are read as thousands: "25" means 25,000 VND.

use anyhow::Result;
use regex::Regex;
use tracing::warn;

/// Used when nothing in the text looks like an amount.
pub const DEFAULT_AMOUNT: f64 = 50_000.0;

/// Bare literals below this are assumed to be written in thousands.
pub const SMALL_AMOUNT_THRESHOLD: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    None,
    Thousand,
    Million,
}

/// The numeric literal found in the text, before any scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountMatch {
    pub literal: f64,
    pub magnitude: Magnitude,
}

impl AmountMatch {
    pub fn value(&self) -> f64 {
        match self.magnitude {
            Magnitude::Thousand => self.literal * 1_000.0,
            Magnitude::Million => self.literal * 1_000_000.0,
            Magnitude::None => scale_small_amount(self.literal),
        }
    }
}

/// Amounts below 1000 are taken to be in thousands. Applied to every source
/// of amounts, model output included.
pub fn scale_small_amount(value: f64) -> f64 {
    if value < SMALL_AMOUNT_THRESHOLD {
        value * 1_000.0
    } else {
        value
    }
}

/// Extract an amount, falling back to [`DEFAULT_AMOUNT`].
pub fn extract_amount(text: &str) -> f64 {
    extract_amount_or(text, DEFAULT_AMOUNT)
}

/// Like [`extract_amount`] with a caller-chosen default. Literals too large
/// for an `f64` (or otherwise non-positive) also yield `default`.
pub fn extract_amount_or(text: &str, default: f64) -> f64 {
    match find_amount(text) {
        Ok(Some(m)) => {
            let value = m.value();
            if value.is_finite() && value > 0.0 {
                value
            } else {
                warn!(literal = m.literal, "amount out of range, using default");
                default
            }
        }
        Ok(None) => default,
        Err(e) => {
            warn!("amount extraction failed for {text:?}: {e}");
            default
        }
    }
}

/// Locate the first amount literal in `text`.
pub fn find_amount(text: &str) -> Result<Option<AmountMatch>> {
    let thousand_re = Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s?(?:k|nghìn|ngàn|thousand)\b")?;
    let million_re = Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s?(?:m|tr|triệu|củ|million|mil)\b")?;
    let grouped_re = Regex::new(r"\b(\d{1,3}(?:[.,]\d{3})+)\b")?;
    let bare_re = Regex::new(r"\d+")?;

    if let Some(caps) = thousand_re.captures(text) {
        if let Some(literal) = parse_decimal(&caps[1]) {
            return Ok(Some(AmountMatch { literal, magnitude: Magnitude::Thousand }));
        }
    }

    if let Some(caps) = million_re.captures(text) {
        if let Some(literal) = parse_decimal(&caps[1]) {
            return Ok(Some(AmountMatch { literal, magnitude: Magnitude::Million }));
        }
    }

    if let Some(caps) = grouped_re.captures(text) {
        let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(literal) = digits.parse::<f64>() {
            return Ok(Some(AmountMatch { literal, magnitude: Magnitude::None }));
        }
    }

    if let Some(m) = bare_re.find(text) {
        if let Ok(literal) = m.as_str().parse::<f64>() {
            return Ok(Some(AmountMatch { literal, magnitude: Magnitude::None }));
        }
    }

    Ok(None)
}

/// "1.5" and "1,5" are both one and a half.
fn parse_decimal(s: &str) -> Option<f64> {
    s.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_suffix() {
        assert_eq!(extract_amount("coffee 25k"), 25_000.0);
        assert_eq!(extract_amount("cafe 25K sáng nay"), 25_000.0);
        assert_eq!(extract_amount("trà sữa 45 nghìn"), 45_000.0);
        assert_eq!(extract_amount("1.5k tip"), 1_500.0);
    }

    #[test]
    fn test_m_suffix() {
        assert_eq!(extract_amount("tiền nhà 5m"), 5_000_000.0);
        assert_eq!(extract_amount("mua vàng 2 triệu"), 2_000_000.0);
        assert_eq!(extract_amount("laptop 1.5M"), 1_500_000.0);
        assert_eq!(extract_amount("đóng học 3tr"), 3_000_000.0);
    }

    #[test]
    fn test_first_pattern_wins() {
        // k is checked before m and before bare digits
        assert_eq!(extract_amount("2 người ăn 300k hết 1tr"), 300_000.0);
        assert_eq!(extract_amount("mua cổ phiếu 500k ngày 15/6"), 500_000.0);
    }

    #[test]
    fn test_grouped_digits() {
        assert_eq!(extract_amount("điện 100,000"), 100_000.0);
        assert_eq!(extract_amount("nước 1.250.000 đồng"), 1_250_000.0);
    }

    #[test]
    fn test_small_bare_numbers_are_thousands() {
        let m = find_amount("phở 45").unwrap().unwrap();
        assert_eq!(m.literal, 45.0);
        assert_eq!(m.magnitude, Magnitude::None);
        assert_eq!(m.value(), 45_000.0);

        // At or above the threshold the literal stands.
        assert_eq!(extract_amount("gửi xe 5000"), 5_000.0);
    }

    #[test]
    fn test_default_when_no_digits() {
        assert_eq!(extract_amount("ăn trưa"), DEFAULT_AMOUNT);
        assert_eq!(extract_amount(""), DEFAULT_AMOUNT);
        assert_eq!(extract_amount_or("nothing here", 10_000.0), 10_000.0);
    }

    #[test]
    fn test_default_when_literal_overflows() {
        let huge = "9".repeat(400);
        assert_eq!(extract_amount(&format!("cơm {huge}")), DEFAULT_AMOUNT);
        assert_eq!(extract_amount(&format!("{}k", "9".repeat(320))), DEFAULT_AMOUNT);
        assert_eq!(extract_amount_or(&huge, 20_000.0), 20_000.0);
        assert_eq!(extract_amount("0k"), DEFAULT_AMOUNT);
    }

    #[test]
    fn test_word_boundary_on_suffix() {
        // "5 mins" is not five million
        assert_eq!(extract_amount("walked 5 mins"), 5_000.0);
    }
}
