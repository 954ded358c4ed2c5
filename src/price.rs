//! Price wire format: `"<digits>[.<1-2 digits>] <CCY>"`, e.g. `"79.99 USD"`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(?:\.([0-9]{1,2}))? ([A-Z]{3})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Price must be in format \"79.99 USD\"")]
    Format,

    #[error("Price amount is out of range")]
    OutOfRange,
}

/// A parsed price. Amounts compare exactly on minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    amount: String,
    minor_units: u64,
    currency: String,
}

impl Price {
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let caps = PRICE_PATTERN.captures(raw).ok_or(PriceError::Format)?;
        let whole: u64 = caps[1].parse().map_err(|_| PriceError::OutOfRange)?;
        let fraction = match caps.get(2) {
            Some(m) if m.as_str().len() == 1 => m.as_str().parse::<u64>().map(|d| d * 10),
            Some(m) => m.as_str().parse::<u64>(),
            None => Ok(0),
        }
        .map_err(|_| PriceError::OutOfRange)?;

        let minor_units = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(fraction))
            .ok_or(PriceError::OutOfRange)?;

        let amount = match caps.get(2) {
            Some(m) => format!("{}.{}", &caps[1], m.as_str()),
            None => caps[1].to_string(),
        };

        Ok(Self {
            amount,
            minor_units,
            currency: caps[3].to_string(),
        })
    }

    /// Amount exactly as written, without the currency.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn minor_units(&self) -> u64 {
        self.minor_units
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Display form with a currency symbol where one is known: `$79.99`, `CHF79.99`.
    pub fn display(&self) -> String {
        let symbol = match self.currency.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            other => other,
        };
        format!("{}{}", symbol, self.amount)
    }

    /// Whole-percent discount of `sale` against `self`, only when `sale` is strictly lower.
    pub fn discount_percent(&self, sale: &Price) -> Option<u32> {
        if self.minor_units == 0 || sale.minor_units >= self.minor_units {
            return None;
        }
        let saved = (self.minor_units - sale.minor_units) as f64;
        Some((saved * 100.0 / self.minor_units as f64).round() as u32)
    }
}

impl TryFrom<String> for Price {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Price::parse(&value)
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_wire_format() {
        let price = Price::parse("99.99 USD").unwrap();
        assert_eq!(price.minor_units(), 9999);
        assert_eq!(price.currency(), "USD");
        assert_eq!(price.to_string(), "99.99 USD");

        assert_eq!(Price::parse("80 EUR").unwrap().minor_units(), 8000);
        assert_eq!(Price::parse("5.5 GBP").unwrap().minor_units(), 550);
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["invalid price", "99.99usd", "99.999 USD", "99.99 US", "99.99  USD", "-1 USD", ""] {
            assert_eq!(Price::parse(raw), Err(PriceError::Format), "{raw}");
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert_eq!(
            Price::parse("99999999999999999999999 USD"),
            Err(PriceError::OutOfRange)
        );
    }

    #[test]
    fn test_discount_rounding() {
        let original = Price::parse("349.99 USD").unwrap();
        let sale = Price::parse("299.99 USD").unwrap();
        assert_eq!(original.discount_percent(&sale), Some(14));
        assert_eq!(original.discount_percent(&original), None);
    }

    #[test]
    fn test_display_symbol() {
        assert_eq!(Price::parse("10.00 USD").unwrap().display(), "$10.00");
        assert_eq!(Price::parse("10 CHF").unwrap().display(), "CHF10");
    }
}
