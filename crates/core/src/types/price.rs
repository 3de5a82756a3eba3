//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are exact decimals, never floats: line totals and order totals are
//! computed with `rust_decimal` so `3 x 19.99` is `59.97`, not `59.970000001`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(cents, 2),
            currency_code,
        }
    }

    /// Multiply the unit price by a quantity, keeping the currency.
    #[must_use]
    pub fn times(&self, quantity: i64) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    BRL,
}

impl CurrencyCode {
    /// The currency symbol used when formatting prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
            Self::BRL => "R$",
        }
    }

    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::BRL => "BRL",
        }
    }
}

/// Error parsing a currency code from a string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown currency code: {0}")]
pub struct CurrencyCodeError(pub String);

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "BRL" => Ok(Self::BRL),
            _ => Err(CurrencyCodeError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimal_places() {
        let price = Price::new("19.99".parse().unwrap(), CurrencyCode::USD);
        assert_eq!(price.display(), "$19.99");

        // A single trailing decimal is padded
        let price = Price::new("179.9".parse().unwrap(), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$179.90");

        // Whole amounts gain cents
        let price = Price::new("100".parse().unwrap(), CurrencyCode::GBP);
        assert_eq!(price.display(), "\u{a3}100.00");
    }

    #[test]
    fn test_from_cents() {
        let price = Price::from_cents(1099, CurrencyCode::USD);
        assert_eq!(price.display(), "$10.99");
    }

    #[test]
    fn test_times_is_exact() {
        let unit = Price::new("19.99".parse().unwrap(), CurrencyCode::USD);
        let line = unit.times(3);
        assert_eq!(line.amount, "59.97".parse::<Decimal>().unwrap());
        assert_eq!(line.display(), "$59.97");
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("BRL".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_default_currency() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::USD);
    }
}
