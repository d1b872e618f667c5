//! # Money Types
//!
//! Currency and price types. Amounts are always held in the smallest
//! currency unit, which is what Stripe expects on the wire.

use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the lowercase ISO 4217 code Stripe uses
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
            Currency::CHF => "chf",
            Currency::MXN => "mxn",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::EUR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "jpy" => Ok(Currency::JPY),
            "cad" => Ok(Currency::CAD),
            "aud" => Ok(Currency::AUD),
            "chf" => Ok(Currency::CHF),
            "mxn" => Ok(Currency::MXN),
            other => Err(PaymentError::Configuration(format!(
                "unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for EUR)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Format for display (e.g., "€29.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
        };
        let places = self.currency.decimal_places() as u32;
        if places == 0 {
            format!("{}{}", symbol, self.amount)
        } else {
            let divisor = 10_i64.pow(places);
            format!(
                "{}{}.{:0width$}",
                symbol,
                self.amount / divisor,
                (self.amount % divisor).abs(),
                width = places as usize
            )
        }
    }
}

/// The single plan this backend sells
impl Default for Price {
    fn default() -> Self {
        Self::from_cents(2900, Currency::EUR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::EUR);
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::USD);
        assert!("xyz".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_display_is_uppercase() {
        assert_eq!(Currency::EUR.to_string(), "EUR");
        assert_eq!(Currency::EUR.as_str(), "eur");
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::default().display(), "€29.00");
        assert_eq!(Price::from_cents(1205, Currency::USD).display(), "$12.05");
        assert_eq!(Price::from_cents(500, Currency::JPY).display(), "¥500");
    }
}
