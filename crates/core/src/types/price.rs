//! Price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

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

    /// Create a price from an amount in minor units (cents).
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// Format for display, e.g. `$19.99` or `-€5.00`.
    ///
    /// Rounds half away from zero to two decimal places.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}{}{:.2}",
            self.currency_code.symbol(),
            rounded.abs()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
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
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::from_cents(4999, CurrencyCode::USD);
        assert_eq!(price.display(), "$49.99");

        let price = Price::new(Decimal::new(12, 0), CurrencyCode::EUR);
        assert_eq!(price.display(), "€12.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::GBP);
        assert_eq!(price.display(), "£10.01");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::from_cents(-500, CurrencyCode::USD);
        assert_eq!(price.display(), "-$5.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
