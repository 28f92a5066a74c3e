//! Rental prices using decimal arithmetic.
//!
//! Products are priced per rental day. Amounts are stored in Firestore as
//! numbers (`doubleValue`) and parsed into [`Decimal`] on read, so all
//! arithmetic happens in decimal. Reads also accept decimal strings
//! (`"12.50"`).

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g. dollars, not cents).
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

    /// Price in the default currency.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Total for `quantity` units rented for `days` days.
    #[must_use]
    pub fn times(&self, quantity: u32, days: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity) * Decimal::from(days),
            currency_code: self.currency_code,
        }
    }

    /// Format for display, e.g. `$19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            amount: self.amount + rhs.amount,
            currency_code: self.currency_code,
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    TRY,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::TRY => "₺",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::usd(Decimal::new(12_5, 1));
        assert_eq!(price.display(), "$12.50");
    }

    #[test]
    fn test_times_multiplies_quantity_and_days() {
        let price = Price::usd(Decimal::new(2000, 2));
        assert_eq!(price.times(2, 3).display(), "$120.00");
    }

    #[test]
    fn test_add() {
        let a = Price::usd(Decimal::new(150, 2));
        let b = Price::usd(Decimal::new(250, 2));
        assert_eq!((a + b).display(), "$4.00");
    }
}
