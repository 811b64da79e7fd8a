//! Fixed-precision money.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Monetary value pinned to two decimal places.
///
/// Construction rounds half-away-from-zero to 2dp, so arithmetic and
/// comparisons never depend on the scale of the input literal. The currency
/// is carried by the owning account, not the value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("not a monetary amount: {e}")))?;
        Ok(Self::new(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn construction_pins_scale_to_two_places() {
        assert_eq!(Money::new(dec!(1.005)), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(1.004)), Money::new(dec!(1.00)));
        assert_eq!(Money::new(dec!(500)), Money::new(dec!(500.00)));
    }

    #[test]
    fn display_always_shows_two_places() {
        assert_eq!(Money::new(dec!(500)).to_string(), "500.00");
        assert_eq!(Money::new(dec!(0.1)).to_string(), "0.10");
    }

    #[test]
    fn checked_arithmetic_round_trips() {
        let a = Money::new(dec!(10.25));
        let b = Money::new(dec!(0.75));
        assert_eq!(a.checked_add(b), Some(Money::new(dec!(11.00))));
        assert_eq!(a.checked_sub(b), Some(Money::new(dec!(9.50))));
    }

    #[test]
    fn parses_from_text() {
        assert_eq!(" 12.5 ".parse::<Money>().unwrap(), Money::new(dec!(12.50)));
        assert!("twelve".parse::<Money>().is_err());
    }
}
