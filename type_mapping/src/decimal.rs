//! Fixed-scale decimals
//!
//! [`FixedDecimal`] always holds a value rounded half-up to `SCALE` fractional digits.

use crate::descriptor::Described;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedDecimal<const SCALE: u32>(Decimal);

/// Two-digit amounts
pub type Money = FixedDecimal<2>;

impl<const SCALE: u32> FixedDecimal<SCALE> {
    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);
        Self(rounded)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub const fn scale() -> u32 {
        SCALE
    }
}

impl<const SCALE: u32> From<Decimal> for FixedDecimal<SCALE> {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl<const SCALE: u32> From<FixedDecimal<SCALE>> for Decimal {
    fn from(value: FixedDecimal<SCALE>) -> Self {
        value.0
    }
}

impl<const SCALE: u32> FromStr for FixedDecimal<SCALE> {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self::new)
    }
}

impl<const SCALE: u32> fmt::Display for FixedDecimal<SCALE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", SCALE as usize, self.0)
    }
}

impl<const SCALE: u32> Described for FixedDecimal<SCALE> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_half_up() {
        let money: Money = "13.456".parse().unwrap();
        assert_eq!(money.value(), Decimal::new(1346, 2));
        assert_eq!(Money::new(Decimal::new(-1345, 3)).value(), Decimal::new(-135, 2));
        assert_eq!(Money::new(Decimal::new(1344, 3)).value(), Decimal::new(134, 2));
    }

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(Money::new(Decimal::from(5)).to_string(), "5.00");
        assert_eq!(FixedDecimal::<3>::new(Decimal::new(15, 1)).to_string(), "1.500");
        assert_eq!(FixedDecimal::<0>::new(Decimal::new(25, 1)).to_string(), "3");
    }
}
