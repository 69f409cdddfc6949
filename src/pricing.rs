//! Line and cart totals

use rusty_money::{Money, MoneyError};
use thiserror::Error;

use crate::prices::Price;

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Unit price multiplied by quantity does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Anything priced per unit and bought in some quantity.
pub trait Priced {
    /// Price of a single unit
    fn unit_price(&self) -> &Price;

    /// Number of units
    fn quantity(&self) -> u32;
}

/// Calculates the total of a single line (unit price times quantity).
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the total does not fit in minor units.
pub fn line_total(line: &impl Priced) -> Result<Price, TotalPriceError> {
    extended_price(line.unit_price(), line.quantity())
}

/// Unit price times quantity.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the result does not fit in minor units.
pub fn extended_price(unit: &Price, quantity: u32) -> Result<Price, TotalPriceError> {
    let minor = unit
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::Overflow)?;

    Ok(Money::from_minor(minor, unit.currency()))
}
