//! Discount utilities
//!
//! Percentage arithmetic shared by promotion pricing and the flat per-product discounts.
//! Percentages are fractions (`0.25` is 25%); amounts are computed in minor units and rounded
//! half away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError};
use thiserror::Error;

use crate::prices::Price;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The fractional value of a percentage (`25%` -> `0.25`).
#[must_use]
pub fn fraction(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    (*percent) * Decimal::ONE
}

/// Percent points of a percentage (`0.25` -> `25`).
#[must_use]
pub fn percent_points(percent: &Percentage) -> Decimal {
    fraction(percent) * Decimal::ONE_HUNDRED
}

/// Build a percentage from percent points (`25` -> `0.25`).
#[must_use]
pub fn from_percent_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

/// No discount.
#[must_use]
pub fn no_discount() -> Percentage {
    Percentage::from(Decimal::ZERO)
}

/// Whether the percentage lies within `0%..=100%`.
#[must_use]
pub fn is_within_bounds(percent: &Percentage) -> bool {
    let value = fraction(percent);

    value >= Decimal::ZERO && value <= Decimal::ONE
}

/// Sum several percentages, optionally capping the result at 100%.
#[must_use]
pub fn sum_percentages<'p>(
    percentages: impl IntoIterator<Item = &'p Percentage>,
    clamp: bool,
) -> Percentage {
    let total: Decimal = percentages.into_iter().map(fraction).sum();

    if clamp {
        Percentage::from(total.min(Decimal::ONE))
    } else {
        Percentage::from(total)
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    fraction(percent)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Reduce a unit price by a percentage, never going below zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the reduction cannot be represented.
pub fn discounted_price(price: &Price, percent: &Percentage) -> Result<Price, DiscountError> {
    let original_minor = price.to_minor_units();

    let discounted_minor = original_minor
        .checked_sub(percent_of_minor(percent, original_minor)?)
        .ok_or(DiscountError::PercentConversion)?;

    Ok(Money::from_minor(0.max(discounted_minor), price.currency()))
}
