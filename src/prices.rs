//! Prices

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};

/// A unit or line price in a single ISO currency.
///
/// Currencies come from `rusty_money::iso`, so prices never borrow from anything shorter lived.
pub type Price = Money<'static, Currency>;

/// Zero in the given currency.
#[must_use]
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Convert a price into a decimal amount in major units (e.g. `1299` pence -> `12.99`).
#[must_use]
pub fn to_major_decimal(price: &Price) -> Decimal {
    Decimal::new(price.to_minor_units(), price.currency().exponent)
}

/// Look up one of the supported currencies by its ISO code.
#[must_use]
pub fn currency_from_code(code: &str) -> Option<&'static Currency> {
    match code {
        "GBP" => Some(GBP),
        "USD" => Some(USD),
        "EUR" => Some(EUR),
        _ => None,
    }
}
