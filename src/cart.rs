//! Cart

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{prices::Price, products::ProductId};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was requested with a zero quantity.
    #[error("Line {0} has a zero quantity")]
    ZeroQuantity(usize),

    /// A line has a negative unit price.
    #[error("Line {0} has a negative price")]
    NegativePrice(usize),

    /// The cart is priced in a currency other than the one configured.
    #[error("cart has currency {found}, expected {expected}")]
    UnexpectedCurrency {
        /// Cart currency
        found: &'static str,

        /// Configured currency
        expected: &'static str,
    },

    /// The cart holds no lines.
    #[error("cart is empty")]
    Empty,
}

/// A requested purchase of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: ProductId,
    quantity: u32,
    price: Price,
}

impl CartLine {
    /// Create a new cart line.
    pub fn new(product: impl Into<ProductId>, quantity: u32, price: Price) -> Self {
        Self {
            product: product.into(),
            quantity,
            price,
        }
    }

    /// Returns the product of the line
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Returns the requested quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price the shopper was quoted
    pub fn price(&self) -> &Price {
        &self.price
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// Lines for the same product may repeat; they are kept in the order given.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line has a zero quantity, a negative price or a
    /// currency other than the cart's.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.price().currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity() == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            if line.price().to_minor_units() < 0 {
                return Err(CartError::NegativePrice(i));
            }

            Ok(())
        })?;

        Ok(Cart { lines, currency })
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn test_lines() -> [CartLine; 3] {
        [
            CartLine::new("tea", 1, Money::from_minor(100, GBP)),
            CartLine::new("mug", 2, Money::from_minor(200, GBP)),
            CartLine::new("tea", 3, Money::from_minor(300, GBP)),
        ]
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(GBP);

        assert_eq!(cart.currency, GBP);
        assert!(cart.is_empty());
    }

    #[test]
    fn with_lines_currency_mismatch_errors() {
        let lines = [
            CartLine::new("tea", 1, Money::from_minor(100, GBP)),
            CartLine::new("mug", 1, Money::from_minor(100, USD)),
        ];

        let result = Cart::with_lines(lines, GBP);

        assert_eq!(
            result.err(),
            Some(CartError::CurrencyMismatch(
                1,
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_lines_rejects_zero_quantity() {
        let lines = [CartLine::new("tea", 0, Money::from_minor(100, GBP))];

        assert_eq!(
            Cart::with_lines(lines, GBP).err(),
            Some(CartError::ZeroQuantity(0))
        );
    }

    #[test]
    fn with_lines_rejects_negative_price() {
        let lines = [
            CartLine::new("tea", 1, Money::from_minor(100, GBP)),
            CartLine::new("mug", 1, Money::from_minor(-1, GBP)),
        ];

        assert_eq!(
            Cart::with_lines(lines, GBP).err(),
            Some(CartError::NegativePrice(1))
        );
    }

    #[test]
    fn with_lines_accepts_free_lines() -> TestResult {
        let cart = Cart::with_lines([CartLine::new("tea", 1, Money::from_minor(0, GBP))], GBP)?;

        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn iter_returns_lines_in_order() -> TestResult {
        let cart = Cart::with_lines(test_lines(), GBP)?;

        let products: Vec<&str> = cart.iter().map(|line| line.product().as_str()).collect();

        assert_eq!(products, vec!["tea", "mug", "tea"]);

        Ok(())
    }
}
