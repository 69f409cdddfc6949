//! Promotion Types
//!
//! The two pricing algorithms and the per-line pricing rules they share.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rustc_hash::FxHashSet;

use crate::{
    cart::CartLine,
    catalog::{FlatDiscounts, ProductCatalog},
    discounts::{discounted_price, no_discount, sum_percentages},
    prices::Price,
    products::{Product, ProductId},
    promotions::{Promotion, PromotionError},
    receipt::PricedLine,
};

mod inclusive;
mod non_inclusive;

pub use inclusive::price_inclusive;
pub use non_inclusive::{deal_round_robin, price_non_inclusive};

/// Prices individual lines for one promotion application.
#[derive(Debug)]
pub struct LinePricer<'a, P: ?Sized, F: ?Sized> {
    /// The promotion being applied
    pub promotion: &'a Promotion,

    /// Its qualifying products
    pub qualifying: &'a FxHashSet<ProductId>,

    /// Product details
    pub catalog: &'a P,

    /// Flat per-product discounts
    pub flat_discounts: &'a F,

    /// Day flat discounts are evaluated on
    pub today: Date,

    /// Cap the flat discount sum at 100%
    pub clamp_flat_discounts: bool,
}

impl<P, F> LinePricer<'_, P, F>
where
    P: ProductCatalog + ?Sized,
    F: FlatDiscounts + ?Sized,
{
    /// Whether the product counts toward the promotion's threshold.
    pub fn is_qualifying(&self, product: &ProductId) -> bool {
        self.qualifying.contains(product)
    }

    /// A line the promotion does not touch: quoted price, flat discount reported as is.
    pub fn pass_through(&self, line: &CartLine) -> PricedLine {
        let details = self.catalog.product_details(line.product());

        priced(
            line.product(),
            details,
            line.quantity(),
            *line.price(),
            *line.price(),
            self.flat_discount(line.product()),
        )
    }

    /// Undiscounted units of a qualifying line.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidProductReference`] when the list price is needed and
    /// the product is missing from the catalog.
    pub fn full_price(&self, line: &CartLine, quantity: u32) -> Result<PricedLine, PromotionError> {
        let (details, base, flat) = self.base_price(line)?;

        Ok(priced(line.product(), details, quantity, base, *line.price(), flat))
    }

    /// Units of a qualifying line that receive the promotional discount.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidProductReference`] when the list price is needed and
    /// the product is missing from the catalog, or an arithmetic error.
    pub fn discounted(&self, line: &CartLine, quantity: u32) -> Result<PricedLine, PromotionError> {
        let (details, base, _flat) = self.base_price(line)?;
        let price = discounted_price(&base, self.promotion.discount())?;

        Ok(priced(
            line.product(),
            details,
            quantity,
            price,
            *line.price(),
            *self.promotion.discount(),
        ))
    }

    /// A gift line for a discounted product, priced from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidProductReference`] when the product is missing from the
    /// catalog, or an arithmetic error.
    pub fn gift(&self, product: &ProductId, quantity: u32) -> Result<PricedLine, PromotionError> {
        let details = self
            .catalog
            .product_details(product)
            .ok_or_else(|| PromotionError::InvalidProductReference(product.clone()))?;

        let list_price = details.price;
        let price = discounted_price(&list_price, self.promotion.discount())?;

        Ok(priced(
            product,
            Some(details),
            quantity,
            price,
            list_price,
            *self.promotion.discount(),
        ))
    }

    /// Price a qualifying line starts from, and the flat discount it reports.
    ///
    /// With price discounts included the quoted price stands. Otherwise the line reverts to
    /// the catalog list price and reports no flat discount.
    fn base_price(
        &self,
        line: &CartLine,
    ) -> Result<(Option<Product>, Price, Percentage), PromotionError> {
        let details = self.catalog.product_details(line.product());

        if self.promotion.include_price_discounts() {
            let flat = self.flat_discount(line.product());

            return Ok((details, *line.price(), flat));
        }

        let product = details
            .ok_or_else(|| PromotionError::InvalidProductReference(line.product().clone()))?;
        let list_price = product.price;

        Ok((Some(product), list_price, no_discount()))
    }

    fn flat_discount(&self, product: &ProductId) -> Percentage {
        let total = self.flat_discounts.flat_discount_percent(product, self.today);

        if self.clamp_flat_discounts {
            sum_percentages([&total], true)
        } else {
            total
        }
    }
}

fn priced(
    product: &ProductId,
    details: Option<Product>,
    quantity: u32,
    price: Price,
    original_price: Price,
    discount: Percentage,
) -> PricedLine {
    let (name, image_url) = details.map_or((None, None), |d| (Some(d.name), d.image_url));

    PricedLine {
        product: product.clone(),
        name,
        image_url,
        quantity,
        price,
        original_price,
        discount,
    }
}
