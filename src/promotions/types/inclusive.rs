//! Inclusive promotions
//!
//! Discounted units come out of the qualifying units already in the cart. Lines are walked in
//! cart order and the discount is handed out until `units_to_discount` units have received it;
//! a line straddling that boundary is split into a discounted part and a full price part.

use crate::{
    cart::Cart,
    catalog::{FlatDiscounts, ProductCatalog},
    products::ProductId,
    promotions::{PromotionError, types::LinePricer},
    receipt::PricedLine,
};

/// Price `cart` under an inclusive promotion.
///
/// Only lines whose product is both qualifying and in `discounted` receive the discount.
/// Other qualifying lines follow the flat discount policy and the rest pass through.
///
/// # Errors
///
/// Returns a [`PromotionError`] if a required list price is missing or arithmetic fails.
pub fn price_inclusive<P, F>(
    pricer: &LinePricer<'_, P, F>,
    cart: &Cart,
    discounted: &[ProductId],
    units_to_discount: u64,
) -> Result<Vec<PricedLine>, PromotionError>
where
    P: ProductCatalog + ?Sized,
    F: FlatDiscounts + ?Sized,
{
    let mut lines = Vec::with_capacity(cart.len() + 1);
    let mut units_given: u64 = 0;

    for line in cart.iter() {
        if !pricer.is_qualifying(line.product()) {
            lines.push(pricer.pass_through(line));
            continue;
        }

        if !discounted.contains(line.product()) {
            lines.push(pricer.full_price(line, line.quantity())?);
            continue;
        }

        let remaining = units_to_discount.saturating_sub(units_given);

        if remaining == 0 {
            lines.push(pricer.full_price(line, line.quantity())?);
            continue;
        }

        // Bounded by the line quantity, so it always fits.
        let take = u32::try_from(remaining.min(u64::from(line.quantity())))
            .unwrap_or(line.quantity());

        lines.push(pricer.discounted(line, take)?);

        if take < line.quantity() {
            lines.push(pricer.full_price(line, line.quantity() - take)?);
        }

        units_given += u64::from(take);
    }

    Ok(lines)
}
