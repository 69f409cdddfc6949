//! Non-inclusive promotions
//!
//! Discounted units are gifts: new lines appended after the cart, priced from the catalog. The
//! cart's own lines keep their quantities.

use crate::{
    cart::Cart,
    catalog::{FlatDiscounts, ProductCatalog},
    pricing::TotalPriceError,
    products::ProductId,
    promotions::{PromotionError, types::LinePricer},
    receipt::PricedLine,
};

/// Deal `units` across `products` one at a time, in order, starting again from the first
/// product until every unit is handed out. Products that would receive nothing are left out.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if one product's share does not fit in a line quantity.
pub fn deal_round_robin(
    products: &[ProductId],
    units: u64,
) -> Result<Vec<(&ProductId, u32)>, TotalPriceError> {
    let Ok(count) = u64::try_from(products.len()) else {
        return Err(TotalPriceError::Overflow);
    };

    if count == 0 {
        return Ok(Vec::new());
    }

    let share = units / count;
    let extra = units % count;

    (0u64..)
        .zip(products)
        .map(|(position, product)| (product, share + u64::from(position < extra)))
        .filter(|(_, units)| *units > 0)
        .map(|(product, units)| {
            u32::try_from(units)
                .map(|units| (product, units))
                .map_err(|_err| TotalPriceError::Overflow)
        })
        .collect()
}

/// Price `cart` under a non-inclusive promotion.
///
/// Cart lines come first, unchanged in quantity; qualifying lines follow the flat discount
/// policy. The gift lines for `discounted` follow, `units_to_discount` units in total.
///
/// # Errors
///
/// Returns a [`PromotionError`] if a gift or list price is missing from the catalog, or
/// arithmetic fails.
pub fn price_non_inclusive<P, F>(
    pricer: &LinePricer<'_, P, F>,
    cart: &Cart,
    discounted: &[ProductId],
    units_to_discount: u64,
) -> Result<Vec<PricedLine>, PromotionError>
where
    P: ProductCatalog + ?Sized,
    F: FlatDiscounts + ?Sized,
{
    let mut lines = cart
        .iter()
        .map(|line| {
            if pricer.is_qualifying(line.product()) {
                pricer.full_price(line, line.quantity())
            } else {
                Ok(pricer.pass_through(line))
            }
        })
        .collect::<Result<Vec<_>, PromotionError>>()?;

    for (product, units) in deal_round_robin(discounted, units_to_discount)? {
        lines.push(pricer.gift(product, units)?);
    }

    Ok(lines)
}
