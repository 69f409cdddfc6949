//! Eligibility
//!
//! Decides whether a promo code applies to a cart at a given moment. Checks run in a fixed order
//! and the first failure wins, so a promotion outside its window is reported as inactive even
//! when its quota is also used up.

use jiff::civil::DateTime;
use rustc_hash::FxHashSet;

use crate::{
    cart::Cart,
    catalog::PromotionLookup,
    products::ProductId,
    promotions::{Promotion, PromotionError, PromotionProducts},
};

/// A promotion that applies to the cart, with everything pricing needs to know about it.
#[derive(Debug, Clone)]
pub struct Eligible {
    /// The promotion
    pub promotion: Promotion,

    /// Its qualifying and discounted product sets
    pub products: PromotionProducts,

    /// Units in the cart whose product is qualifying
    pub qualifying_count: u64,

    /// Qualifying products present in the cart
    pub qualifying_in_cart: FxHashSet<ProductId>,
}

/// Sum the quantities of the cart lines whose product is in `qualifying`.
pub fn count_qualifying(cart: &Cart, qualifying: &FxHashSet<ProductId>) -> (u64, FxHashSet<ProductId>) {
    cart.iter()
        .filter(|line| qualifying.contains(line.product()))
        .fold((0, FxHashSet::default()), |(count, mut present), line| {
            present.insert(line.product().clone());

            (count + u64::from(line.quantity()), present)
        })
}

/// Check that the promotion registered under `code` applies to `cart` at `now`.
///
/// # Errors
///
/// In order of precedence:
/// - [`PromotionError::NotFound`]: no promotion for the code.
/// - [`PromotionError::NotActive`]: `now` is not strictly inside the activation window.
/// - [`PromotionError::QuotaExceeded`]: every redemption has been used.
/// - [`PromotionError::EligibilityNotMet`]: too few qualifying units in the cart.
pub fn evaluate<L>(
    lookup: &L,
    code: &str,
    cart: &Cart,
    now: DateTime,
) -> Result<Eligible, PromotionError>
where
    L: PromotionLookup + ?Sized,
{
    let promotion = lookup
        .promotion_by_code(code)
        .ok_or_else(|| PromotionError::NotFound(code.to_string()))?;

    if !promotion.window().contains(now) {
        return Err(PromotionError::NotActive {
            code: code.to_string(),
            now,
        });
    }

    let quota = promotion.quota();

    if !quota.has_remaining() {
        return Err(PromotionError::QuotaExceeded {
            code: code.to_string(),
            used: quota.used,
            limit: quota.limit,
        });
    }

    let qualifying = lookup.qualifying_product_ids(promotion.id());
    let (qualifying_count, qualifying_in_cart) = count_qualifying(cart, &qualifying);
    let required = promotion.rule().products_count;

    if qualifying_count < u64::from(required) {
        return Err(PromotionError::EligibilityNotMet {
            qualifying: qualifying_count,
            required,
        });
    }

    let discounted = lookup.discounted_product_ids(promotion.id());

    Ok(Eligible {
        promotion,
        products: PromotionProducts {
            qualifying,
            discounted,
        },
        qualifying_count,
        qualifying_in_cart,
    })
}
