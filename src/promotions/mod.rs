//! Promotions
//!
//! A promotion is looked up by its promo code and carries two product sets: the *qualifying*
//! products whose cart quantity triggers it, and the *discounted* products that receive the
//! reduction.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::civil::DateTime;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::products::ProductId;

pub mod definition;
pub mod eligibility;
mod errors;
pub mod selection;
pub mod types;

pub use errors::{ErrorKind, PromotionError};

/// Promotion identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionId(String);

impl PromotionId {
    /// Create a promotion id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which pricing algorithm a promotion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionMode {
    /// Discounted units come out of the qualifying units already in the cart.
    Inclusive,

    /// Discounted units are separate gift lines added to the cart.
    NonInclusive,
}

/// Activation window. A promotion is active strictly between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationWindow {
    /// Window start (exclusive)
    pub start: DateTime,

    /// Window end (exclusive)
    pub end: DateTime,
}

impl ActivationWindow {
    /// Whether `now` lies strictly inside the window.
    pub fn contains(&self, now: DateTime) -> bool {
        self.start < now && now < self.end
    }
}

/// Redemption cap and the number of redemptions already consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Maximum number of redemptions
    pub limit: u32,

    /// Redemptions consumed so far
    pub used: u32,
}

impl Quota {
    /// Whether another redemption fits within the cap.
    pub const fn has_remaining(&self) -> bool {
        self.used < self.limit
    }
}

/// The count-based rule of a promotion: how many qualifying units trigger it and how many
/// units each trigger discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRule {
    /// Qualifying units needed to trigger the promotion (and the divisor for accumulation)
    pub products_count: u32,

    /// Units discounted per trigger
    pub discounted_products_count: u32,

    /// Whether every full multiple of `products_count` triggers the promotion again
    pub accumulative: bool,
}

impl UnitRule {
    /// Number of units to discount for a cart holding `qualifying_count` qualifying units.
    ///
    /// Accumulative rules grant `discounted_products_count` units per whole multiple of
    /// `products_count` (floor division); others grant `discounted_products_count` once.
    pub fn units_to_discount(&self, qualifying_count: u64) -> u64 {
        let per_trigger = u64::from(self.discounted_products_count);

        if !self.accumulative {
            return per_trigger;
        }

        qualifying_count
            .checked_div(u64::from(self.products_count))
            .map_or(0, |triggers| triggers.saturating_mul(per_trigger))
    }
}

/// A validated promotion.
///
/// Built through [`definition::NewPromotion::validate`]; immutable apart from the used quota.
#[derive(Debug, Clone)]
pub struct Promotion {
    pub(crate) id: PromotionId,
    pub(crate) name: String,
    pub(crate) promo_code: String,
    pub(crate) window: ActivationWindow,
    pub(crate) mode: PromotionMode,
    pub(crate) rule: UnitRule,
    pub(crate) discount: Percentage,
    pub(crate) include_price_discounts: bool,
    pub(crate) quota: Quota,
}

impl Promotion {
    /// Promotion id
    pub fn id(&self) -> &PromotionId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-sensitive promo code
    pub fn promo_code(&self) -> &str {
        &self.promo_code
    }

    /// Activation window
    pub fn window(&self) -> &ActivationWindow {
        &self.window
    }

    /// Pricing mode
    pub fn mode(&self) -> PromotionMode {
        self.mode
    }

    /// Unit rule
    pub fn rule(&self) -> &UnitRule {
        &self.rule
    }

    /// Promotional discount applied to discounted units
    pub fn discount(&self) -> &Percentage {
        &self.discount
    }

    /// Whether flat per-product discounts still apply to qualifying lines
    pub fn include_price_discounts(&self) -> bool {
        self.include_price_discounts
    }

    /// Redemption quota
    pub fn quota(&self) -> &Quota {
        &self.quota
    }

    /// Record one redemption against the quota.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::QuotaExceeded`] when the quota is already used up.
    pub fn redeem(&mut self) -> Result<u32, PromotionError> {
        if !self.quota.has_remaining() {
            return Err(PromotionError::QuotaExceeded {
                code: self.promo_code.clone(),
                used: self.quota.used,
                limit: self.quota.limit,
            });
        }

        self.quota.used += 1;

        Ok(self.quota.used)
    }
}

/// The two product sets attached to a promotion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionProducts {
    /// Products whose cart quantity counts toward the threshold
    pub qualifying: FxHashSet<ProductId>,

    /// Products eligible for the discount, in definition order
    pub discounted: Vec<ProductId>,
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn rule(products_count: u32, discounted_products_count: u32, accumulative: bool) -> UnitRule {
        UnitRule {
            products_count,
            discounted_products_count,
            accumulative,
        }
    }

    #[test]
    fn window_excludes_both_boundaries() {
        let window = ActivationWindow {
            start: date(2026, 1, 1).at(0, 0, 0, 0),
            end: date(2026, 1, 31).at(0, 0, 0, 0),
        };

        assert!(!window.contains(date(2026, 1, 1).at(0, 0, 0, 0)));
        assert!(window.contains(date(2026, 1, 1).at(0, 0, 0, 1)));
        assert!(window.contains(date(2026, 1, 15).at(12, 0, 0, 0)));
        assert!(!window.contains(date(2026, 1, 31).at(0, 0, 0, 0)));
        assert!(!window.contains(date(2026, 2, 1).at(0, 0, 0, 0)));
    }

    #[test]
    fn quota_is_exhausted_when_used_reaches_limit() {
        assert!(Quota { limit: 2, used: 1 }.has_remaining());
        assert!(!Quota { limit: 2, used: 2 }.has_remaining());
        assert!(!Quota { limit: 0, used: 0 }.has_remaining());
    }

    #[test]
    fn non_accumulative_rule_grants_fixed_units() {
        let rule = rule(2, 1, false);

        assert_eq!(rule.units_to_discount(2), 1);
        assert_eq!(rule.units_to_discount(9), 1);
    }

    #[test]
    fn accumulative_rule_floors_multiples() {
        let rule = rule(2, 1, true);

        assert_eq!(rule.units_to_discount(5), 2);
        assert_eq!(rule.units_to_discount(6), 3);
        assert_eq!(rule.units_to_discount(1), 0);
    }

    #[test]
    fn accumulative_rule_scales_discounted_count() {
        assert_eq!(rule(3, 2, true).units_to_discount(10), 6);
    }

    #[test]
    fn accumulative_rule_with_zero_threshold_grants_nothing() {
        assert_eq!(rule(0, 2, true).units_to_discount(10), 0);
    }
}
