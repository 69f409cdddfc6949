//! Promotion Fixtures

use jiff::civil::DateTime;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::parse_percentage},
    products::ProductId,
    promotions::{PromotionId, PromotionMode, definition::NewPromotion},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Map of promotion id -> promotion fixture
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// Promotion Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionFixture {
    /// Display name
    pub name: String,

    /// Promo code shoppers enter
    pub promo_code: String,

    /// Start of the activation window (e.g., "2026-01-01T00:00:00")
    pub start: DateTime,

    /// End of the activation window
    pub end: DateTime,

    /// `inclusive` or `non_inclusive`
    pub mode: PromotionMode,

    /// Whether the discount repeats for every multiple of the threshold
    #[serde(default)]
    pub accumulative: bool,

    /// Qualifying units needed per trigger
    pub products_count: u32,

    /// Units discounted per trigger
    pub discounted_products_count: u32,

    /// Promotional discount (e.g., "50%" or "0.5")
    pub discount: String,

    /// Whether qualifying lines keep their flat discounts
    #[serde(default = "default_include_price_discounts")]
    pub include_price_discounts: bool,

    /// Redemption cap
    pub quota: u32,

    /// Redemptions already made
    #[serde(default)]
    pub used_quota: u32,

    /// Qualifying product ids
    pub qualifying: Vec<String>,

    /// Discounted product ids, in dealing order
    pub discounted: Vec<String>,
}

const fn default_include_price_discounts() -> bool {
    true
}

impl PromotionFixture {
    /// Convert into a promotion definition with the given id. Redemptions already made are
    /// returned alongside, since definitions always start unused.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount cannot be parsed.
    pub fn try_into_definition(self, id: &str) -> Result<(NewPromotion, u32), FixtureError> {
        let discount = parse_percentage(&self.discount)?;

        let definition = NewPromotion {
            id: PromotionId::new(id),
            name: self.name,
            promo_code: self.promo_code,
            start: self.start,
            end: self.end,
            mode: self.mode,
            accumulative: self.accumulative,
            products_count: self.products_count,
            discounted_products_count: self.discounted_products_count,
            discount,
            include_price_discounts: self.include_price_discounts,
            quota: self.quota,
            qualifying: self.qualifying.into_iter().map(ProductId::from).collect(),
            discounted: self.discounted.into_iter().map(ProductId::from).collect(),
        };

        Ok((definition, self.used_quota))
    }
}
