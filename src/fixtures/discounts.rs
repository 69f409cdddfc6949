//! Flat Discount Fixtures

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::parse_percentage},
    flat_discounts::FlatDiscount,
};

/// Wrapper for flat discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Map of discount id -> discount fixture
    #[serde(default)]
    pub discounts: FxHashMap<String, DiscountFixture>,
}

/// Flat Discount Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscountFixture {
    /// Display name
    pub name: String,

    /// Discount (e.g., "10%" or "0.1")
    pub discount: String,

    /// First day the discount applies
    pub start: Date,

    /// Last day the discount applies
    pub end: Date,

    /// Product ids the discount is assigned to
    #[serde(default)]
    pub products: Vec<String>,
}

impl DiscountFixture {
    /// Build the flat discount with the given id. Products are returned separately, since
    /// assignment is checked against the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount cannot be parsed or is rejected on creation.
    pub fn try_into_flat_discount(
        self,
        id: &str,
    ) -> Result<(FlatDiscount, Vec<String>), FixtureError> {
        let discount = parse_percentage(&self.discount)?;
        let flat = FlatDiscount::new(id, self.name, discount, self.start, self.end)?;

        Ok((flat, self.products))
    }
}
