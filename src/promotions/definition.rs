//! Promotion definitions
//!
//! A [`NewPromotion`] is the unvalidated shape of a promotion as entered by an operator. It is
//! checked against the product catalog and the codes already in use before it becomes a
//! [`Promotion`].

use decimal_percentage::Percentage;
use jiff::civil::DateTime;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    catalog::{ProductCatalog, PromotionLookup},
    discounts::is_within_bounds,
    products::ProductId,
    promotions::{
        ActivationWindow, ErrorKind, Promotion, PromotionId, PromotionMode, PromotionProducts,
        Quota, UnitRule,
    },
};

/// Reasons a promotion definition is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    /// The promo code is empty.
    #[error("promo code must not be empty")]
    EmptyPromoCode,

    /// The activation window ends before it starts.
    #[error("promotion ends before it starts")]
    EndBeforeStart,

    /// The discount is outside `0%..=100%`.
    #[error("discount must be between 0 and 100")]
    DiscountOutOfRange,

    /// The qualifying threshold is zero.
    #[error("products count must be at least 1")]
    ZeroProductsCount,

    /// No units would ever be discounted.
    #[error("discounted products count must be at least 1")]
    ZeroDiscountedProductsCount,

    /// An inclusive promotion discounts more units than it requires.
    #[error(
        "inclusive promotion requires {products_count} products but discounts {discounted_products_count}"
    )]
    InclusiveCountMismatch {
        /// Qualifying threshold
        products_count: u32,

        /// Units discounted per trigger
        discounted_products_count: u32,
    },

    /// No qualifying products.
    #[error("promotion has no qualifying products")]
    EmptyQualifyingProducts,

    /// No discounted products.
    #[error("promotion has no discounted products")]
    EmptyDiscountedProducts,

    /// A referenced product does not exist.
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// Another promotion already uses the code.
    #[error("promo code {0:?} is already in use")]
    DuplicatePromoCode(String),

    /// Another promotion already uses the id.
    #[error("promotion {0} already exists")]
    DuplicatePromotionId(PromotionId),
}

impl DefinitionError {
    /// The caller-facing kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownProduct(_) => ErrorKind::InvalidProductReference,
            _ => ErrorKind::InvalidPromotionDefinition,
        }
    }
}

/// A promotion as submitted for creation.
#[derive(Debug, Clone)]
pub struct NewPromotion {
    /// Promotion id
    pub id: PromotionId,

    /// Display name
    pub name: String,

    /// Case-sensitive promo code
    pub promo_code: String,

    /// Window start
    pub start: DateTime,

    /// Window end
    pub end: DateTime,

    /// Pricing mode
    pub mode: PromotionMode,

    /// Whether the discount scales with multiples of `products_count`
    pub accumulative: bool,

    /// Qualifying threshold
    pub products_count: u32,

    /// Units discounted per trigger
    pub discounted_products_count: u32,

    /// Promotional discount
    pub discount: Percentage,

    /// Whether flat discounts still apply to qualifying lines
    pub include_price_discounts: bool,

    /// Redemption cap
    pub quota: u32,

    /// Qualifying product ids
    pub qualifying: Vec<ProductId>,

    /// Discounted product ids, in the order gifts are handed out
    pub discounted: Vec<ProductId>,
}

impl NewPromotion {
    /// Validate the definition and split it into the promotion and its product sets.
    ///
    /// Repeated product ids are collapsed; the discounted list keeps the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] found.
    pub fn validate<C>(self, catalog: &C) -> Result<(Promotion, PromotionProducts), DefinitionError>
    where
        C: ProductCatalog + PromotionLookup,
    {
        if self.promo_code.trim().is_empty() {
            return Err(DefinitionError::EmptyPromoCode);
        }

        if self.end < self.start {
            return Err(DefinitionError::EndBeforeStart);
        }

        if !is_within_bounds(&self.discount) {
            return Err(DefinitionError::DiscountOutOfRange);
        }

        if self.products_count == 0 {
            return Err(DefinitionError::ZeroProductsCount);
        }

        if self.discounted_products_count == 0 {
            return Err(DefinitionError::ZeroDiscountedProductsCount);
        }

        if self.mode == PromotionMode::Inclusive
            && self.products_count < self.discounted_products_count
        {
            return Err(DefinitionError::InclusiveCountMismatch {
                products_count: self.products_count,
                discounted_products_count: self.discounted_products_count,
            });
        }

        if self.qualifying.is_empty() {
            return Err(DefinitionError::EmptyQualifyingProducts);
        }

        if self.discounted.is_empty() {
            return Err(DefinitionError::EmptyDiscountedProducts);
        }

        if let Some(unknown) = self
            .qualifying
            .iter()
            .chain(&self.discounted)
            .find(|product| catalog.product_details(product).is_none())
        {
            return Err(DefinitionError::UnknownProduct(unknown.clone()));
        }

        if catalog.promotion_by_code(&self.promo_code).is_some() {
            return Err(DefinitionError::DuplicatePromoCode(self.promo_code));
        }

        let qualifying: FxHashSet<ProductId> = self.qualifying.into_iter().collect();

        let mut seen = FxHashSet::default();
        let discounted: Vec<ProductId> = self
            .discounted
            .into_iter()
            .filter(|product| seen.insert(product.clone()))
            .collect();

        let promotion = Promotion {
            id: self.id,
            name: self.name,
            promo_code: self.promo_code,
            window: ActivationWindow {
                start: self.start,
                end: self.end,
            },
            mode: self.mode,
            rule: UnitRule {
                products_count: self.products_count,
                discounted_products_count: self.discounted_products_count,
                accumulative: self.accumulative,
            },
            discount: self.discount,
            include_price_discounts: self.include_price_discounts,
            quota: Quota {
                limit: self.quota,
                used: 0,
            },
        };

        Ok((
            promotion,
            PromotionProducts {
                qualifying,
                discounted,
            },
        ))
    }
}
