//! Flat Discounts
//!
//! Date-ranged percentage discounts attached directly to products, independent of promo codes.
//! Several may be active for a product at once; their percentages add up.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    discounts::{is_within_bounds, sum_percentages},
    products::ProductId,
};

/// Errors raised when creating or assigning flat discounts.
#[derive(Debug, Error, PartialEq)]
pub enum FlatDiscountError {
    /// Discount percentage outside `0%..=100%`.
    #[error("discount must be between 0 and 100")]
    DiscountOutOfRange,

    /// The range ends before it starts.
    #[error("flat discount {0} ends before it starts")]
    EndBeforeStart(String),

    /// A flat discount with this id already exists.
    #[error("flat discount {0} already exists")]
    AlreadyExists(String),

    /// No flat discount with this id.
    #[error("flat discount {0} not found")]
    NotFound(String),

    /// No product with this id.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),
}

/// A flat percentage discount valid on an inclusive range of days.
#[derive(Debug, Clone)]
pub struct FlatDiscount {
    id: String,
    name: String,
    discount: Percentage,
    start_date: Date,
    end_date: Date,
    products: FxHashSet<ProductId>,
}

impl FlatDiscount {
    /// Create a flat discount that targets no products yet.
    ///
    /// # Errors
    ///
    /// Returns [`FlatDiscountError::DiscountOutOfRange`] for a percentage outside `0%..=100%`
    /// and [`FlatDiscountError::EndBeforeStart`] for an inverted date range.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        discount: Percentage,
        start_date: Date,
        end_date: Date,
    ) -> Result<Self, FlatDiscountError> {
        let id = id.into();

        if !is_within_bounds(&discount) {
            return Err(FlatDiscountError::DiscountOutOfRange);
        }

        if end_date < start_date {
            return Err(FlatDiscountError::EndBeforeStart(id));
        }

        Ok(Self {
            id,
            name: name.into(),
            discount,
            start_date,
            end_date,
            products: FxHashSet::default(),
        })
    }

    /// Flat discount id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discount percentage
    pub fn discount(&self) -> &Percentage {
        &self.discount
    }

    /// First day the discount applies
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Last day the discount applies
    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// Assigned products, sorted by id.
    pub fn products(&self) -> Vec<&ProductId> {
        let mut products: Vec<&ProductId> = self.products.iter().collect();

        products.sort_unstable();

        products
    }

    /// Whether `today` falls inside the inclusive date range.
    pub fn is_active_on(&self, today: Date) -> bool {
        self.start_date <= today && today <= self.end_date
    }

    /// Whether the discount targets `product`.
    pub fn targets(&self, product: &ProductId) -> bool {
        self.products.contains(product)
    }

    /// Assign the discount to a product, or remove it if already assigned.
    ///
    /// Returns `true` when the product is assigned after the call.
    pub fn toggle_product(&mut self, product: ProductId) -> bool {
        if self.products.remove(&product) {
            return false;
        }

        self.products.insert(product);

        true
    }
}

/// Sum of the percentages of every flat discount targeting `product` that is active on `today`.
///
/// The sum is only capped at 100% when `clamp` is set.
pub fn total_flat_discount<'d>(
    discounts: impl IntoIterator<Item = &'d FlatDiscount>,
    product: &ProductId,
    today: Date,
    clamp: bool,
) -> Percentage {
    sum_percentages(
        discounts
            .into_iter()
            .filter(|discount| discount.targets(product) && discount.is_active_on(today))
            .map(FlatDiscount::discount),
        clamp,
    )
}

/// Ids of the flat discounts targeting `product` that are active on `today`.
pub fn active_flat_discount_ids<'d>(
    discounts: impl IntoIterator<Item = &'d FlatDiscount>,
    product: &ProductId,
    today: Date,
) -> Vec<&'d str> {
    discounts
        .into_iter()
        .filter(|discount| discount.targets(product) && discount.is_active_on(today))
        .map(FlatDiscount::id)
        .collect()
}
