//! Promotion errors.

use jiff::civil::DateTime;
use rusty_money::MoneyError;
use serde::Serialize;
use thiserror::Error;

use crate::{
    cart::CartError,
    discounts::DiscountError,
    pricing::TotalPriceError,
    products::ProductId,
    promotions::{definition::DefinitionError, selection::SelectionError},
};

/// The kind of a promotion failure, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Unknown promo code
    PromotionNotFound,

    /// Outside the activation window
    PromotionNotActive,

    /// All redemptions used
    QuotaExceeded,

    /// Too few qualifying units in the cart
    EligibilityNotMet,

    /// A configured product does not exist
    InvalidProductReference,

    /// The promotion definition is inconsistent (creation time only)
    InvalidPromotionDefinition,

    /// The cart itself is malformed
    InvalidCart,

    /// The caller's discounted product selection is not allowed
    InvalidSelection,

    /// Money arithmetic failed
    Arithmetic,
}

/// Errors raised while evaluating or pricing a promotion.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionError {
    /// No promotion for the code.
    #[error("no promotion found for code {0:?}")]
    NotFound(String),

    /// The promotion is outside its activation window.
    #[error("promotion {code:?} is not active at {now}")]
    NotActive {
        /// Promo code
        code: String,

        /// Evaluation time
        now: DateTime,
    },

    /// Every redemption has been used.
    #[error("promotion {code:?} has used {used} of {limit} redemptions")]
    QuotaExceeded {
        /// Promo code
        code: String,

        /// Redemptions consumed
        used: u32,

        /// Redemption cap
        limit: u32,
    },

    /// The cart holds too few qualifying units.
    #[error("cart holds {qualifying} qualifying units, promotion requires {required}")]
    EligibilityNotMet {
        /// Qualifying units in the cart
        qualifying: u64,

        /// Threshold
        required: u32,
    },

    /// A product referenced by the promotion does not exist.
    #[error("product {0} does not exist")]
    InvalidProductReference(ProductId),

    /// The promotion definition was rejected.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The cart was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The discounted product selection was rejected.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Percentage arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Line total arithmetic failed.
    #[error(transparent)]
    Total(#[from] TotalPriceError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl PromotionError {
    /// The caller-facing kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::PromotionNotFound,
            Self::NotActive { .. } => ErrorKind::PromotionNotActive,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::EligibilityNotMet { .. } => ErrorKind::EligibilityNotMet,
            Self::InvalidProductReference(_) => ErrorKind::InvalidProductReference,
            Self::Definition(error) => error.kind(),
            Self::Cart(_) => ErrorKind::InvalidCart,
            Self::Selection(_) => ErrorKind::InvalidSelection,
            Self::Discount(_) | Self::Total(_) | Self::Money(_) => ErrorKind::Arithmetic,
        }
    }
}
