//! Promocart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calculator::{PromotionCalculator, PromotionOutcome, PromotionRequest},
    cart::{Cart, CartError, CartLine},
    catalog::{CatalogSnapshot, FlatDiscounts, ProductCatalog, PromotionLookup},
    config::{ConfigError, PricingConfig},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    flat_discounts::{FlatDiscount, FlatDiscountError},
    prices::Price,
    pricing::TotalPriceError,
    products::{Product, ProductId},
    promotions::{
        ErrorKind, Promotion, PromotionError, PromotionId, PromotionMode, PromotionProducts,
        definition::{DefinitionError, NewPromotion},
        selection::{SelectableProduct, SelectionError},
    },
    receipt::{CartPromotionResult, PricedLine, ReceiptError},
};
