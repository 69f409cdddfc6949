//! Promocart
//!
//! Cart promotion pricing: decides whether a promo code applies to a cart, works out which units
//! are discounted or given away, splits partially discounted lines and totals the result.
//!
//! The engine reads products, promotions and flat per-product discounts through the traits in
//! [`catalog`], so it can run against any store. [`catalog::CatalogSnapshot`] is an in-memory
//! implementation used by the fixtures and the CLI.

pub mod calculator;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod discounts;
pub mod fixtures;
pub mod flat_discounts;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
