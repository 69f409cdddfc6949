//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for carts in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart name -> cart fixture
    pub carts: FxHashMap<String, CartFixture>,
}

/// Cart Fixture
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in the order the shopper added them
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartLineFixture {
    /// Product id
    pub product: String,

    /// Units requested
    pub quantity: u32,

    /// Quoted unit price (e.g., "9.00 GBP"); the catalog price when omitted
    #[serde(default)]
    pub price: Option<String>,
}
