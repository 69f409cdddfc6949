//! Fixtures
//!
//! YAML fixture sets for demos and tests. A set named `tea-shop` lives in
//! `fixtures/{products,discounts,promotions,carts}/tea-shop.yml` and loads into a
//! [`CatalogSnapshot`] plus named carts. Promotions go through the same validation as any other
//! definition.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{CatalogSnapshot, ProductCatalog},
    fixtures::{
        carts::CartsFixture, discounts::DiscountsFixture, products::ProductsFixture,
        promotions::PromotionsFixture,
    },
    flat_discounts::FlatDiscountError,
    products::{Product, ProductId},
    promotions::{PromotionError, definition::DefinitionError},
};

pub mod carts;
pub mod discounts;
pub mod products;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Promotion definition rejected
    #[error("Invalid promotion {0}: {1}")]
    Definition(String, DefinitionError),

    /// Flat discount rejected
    #[error(transparent)]
    FlatDiscount(#[from] FlatDiscountError),

    /// Cart rejected
    #[error("Invalid cart {0}: {1}")]
    Cart(String, CartError),

    /// Recording prior redemptions failed
    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products, promotions and flat discounts loaded so far
    catalog: CatalogSnapshot,

    /// Named carts
    carts: FxHashMap<String, Cart>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: CatalogSnapshot::new(),
            carts: FxHashMap::default(),
            currency: None,
        }
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in sorted(fixture.products) {
            let product = Product::try_from(product_fixture)?;
            let currency = product.price.currency();

            // Validate currency consistency
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.catalog.insert_product(ProductId::from(key), product);
        }

        Ok(self)
    }

    /// Load flat discounts from a YAML fixture file and assign them to their products
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a discount is rejected, or an
    /// assigned product does not exist.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: DiscountsFixture = self.read("discounts", name)?;

        for (key, discount_fixture) in sorted(fixture.discounts) {
            let (flat, products) = discount_fixture.try_into_flat_discount(&key)?;

            self.catalog.create_flat_discount(flat)?;

            for product in products {
                self.catalog
                    .assign_flat_discount(&key, ProductId::from(product))?;
            }
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a definition is rejected.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        for (key, promotion_fixture) in sorted(fixture.promotions) {
            let (definition, used_quota) = promotion_fixture.try_into_definition(&key)?;
            let code = definition.promo_code.clone();

            self.catalog
                .create_promotion(definition)
                .map_err(|err| FixtureError::Definition(key.clone(), err))?;

            for _ in 0..used_quota {
                self.catalog.redeem(&code)?;
            }
        }

        Ok(self)
    }

    /// Load carts from a YAML fixture file. Lines without a price are quoted at the catalog
    /// price, so products must be loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is invalid, an unpriced
    /// line names an unknown product, or a cart is rejected.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartsFixture = self.read("carts", name)?;
        let currency = self.currency()?;

        for (key, cart_fixture) in sorted(fixture.carts) {
            let lines = cart_fixture
                .lines
                .into_iter()
                .map(|line| -> Result<CartLine, FixtureError> {
                    let price = match line.price {
                        Some(price) => products::parse_money(&price)?,
                        None => {
                            self.catalog
                                .product_details(&ProductId::from(line.product.as_str()))
                                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?
                                .price
                        }
                    };

                    Ok(CartLine::new(line.product, line.quantity, price))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let cart = Cart::with_lines(lines, currency)
                .map_err(|err| FixtureError::Cart(key.clone(), err))?;

            self.carts.insert(key, cart);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, discounts, promotions and carts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_discounts(name)?
            .load_promotions(name)?
            .load_carts(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// The loaded catalog
    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// The loaded catalog, for registering further promotions or redemptions
    pub fn catalog_mut(&mut self) -> &mut CatalogSnapshot {
        &mut self.catalog
    }

    /// Get a cart by name
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found.
    pub fn cart(&self, name: &str) -> Result<&Cart, FixtureError> {
        self.carts
            .get(name)
            .ok_or_else(|| FixtureError::CartNotFound(name.to_string()))
    }

    /// Names of the loaded carts, sorted
    pub fn cart_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.carts.keys().map(String::as_str).collect();

        names.sort_unstable();

        names
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Map entries ordered by key, so loading does not depend on hash order.
fn sorted<V>(map: FxHashMap<String, V>) -> Vec<(String, V)> {
    let mut entries: Vec<(String, V)> = map.into_iter().collect();

    entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    entries
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use jiff::civil::date;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{
        catalog::{FlatDiscounts, PromotionLookup},
        discounts::fraction,
    };

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    const PRODUCTS: &str = r#"
products:
  tea:
    name: Tea
    price: "10.00 GBP"
  mug:
    name: Mug
    price: "8.00 GBP"
    image_url: mug.png
"#;

    const PROMOTIONS: &str = r#"
promotions:
  mug-gift:
    name: Free mug
    promo_code: MUG
    start: "2026-01-01T00:00:00"
    end: "2026-12-31T23:59:59"
    mode: non_inclusive
    products_count: 2
    discounted_products_count: 1
    discount: "100%"
    quota: 5
    used_quota: 2
    qualifying: [tea]
    discounted: [mug]
"#;

    const DISCOUNTS: &str = r#"
discounts:
  tea-week:
    name: Tea week
    discount: "10%"
    start: "2026-06-01"
    end: "2026-06-07"
    products: [tea]
"#;

    const CARTS: &str = r#"
carts:
  two-teas:
    lines:
      - product: tea
        quantity: 2
  quoted:
    lines:
      - product: tea
        quantity: 1
        price: "9.00 GBP"
      - product: loose-leaf
        quantity: 1
        price: "3.00 GBP"
"#;

    fn write_set(base: &Path) -> TestResult {
        write_fixture(base, "products", "shop", PRODUCTS)?;
        write_fixture(base, "promotions", "shop", PROMOTIONS)?;
        write_fixture(base, "discounts", "shop", DISCOUNTS)?;
        write_fixture(base, "carts", "shop", CARTS)?;

        Ok(())
    }

    #[test]
    fn load_set_builds_catalog_and_carts() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_set(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_set("shop")?;

        assert_eq!(fixture.currency()?, GBP);
        assert_eq!(fixture.cart_names(), vec!["quoted", "two-teas"]);

        let catalog = fixture.catalog();
        let mug = catalog
            .product_details(&ProductId::from("mug"))
            .ok_or("mug missing")?;

        assert_eq!(mug.price, Money::from_minor(800, GBP));
        assert_eq!(mug.image_url.as_deref(), Some("mug.png"));

        let promotion = catalog.promotion_by_code("MUG").ok_or("MUG missing")?;

        assert_eq!(promotion.quota().used, 2);
        assert_eq!(
            fraction(&catalog.flat_discount_percent(&ProductId::from("tea"), date(2026, 6, 3))),
            Decimal::new(1, 1)
        );

        Ok(())
    }

    #[test]
    fn unpriced_cart_lines_use_catalog_price() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_set(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_set("shop")?;

        let prices: Vec<i64> = fixture
            .cart("two-teas")?
            .iter()
            .map(|line| line.price().to_minor_units())
            .collect();

        assert_eq!(prices, vec![1000]);

        let quoted: Vec<(&str, i64)> = fixture
            .cart("quoted")?
            .iter()
            .map(|line| (line.product().as_str(), line.price().to_minor_units()))
            .collect();

        assert_eq!(quoted, vec![("tea", 900), ("loose-leaf", 300)]);

        Ok(())
    }

    #[test]
    fn missing_cart_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_set(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_set("shop")?;

        assert!(matches!(
            fixture.cart("ten-teas"),
            Err(FixtureError::CartNotFound(name)) if name == "ten-teas"
        ));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(
            dir.path(),
            "products",
            "mixed",
            r#"
products:
  a:
    name: A
    price: "1.00 GBP"
  b:
    name: B
    price: "1.00 EUR"
"#,
        )?;

        let result = Fixture::with_base_path(dir.path())
            .load_products("mixed")
            .map(|_fixture| ());

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn invalid_promotion_definition_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(dir.path(), "products", "bad", PRODUCTS)?;
        write_fixture(
            dir.path(),
            "promotions",
            "bad",
            &PROMOTIONS.replace("discounted: [mug]", "discounted: [teapot]"),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture
            .load_products("bad")
            .and_then(|fixture| fixture.load_promotions("bad"))
            .map(|_fixture| ());

        assert!(matches!(
            result,
            Err(FixtureError::Definition(key, DefinitionError::UnknownProduct(_))) if key == "mug-gift"
        ));

        Ok(())
    }

    #[test]
    fn carts_need_products_first() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(dir.path(), "carts", "shop", CARTS)?;

        let result = Fixture::with_base_path(dir.path())
            .load_carts("shop")
            .map(|_fixture| ());

        assert!(matches!(result, Err(FixtureError::NoCurrency)));

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Fixture::with_base_path("./does-not-exist")
            .load_products("nothing")
            .map(|_fixture| ());

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn bundled_tea_shop_set_loads() -> TestResult {
        let fixture = Fixture::from_set("tea-shop")?;

        assert!(fixture.catalog().promotion_by_code("MUG").is_some());
        assert!(fixture.cart("three-teas").is_ok());

        Ok(())
    }
}
