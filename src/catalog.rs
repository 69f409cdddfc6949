//! Catalog
//!
//! The read-only lookups the pricing engine needs from the rest of the back office, and an
//! in-memory snapshot that provides all of them.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use mockall::automock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    flat_discounts::{FlatDiscount, FlatDiscountError, active_flat_discount_ids, total_flat_discount},
    products::{Product, ProductId},
    promotions::{
        Promotion, PromotionError, PromotionId, PromotionProducts,
        definition::{DefinitionError, NewPromotion},
    },
};

/// Resolves promo codes and the product sets attached to a promotion.
#[automock]
pub trait PromotionLookup {
    /// The promotion registered under `code` (case-sensitive), if any.
    fn promotion_by_code(&self, code: &str) -> Option<Promotion>;

    /// Products whose cart quantity counts toward the promotion's threshold.
    fn qualifying_product_ids(&self, promotion: &PromotionId) -> FxHashSet<ProductId>;

    /// Products eligible for the promotion's discount, in definition order.
    fn discounted_product_ids(&self, promotion: &PromotionId) -> Vec<ProductId>;
}

/// Resolves product details.
#[automock]
pub trait ProductCatalog {
    /// Name, list price and image of a product.
    fn product_details(&self, product: &ProductId) -> Option<Product>;
}

/// Resolves the flat per-product discount in force on a given day.
#[automock]
pub trait FlatDiscounts {
    /// Unclamped sum of every flat discount targeting `product` that is active on `today`.
    fn flat_discount_percent(&self, product: &ProductId, today: Date) -> Percentage;
}

#[derive(Debug, Clone)]
struct StoredPromotion {
    promotion: Promotion,
    products: PromotionProducts,
}

/// In-memory snapshot of products, promotions and flat discounts.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: FxHashMap<ProductId, Product>,
    promotions: Vec<StoredPromotion>,
    codes: FxHashMap<String, usize>,
    flat_discounts: Vec<FlatDiscount>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product.
    pub fn insert_product(&mut self, id: ProductId, product: Product) {
        self.products.insert(id, product);
    }

    /// Validate a promotion definition and register it.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the definition is invalid, its id is taken or its code
    /// is already in use.
    pub fn create_promotion(
        &mut self,
        definition: NewPromotion,
    ) -> Result<PromotionId, DefinitionError> {
        if self.stored(&definition.id).is_some() {
            return Err(DefinitionError::DuplicatePromotionId(definition.id));
        }

        let (promotion, products) = definition.validate(&*self)?;
        let id = promotion.id().clone();

        self.codes
            .insert(promotion.promo_code().to_string(), self.promotions.len());
        self.promotions.push(StoredPromotion {
            promotion,
            products,
        });

        Ok(id)
    }

    /// Iterate over the registered promotions in creation order.
    pub fn promotions(&self) -> impl Iterator<Item = (&Promotion, &PromotionProducts)> {
        self.promotions
            .iter()
            .map(|stored| (&stored.promotion, &stored.products))
    }

    /// Record one redemption of the promotion registered under `code`.
    ///
    /// Returns the number of redemptions used after this one.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::NotFound`] for an unknown code and
    /// [`PromotionError::QuotaExceeded`] when the quota is already used up; a failed redemption
    /// leaves the quota untouched.
    pub fn redeem(&mut self, code: &str) -> Result<u32, PromotionError> {
        let stored = self
            .codes
            .get(code)
            .and_then(|index| self.promotions.get_mut(*index))
            .ok_or_else(|| PromotionError::NotFound(code.to_string()))?;

        stored.promotion.redeem()
    }

    /// Register a flat discount.
    ///
    /// # Errors
    ///
    /// Returns [`FlatDiscountError::AlreadyExists`] if the id is taken.
    pub fn create_flat_discount(&mut self, discount: FlatDiscount) -> Result<(), FlatDiscountError> {
        if self.flat_discounts.iter().any(|d| d.id() == discount.id()) {
            return Err(FlatDiscountError::AlreadyExists(discount.id().to_string()));
        }

        self.flat_discounts.push(discount);

        Ok(())
    }

    /// Assign a flat discount to a product, or remove it if already assigned.
    ///
    /// Returns `true` when the product is assigned after the call.
    ///
    /// # Errors
    ///
    /// Returns [`FlatDiscountError::NotFound`] for an unknown discount and
    /// [`FlatDiscountError::UnknownProduct`] for an unknown product.
    pub fn assign_flat_discount(
        &mut self,
        discount: &str,
        product: ProductId,
    ) -> Result<bool, FlatDiscountError> {
        if !self.products.contains_key(&product) {
            return Err(FlatDiscountError::UnknownProduct(product));
        }

        let flat_discount = self
            .flat_discounts
            .iter_mut()
            .find(|d| d.id() == discount)
            .ok_or_else(|| FlatDiscountError::NotFound(discount.to_string()))?;

        Ok(flat_discount.toggle_product(product))
    }

    /// Iterate over the flat discounts in creation order.
    pub fn flat_discounts(&self) -> impl Iterator<Item = &FlatDiscount> {
        self.flat_discounts.iter()
    }

    /// Ids of the flat discounts targeting `product` that are active on `today`.
    pub fn active_flat_discount_ids(&self, product: &ProductId, today: Date) -> Vec<&str> {
        active_flat_discount_ids(&self.flat_discounts, product, today)
    }

    fn stored(&self, id: &PromotionId) -> Option<&StoredPromotion> {
        self.promotions
            .iter()
            .find(|stored| stored.promotion.id() == id)
    }
}

impl PromotionLookup for CatalogSnapshot {
    fn promotion_by_code(&self, code: &str) -> Option<Promotion> {
        self.codes
            .get(code)
            .and_then(|index| self.promotions.get(*index))
            .map(|stored| stored.promotion.clone())
    }

    fn qualifying_product_ids(&self, promotion: &PromotionId) -> FxHashSet<ProductId> {
        self.stored(promotion)
            .map(|stored| stored.products.qualifying.clone())
            .unwrap_or_default()
    }

    fn discounted_product_ids(&self, promotion: &PromotionId) -> Vec<ProductId> {
        self.stored(promotion)
            .map(|stored| stored.products.discounted.clone())
            .unwrap_or_default()
    }
}

impl ProductCatalog for CatalogSnapshot {
    fn product_details(&self, product: &ProductId) -> Option<Product> {
        self.products.get(product).cloned()
    }
}

impl FlatDiscounts for CatalogSnapshot {
    fn flat_discount_percent(&self, product: &ProductId, today: Date) -> Percentage {
        total_flat_discount(&self.flat_discounts, product, today, false)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{discounts::fraction, promotions::PromotionMode};

    use super::*;

    fn snapshot() -> CatalogSnapshot {
        let mut catalog = CatalogSnapshot::new();

        catalog.insert_product(
            ProductId::from("tea"),
            Product::new("Tea", Money::from_minor(250, GBP)),
        );
        catalog.insert_product(
            ProductId::from("mug"),
            Product::new("Mug", Money::from_minor(800, GBP)),
        );

        catalog
    }

    fn definition(id: &str, code: &str, quota: u32) -> NewPromotion {
        NewPromotion {
            id: PromotionId::new(id),
            name: "Free mug".to_string(),
            promo_code: code.to_string(),
            start: date(2026, 1, 1).at(0, 0, 0, 0),
            end: date(2026, 12, 31).at(0, 0, 0, 0),
            mode: PromotionMode::NonInclusive,
            accumulative: false,
            products_count: 2,
            discounted_products_count: 1,
            discount: Percentage::from(1.0),
            include_price_discounts: true,
            quota,
            qualifying: vec![ProductId::from("tea")],
            discounted: vec![ProductId::from("mug")],
        }
    }

    #[test]
    fn created_promotion_is_found_by_exact_code() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_promotion(definition("p1", "FREEMUG", 5))?;

        assert!(catalog.promotion_by_code("FREEMUG").is_some());
        assert!(catalog.promotion_by_code("freemug").is_none());

        Ok(())
    }

    #[test]
    fn edge_sets_are_resolved_by_promotion_id() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_promotion(definition("p1", "FREEMUG", 5))?;

        let id = PromotionId::new("p1");

        assert!(
            catalog
                .qualifying_product_ids(&id)
                .contains(&ProductId::from("tea"))
        );
        assert_eq!(
            catalog.discounted_product_ids(&id),
            vec![ProductId::from("mug")]
        );
        assert!(
            catalog
                .discounted_product_ids(&PromotionId::new("missing"))
                .is_empty()
        );

        Ok(())
    }

    #[test]
    fn duplicate_promotion_id_is_rejected() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_promotion(definition("p1", "FREEMUG", 5))?;

        let result = catalog.create_promotion(definition("p1", "OTHER", 5));

        assert!(matches!(
            result,
            Err(DefinitionError::DuplicatePromotionId(_))
        ));

        Ok(())
    }

    #[test]
    fn redeem_increments_until_quota_is_used() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_promotion(definition("p1", "FREEMUG", 2))?;

        assert_eq!(catalog.redeem("FREEMUG")?, 1);
        assert_eq!(catalog.redeem("FREEMUG")?, 2);
        assert!(matches!(
            catalog.redeem("FREEMUG"),
            Err(PromotionError::QuotaExceeded {
                used: 2,
                limit: 2,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn redeem_unknown_code_is_not_found() {
        let mut catalog = snapshot();

        assert_eq!(
            catalog.redeem("NOPE"),
            Err(PromotionError::NotFound("NOPE".to_string()))
        );
    }

    #[test]
    fn flat_discounts_sum_for_assigned_products() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_flat_discount(FlatDiscount::new(
            "summer",
            "Summer",
            Percentage::from(Decimal::new(1, 1)),
            date(2026, 6, 1),
            date(2026, 8, 31),
        )?)?;
        catalog.create_flat_discount(FlatDiscount::new(
            "july",
            "July",
            Percentage::from(Decimal::new(2, 1)),
            date(2026, 7, 1),
            date(2026, 7, 31),
        )?)?;

        assert!(catalog.assign_flat_discount("summer", ProductId::from("tea"))?);
        assert!(catalog.assign_flat_discount("july", ProductId::from("tea"))?);

        let tea = ProductId::from("tea");

        assert_eq!(
            fraction(&catalog.flat_discount_percent(&tea, date(2026, 7, 10))),
            Decimal::new(3, 1)
        );
        assert_eq!(
            catalog.active_flat_discount_ids(&tea, date(2026, 7, 10)),
            vec!["summer", "july"]
        );
        assert_eq!(
            fraction(&catalog.flat_discount_percent(&ProductId::from("mug"), date(2026, 7, 10))),
            Decimal::ZERO
        );

        Ok(())
    }

    #[test]
    fn flat_discounts_are_listed_in_creation_order() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_flat_discount(FlatDiscount::new(
            "summer",
            "Summer",
            Percentage::from(0.1),
            date(2026, 6, 1),
            date(2026, 8, 31),
        )?)?;
        catalog.create_flat_discount(FlatDiscount::new(
            "july",
            "July",
            Percentage::from(0.2),
            date(2026, 7, 1),
            date(2026, 7, 31),
        )?)?;
        catalog.assign_flat_discount("july", ProductId::from("tea"))?;
        catalog.assign_flat_discount("july", ProductId::from("mug"))?;

        let listed: Vec<(&str, Date, Date)> = catalog
            .flat_discounts()
            .map(|d| (d.id(), d.start_date(), d.end_date()))
            .collect();

        assert_eq!(
            listed,
            vec![
                ("summer", date(2026, 6, 1), date(2026, 8, 31)),
                ("july", date(2026, 7, 1), date(2026, 7, 31)),
            ]
        );

        let july = catalog.flat_discounts().last().ok_or("july missing")?;

        assert_eq!(
            july.products(),
            vec![&ProductId::from("mug"), &ProductId::from("tea")]
        );

        Ok(())
    }

    #[test]
    fn assigning_twice_removes_the_product() -> TestResult {
        let mut catalog = snapshot();

        catalog.create_flat_discount(FlatDiscount::new(
            "summer",
            "Summer",
            Percentage::from(0.1),
            date(2026, 6, 1),
            date(2026, 8, 31),
        )?)?;

        assert!(catalog.assign_flat_discount("summer", ProductId::from("tea"))?);
        assert!(!catalog.assign_flat_discount("summer", ProductId::from("tea"))?);
        assert!(
            catalog
                .active_flat_discount_ids(&ProductId::from("tea"), date(2026, 7, 1))
                .is_empty()
        );

        Ok(())
    }

    #[test]
    fn flat_discount_errors() -> TestResult {
        let mut catalog = snapshot();

        let summer = FlatDiscount::new(
            "summer",
            "Summer",
            Percentage::from(0.1),
            date(2026, 6, 1),
            date(2026, 8, 31),
        )?;

        catalog.create_flat_discount(summer.clone())?;

        assert_eq!(
            catalog.create_flat_discount(summer),
            Err(FlatDiscountError::AlreadyExists("summer".to_string()))
        );
        assert_eq!(
            catalog.assign_flat_discount("winter", ProductId::from("tea")),
            Err(FlatDiscountError::NotFound("winter".to_string()))
        );
        assert_eq!(
            catalog.assign_flat_discount("summer", ProductId::from("ghost")),
            Err(FlatDiscountError::UnknownProduct(ProductId::from("ghost")))
        );

        Ok(())
    }
}
