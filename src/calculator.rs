//! Calculator
//!
//! Entry point of the engine: takes a promo code and a cart, runs eligibility, the selection
//! gate and the pricing algorithm for the promotion's mode.

use jiff::civil::DateTime;
use rusty_money::iso::Currency;
use tracing::{Span, info};

use crate::{
    cart::{Cart, CartError},
    catalog::{CatalogSnapshot, FlatDiscounts, ProductCatalog, PromotionLookup},
    config::{ConfigError, PricingConfig},
    products::ProductId,
    promotions::{
        PromotionError, PromotionMode,
        eligibility::evaluate,
        selection::{Gate, SelectableProduct, gate},
        types::{LinePricer, price_inclusive, price_non_inclusive},
    },
    receipt::CartPromotionResult,
};

/// A promo code applied to a cart, optionally with the shopper's choice of discounted products.
#[derive(Debug, Clone)]
pub struct PromotionRequest {
    /// Promo code (case-sensitive)
    pub promo_code: String,

    /// Cart to price
    pub cart: Cart,

    /// Discounted products chosen after a previous [`PromotionOutcome::SelectionRequired`]
    pub selection: Option<Vec<ProductId>>,
}

impl PromotionRequest {
    /// Create a request without a selection.
    pub fn new(promo_code: impl Into<String>, cart: Cart) -> Self {
        Self {
            promo_code: promo_code.into(),
            cart,
            selection: None,
        }
    }

    /// Attach the shopper's choice of discounted products.
    #[must_use]
    pub fn with_selection(mut self, selection: impl Into<Vec<ProductId>>) -> Self {
        self.selection = Some(selection.into());
        self
    }
}

/// Result of applying a promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// The cart was priced.
    Priced(CartPromotionResult),

    /// The shopper has to choose among these discounted products first.
    SelectionRequired(Vec<SelectableProduct>),
}

/// Applies promotions to carts using read-only collaborators.
#[derive(Debug)]
pub struct PromotionCalculator<'a, L: ?Sized, P: ?Sized, F: ?Sized> {
    promotions: &'a L,
    products: &'a P,
    flat_discounts: &'a F,
    clamp_flat_discounts: bool,
    currency: &'static Currency,
}

impl<'a> PromotionCalculator<'a, CatalogSnapshot, CatalogSnapshot, CatalogSnapshot> {
    /// Calculator backed entirely by one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the configured currency is not supported.
    pub fn from_snapshot(
        snapshot: &'a CatalogSnapshot,
        config: &PricingConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(snapshot, snapshot, snapshot, config)
    }
}

impl<'a, L, P, F> PromotionCalculator<'a, L, P, F>
where
    L: PromotionLookup + ?Sized,
    P: ProductCatalog + ?Sized,
    F: FlatDiscounts + ?Sized,
{
    /// Create a calculator over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the configured currency is not supported.
    pub fn new(
        promotions: &'a L,
        products: &'a P,
        flat_discounts: &'a F,
        config: &PricingConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            promotions,
            products,
            flat_discounts,
            clamp_flat_discounts: config.clamp_flat_discounts,
            currency: config.currency()?,
        })
    }

    /// Apply the request's promo code to its cart at `now`.
    ///
    /// Nothing is written anywhere: the same inputs always give the same outcome, and quota is
    /// only read.
    ///
    /// # Errors
    ///
    /// - [`PromotionError::Cart`]: the cart is empty or in the wrong currency.
    /// - [`PromotionError::NotFound`], [`PromotionError::NotActive`],
    ///   [`PromotionError::QuotaExceeded`], [`PromotionError::EligibilityNotMet`]: the
    ///   promotion does not apply.
    /// - [`PromotionError::Selection`]: the request's selection is not allowed.
    /// - [`PromotionError::InvalidProductReference`]: a product the promotion needs is missing.
    /// - Arithmetic errors from pricing or totalling.
    #[tracing::instrument(
        name = "promocart.calculator.calculate",
        skip(self, request),
        fields(
            promo_code = %request.promo_code,
            cart_lines = request.cart.len(),
            has_selection = request.selection.is_some(),
            qualifying_units = tracing::field::Empty,
            units_to_discount = tracing::field::Empty,
            outcome = tracing::field::Empty
        ),
        err(level = "debug")
    )]
    pub fn calculate(
        &self,
        request: &PromotionRequest,
        now: DateTime,
    ) -> Result<PromotionOutcome, PromotionError> {
        let span = Span::current();
        let cart = &request.cart;

        self.check_cart(cart)?;

        let eligible = evaluate(self.promotions, &request.promo_code, cart, now)?;

        span.record("qualifying_units", eligible.qualifying_count);

        let promotion = &eligible.promotion;
        let rule = promotion.rule();

        let discounted = match gate(
            self.products,
            &eligible.products.discounted,
            rule.discounted_products_count,
            request.selection.as_deref(),
        )? {
            Gate::Proceed(discounted) => discounted,
            Gate::SelectionRequired(candidates) => {
                span.record("outcome", "selection_required");

                info!(
                    candidates = candidates.len(),
                    allowed = rule.discounted_products_count,
                    "discounted product selection required"
                );

                return Ok(PromotionOutcome::SelectionRequired(candidates));
            }
        };

        let units_to_discount = rule.units_to_discount(eligible.qualifying_count);

        span.record("units_to_discount", units_to_discount);

        let pricer = LinePricer {
            promotion,
            qualifying: &eligible.products.qualifying,
            catalog: self.products,
            flat_discounts: self.flat_discounts,
            today: now.date(),
            clamp_flat_discounts: self.clamp_flat_discounts,
        };

        let lines = match promotion.mode() {
            PromotionMode::Inclusive => {
                price_inclusive(&pricer, cart, &discounted, units_to_discount)?
            }
            PromotionMode::NonInclusive => {
                price_non_inclusive(&pricer, cart, &discounted, units_to_discount)?
            }
        };

        let result = CartPromotionResult::new(lines, cart.currency())?;

        span.record("outcome", "priced");

        info!(
            lines = result.lines().len(),
            subtotal_minor = result.subtotal().to_minor_units(),
            total_minor = result.total().to_minor_units(),
            "promotion applied"
        );

        Ok(PromotionOutcome::Priced(result))
    }

    fn check_cart(&self, cart: &Cart) -> Result<(), CartError> {
        if cart.is_empty() {
            return Err(CartError::Empty);
        }

        if cart.currency() != self.currency {
            return Err(CartError::UnexpectedCurrency {
                found: cart.currency().iso_alpha_code,
                expected: self.currency.iso_alpha_code,
            });
        }

        Ok(())
    }
}
