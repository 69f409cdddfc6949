//! Catalog listings
//!
//! Table and JSON renderings of the promotions and flat discounts registered in a catalog.

use std::io;

use jiff::civil::{Date, DateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use crate::{
    discounts::percent_points,
    flat_discounts::FlatDiscount,
    products::ProductId,
    promotions::{Promotion, PromotionMode, PromotionProducts},
    receipt::{ReceiptError, colorize_borders},
};

/// Whether a promotion can be redeemed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// Inside its window with redemptions left
    Active,

    /// Outside its window
    Inactive,

    /// Every redemption used
    Exhausted,
}

impl PromotionStatus {
    /// Status of `promotion` at `now`. The window is checked before the quota.
    pub fn of(promotion: &Promotion, now: DateTime) -> Self {
        if !promotion.window().contains(now) {
            Self::Inactive
        } else if !promotion.quota().has_remaining() {
            Self::Exhausted
        } else {
            Self::Active
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Exhausted => "exhausted",
        }
    }
}

/// JSON shape of a listed promotion.
#[derive(Debug, Serialize)]
pub struct PromotionView {
    id: String,
    promo_code: String,
    name: String,
    mode: PromotionMode,
    accumulative: bool,
    products_count: u32,
    discounted_products_count: u32,
    discount_percent: Decimal,
    include_price_discounts: bool,
    start: DateTime,
    end: DateTime,
    quota: u32,
    used_quota: u32,
    qualifying: Vec<ProductId>,
    discounted: Vec<ProductId>,
    status: PromotionStatus,
}

impl PromotionView {
    /// Describe `promotion` as seen at `now`.
    pub fn new(promotion: &Promotion, products: &PromotionProducts, now: DateTime) -> Self {
        let rule = promotion.rule();
        let window = promotion.window();
        let mut qualifying: Vec<ProductId> = products.qualifying.iter().cloned().collect();

        qualifying.sort_unstable();

        Self {
            id: promotion.id().to_string(),
            promo_code: promotion.promo_code().to_string(),
            name: promotion.name().to_string(),
            mode: promotion.mode(),
            accumulative: rule.accumulative,
            products_count: rule.products_count,
            discounted_products_count: rule.discounted_products_count,
            discount_percent: percent_points(promotion.discount()).normalize(),
            include_price_discounts: promotion.include_price_discounts(),
            start: window.start,
            end: window.end,
            quota: promotion.quota().limit,
            used_quota: promotion.quota().used,
            qualifying,
            discounted: products.discounted.clone(),
            status: PromotionStatus::of(promotion, now),
        }
    }
}

/// Prints one row per promotion, sorted by promo code.
///
/// # Errors
///
/// Returns an error if the table cannot be written.
pub fn write_promotions<'p>(
    mut out: impl io::Write,
    promotions: impl IntoIterator<Item = (&'p Promotion, &'p PromotionProducts)>,
    now: DateTime,
) -> Result<(), ReceiptError> {
    let mut rows: Vec<(&Promotion, &PromotionProducts)> = promotions.into_iter().collect();

    rows.sort_unstable_by(|(a, _), (b, _)| a.promo_code().cmp(b.promo_code()));

    let mut builder = Builder::default();

    builder.push_record(["Code", "Name", "Mode", "Rule", "Discount", "Window", "Quota", "Status"]);

    for (promotion, _products) in rows {
        let rule = promotion.rule();
        let window = promotion.window();
        let quota = promotion.quota();

        let mode = match promotion.mode() {
            PromotionMode::Inclusive => "inclusive",
            PromotionMode::NonInclusive => "gift",
        };

        let repeats = if rule.accumulative { ", repeats" } else { "" };

        builder.push_record([
            promotion.promo_code().to_string(),
            promotion.name().to_string(),
            mode.to_string(),
            format!(
                "{} per {}{repeats}",
                rule.discounted_products_count, rule.products_count
            ),
            format!("{}%", percent_points(promotion.discount()).normalize()),
            format!("{} .. {}", window.start, window.end),
            format!("{}/{}", quota.used, quota.limit),
            PromotionStatus::of(promotion, now).label().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..5), Alignment::right());

    writeln!(out, "\n{}", colorize_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)
}

/// JSON shape of a listed flat discount.
#[derive(Debug, Serialize)]
pub struct FlatDiscountView {
    id: String,
    name: String,
    discount_percent: Decimal,
    start_date: Date,
    end_date: Date,
    products: Vec<ProductId>,
    active: bool,
}

impl FlatDiscountView {
    /// Describe `discount` as seen on `today`.
    pub fn new(discount: &FlatDiscount, today: Date) -> Self {
        Self {
            id: discount.id().to_string(),
            name: discount.name().to_string(),
            discount_percent: percent_points(discount.discount()).normalize(),
            start_date: discount.start_date(),
            end_date: discount.end_date(),
            products: discount.products().into_iter().cloned().collect(),
            active: discount.is_active_on(today),
        }
    }
}

/// Prints one row per flat discount, in creation order.
///
/// # Errors
///
/// Returns an error if the table cannot be written.
pub fn write_flat_discounts<'d>(
    mut out: impl io::Write,
    discounts: impl IntoIterator<Item = &'d FlatDiscount>,
    today: Date,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Discount", "From", "To", "Products", "Active"]);

    for discount in discounts {
        let products: Vec<&str> = discount
            .products()
            .into_iter()
            .map(ProductId::as_str)
            .collect();

        builder.push_record([
            discount.id().to_string(),
            discount.name().to_string(),
            format!("{}%", percent_points(discount.discount()).normalize()),
            discount.start_date().to_string(),
            discount.end_date().to_string(),
            products.join(", "),
            if discount.is_active_on(today) { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(out, "\n{}", colorize_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::{
        catalog::CatalogSnapshot,
        promotions::types::test_support::{catalog, definition},
    };

    use super::*;

    fn snapshot() -> TestResult<CatalogSnapshot> {
        let mut snapshot = catalog()?;

        snapshot.create_promotion(definition(PromotionMode::Inclusive))?;

        Ok(snapshot)
    }

    #[test]
    fn status_checks_window_before_quota() -> TestResult {
        let mut snapshot = snapshot()?;

        for _ in 0..10 {
            snapshot.redeem("TEA")?;
        }

        let (promotion, _) = snapshot.promotions().next().ok_or("no promotion")?;

        assert_eq!(
            PromotionStatus::of(promotion, date(2026, 6, 1).at(0, 0, 0, 0)),
            PromotionStatus::Exhausted
        );
        assert_eq!(
            PromotionStatus::of(promotion, date(2027, 1, 1).at(0, 0, 0, 0)),
            PromotionStatus::Inactive
        );

        Ok(())
    }

    #[test]
    fn table_lists_codes_and_status() -> TestResult {
        let snapshot = snapshot()?;
        let mut out = Vec::new();

        write_promotions(&mut out, snapshot.promotions(), date(2026, 6, 1).at(0, 0, 0, 0))?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("TEA"));
        assert!(output.contains("1 per 3"));
        assert!(output.contains("50%"));
        assert!(output.contains("active"));

        Ok(())
    }

    #[test]
    fn view_serialises_rule_and_status() -> TestResult {
        let snapshot = snapshot()?;
        let (promotion, products) = snapshot.promotions().next().ok_or("no promotion")?;

        let json = serde_json::to_value(PromotionView::new(
            promotion,
            products,
            date(2026, 6, 1).at(0, 0, 0, 0),
        ))?;

        assert_eq!(json["promo_code"], "TEA");
        assert_eq!(json["mode"], "inclusive");
        assert_eq!(json["discount_percent"], "50");
        assert_eq!(json["used_quota"], 0);
        assert_eq!(json["status"], "active");
        assert_eq!(json["discounted"][0], "tea");

        Ok(())
    }

    #[test]
    fn flat_discount_table_lists_dates_and_products() -> TestResult {
        let snapshot = catalog()?;
        let mut out = Vec::new();

        write_flat_discounts(&mut out, snapshot.flat_discounts(), date(2026, 6, 1))?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("2026-01-01"));
        assert!(output.contains("2026-12-31"));
        assert!(output.contains("10%"));
        assert!(output.contains("tea"));
        assert!(output.contains("yes"));

        Ok(())
    }

    #[test]
    fn flat_discount_view_reports_activity() -> TestResult {
        let snapshot = catalog()?;
        let discount = snapshot.flat_discounts().next().ok_or("no flat discount")?;

        let json = serde_json::to_value(FlatDiscountView::new(discount, date(2027, 1, 1)))?;

        assert_eq!(json["start_date"], "2026-01-01");
        assert_eq!(json["end_date"], "2026-12-31");
        assert_eq!(json["discount_percent"], "10");
        assert_eq!(json["products"][0], "tea");
        assert_eq!(json["active"], false);

        Ok(())
    }
}
