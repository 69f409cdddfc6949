//! Receipt
//!
//! The priced outcome of applying a promotion to a cart, with a table rendering for terminals
//! and serialisable views for JSON output.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{MoneyError, iso::Currency};
use serde::Serialize;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    calculator::PromotionOutcome,
    discounts::percent_points,
    prices::{Price, to_major_decimal, zero},
    pricing::{Priced, TotalPriceError, extended_price, line_total},
    products::ProductId,
    promotions::{ErrorKind, PromotionError, selection::SelectableProduct},
};

mod listing;

pub use listing::{
    FlatDiscountView, PromotionStatus, PromotionView, write_flat_discounts, write_promotions,
};

/// Errors that can occur when building or rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line or cart total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// JSON serialisation failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One output line of a priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    /// Product id
    pub product: ProductId,

    /// Product name, when the catalog knows the product
    pub name: Option<String>,

    /// Product image
    pub image_url: Option<String>,

    /// Units on this line
    pub quantity: u32,

    /// Unit price charged
    pub price: Price,

    /// Unit price before the promotion was applied
    pub original_price: Price,

    /// Discount reported for the line
    pub discount: Percentage,
}

impl Priced for PricedLine {
    fn unit_price(&self) -> &Price {
        &self.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// A cart priced under a promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct CartPromotionResult {
    lines: Vec<PricedLine>,
    subtotal: Price,
    total: Price,
    currency: &'static Currency,
}

impl CartPromotionResult {
    /// Total the priced lines.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if a line total overflows or a line is in another currency.
    pub fn new(
        lines: Vec<PricedLine>,
        currency: &'static Currency,
    ) -> Result<Self, TotalPriceError> {
        let (subtotal, total) = lines.iter().try_fold(
            (zero(currency), zero(currency)),
            |(subtotal, total), line| -> Result<_, TotalPriceError> {
                Ok((
                    subtotal.add(extended_price(&line.original_price, line.quantity)?)?,
                    total.add(line_total(line)?)?,
                ))
            },
        )?;

        Ok(Self {
            lines,
            subtotal,
            total,
            currency,
        })
    }

    /// Priced lines in output order
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Total before the promotion
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Total after the promotion
    pub fn total(&self) -> Price {
        self.total
    }

    /// Currency of every amount on the receipt
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Savings made by applying the promotion.
    ///
    /// Negative when suppressed flat discounts outweigh the promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Price, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Units per product id across all lines, in first-seen order.
    pub fn units_by_product(&self) -> SmallVec<[(ProductId, u64); 8]> {
        let mut units: SmallVec<[(ProductId, u64); 8]> = SmallVec::new();

        for line in &self.lines {
            match units.iter_mut().find(|(product, _)| product == &line.product) {
                Some((_, count)) => *count += u64::from(line.quantity),
                None => units.push((line.product.clone(), u64::from(line.quantity))),
            }
        }

        units
    }

    /// Prints the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Discount", "Line Total"]);

        let mut discounted_rows: SmallVec<[usize; 16]> = SmallVec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            if line.price != line.original_price {
                discounted_rows.push(idx + 1);
            }

            builder.push_record([
                format!("#{}", idx + 1),
                line.name.clone().unwrap_or_else(|| line.product.to_string()),
                line.quantity.to_string(),
                unit_price_cell(line),
                discount_cell(&line.discount),
                line_total(line)?.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..6), Alignment::right());

        for row in discounted_rows {
            table.modify((row, 3), Color::FG_GREEN);
        }

        writeln!(out, "\n{}", colorize_borders(&table.to_string())).map_err(|_err| ReceiptError::IO)?;

        let savings = self.savings()?;

        let labels = [" Subtotal:", " \x1b[1mTotal:\x1b[0m", " Savings:"];
        let values = [
            format!("{}  ", self.subtotal),
            format!("\x1b[1m{}  \x1b[0m", self.total),
            format!("{savings}  "),
        ];

        let label_width = labels.iter().map(|l| visible_width(l)).max().unwrap_or(0);
        let value_width = values.iter().map(|v| visible_width(v)).max().unwrap_or(0);

        for (label, value) in labels.iter().zip(&values) {
            write_summary_line(&mut out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Prints the products a shopper can choose from.
///
/// # Errors
///
/// Returns an error if the table cannot be written.
pub fn write_selection(
    mut out: impl io::Write,
    candidates: &[SelectableProduct],
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Product", "Name", "Price"]);

    for candidate in candidates {
        builder.push_record([
            candidate.product_id.to_string(),
            candidate.name.clone(),
            candidate.price.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(
        out,
        "\nChoose a discounted product with --select:\n{}",
        colorize_borders(&table.to_string())
    )
    .map_err(|_err| ReceiptError::IO)
}

fn unit_price_cell(line: &PricedLine) -> String {
    if line.price == line.original_price {
        return line.price.to_string();
    }

    format!("{} (was {})", line.price, line.original_price)
}

fn discount_cell(discount: &Percentage) -> String {
    let points = percent_points(discount).round_dp(2).normalize();

    if points.is_zero() {
        String::new()
    } else {
        format!("{points}%")
    }
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {}{value}",
        "",
        " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// JSON shape of a priced line.
#[derive(Debug, Serialize)]
pub struct PricedLineView {
    product_id: ProductId,
    name: Option<String>,
    image_url: Option<String>,
    quantity: u32,
    price: Decimal,
    discount_percent: Decimal,
}

impl From<&PricedLine> for PricedLineView {
    fn from(line: &PricedLine) -> Self {
        Self {
            product_id: line.product.clone(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            price: to_major_decimal(&line.price),
            discount_percent: percent_points(&line.discount).normalize(),
        }
    }
}

/// JSON shape of a priced cart.
#[derive(Debug, Serialize)]
pub struct PricedCartView {
    lines: Vec<PricedLineView>,
    currency: &'static str,
    subtotal: Decimal,
    total: Decimal,
}

impl From<&CartPromotionResult> for PricedCartView {
    fn from(result: &CartPromotionResult) -> Self {
        Self {
            lines: result.lines.iter().map(PricedLineView::from).collect(),
            currency: result.currency.iso_alpha_code,
            subtotal: to_major_decimal(&result.subtotal),
            total: to_major_decimal(&result.total),
        }
    }
}

/// JSON shape of a product the shopper may choose.
#[derive(Debug, Serialize)]
pub struct SelectableProductView {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image_url: Option<String>,
}

/// JSON shape of a "choose a discounted product" response.
#[derive(Debug, Serialize)]
pub struct SelectionView {
    selectable_products: Vec<SelectableProductView>,
}

impl From<&[SelectableProduct]> for SelectionView {
    fn from(candidates: &[SelectableProduct]) -> Self {
        Self {
            selectable_products: candidates
                .iter()
                .map(|candidate| SelectableProductView {
                    product_id: candidate.product_id.clone(),
                    name: candidate.name.clone(),
                    price: to_major_decimal(&candidate.price),
                    image_url: candidate.image_url.clone(),
                })
                .collect(),
        }
    }
}

/// JSON shape of either outcome.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OutcomeView {
    /// Priced cart
    Priced(PricedCartView),

    /// Selection required
    SelectionRequired(SelectionView),
}

impl From<&PromotionOutcome> for OutcomeView {
    fn from(outcome: &PromotionOutcome) -> Self {
        match outcome {
            PromotionOutcome::Priced(result) => Self::Priced(PricedCartView::from(result)),
            PromotionOutcome::SelectionRequired(candidates) => {
                Self::SelectionRequired(SelectionView::from(candidates.as_slice()))
            }
        }
    }
}

/// JSON shape of a failed calculation.
#[derive(Debug, Serialize)]
pub struct ErrorView {
    kind: ErrorKind,
    message: String,
}

impl From<&PromotionError> for ErrorView {
    fn from(error: &PromotionError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Serialise any view as pretty JSON.
///
/// # Errors
///
/// Returns [`ReceiptError::Json`] if serialisation fails or [`ReceiptError::IO`] if the output
/// cannot be written.
pub fn write_json(mut out: impl io::Write, view: &impl Serialize) -> Result<(), ReceiptError> {
    serde_json::to_writer_pretty(&mut out, view)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{GBP, USD},
    };
    use testresult::TestResult;

    use crate::discounts::no_discount;

    use super::*;

    fn line(product: &str, quantity: u32, price: i64, original: i64, discount: f64) -> PricedLine {
        PricedLine {
            product: ProductId::from(product),
            name: Some(product.to_uppercase()),
            image_url: None,
            quantity,
            price: Money::from_minor(price, GBP),
            original_price: Money::from_minor(original, GBP),
            discount: Percentage::from(discount),
        }
    }

    fn split_result() -> Result<CartPromotionResult, TotalPriceError> {
        CartPromotionResult::new(
            vec![
                line("tea", 1, 500, 1000, 0.5),
                line("tea", 4, 1000, 1000, 0.0),
                line("mug", 1, 0, 800, 1.0),
            ],
            GBP,
        )
    }

    #[test]
    fn totals_use_original_and_charged_prices() -> TestResult {
        let result = split_result()?;

        assert_eq!(result.subtotal(), Money::from_minor(5800, GBP));
        assert_eq!(result.total(), Money::from_minor(4500, GBP));
        assert_eq!(result.savings()?, Money::from_minor(1300, GBP));

        Ok(())
    }

    #[test]
    fn empty_result_totals_zero() -> TestResult {
        let result = CartPromotionResult::new(Vec::new(), GBP)?;

        assert_eq!(result.total(), Money::from_minor(0, GBP));
        assert!(result.lines().is_empty());

        Ok(())
    }

    #[test]
    fn mixed_currency_lines_are_rejected() {
        let mut dollars = line("tea", 1, 100, 100, 0.0);
        dollars.price = Money::from_minor(100, USD);
        dollars.original_price = Money::from_minor(100, USD);

        assert!(matches!(
            CartPromotionResult::new(vec![dollars], GBP),
            Err(TotalPriceError::Money(_))
        ));
    }

    #[test]
    fn units_by_product_merges_split_lines() -> TestResult {
        let units = split_result()?.units_by_product();

        assert_eq!(
            units.as_slice(),
            &[(ProductId::from("tea"), 5), (ProductId::from("mug"), 1)]
        );

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let mut out = Vec::new();

        split_result()?.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("TEA"));
        assert!(output.contains("MUG"));
        assert!(output.contains("50%"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Total:"));
        assert!(output.contains("Savings:"));

        Ok(())
    }

    #[test]
    fn unnamed_lines_fall_back_to_product_id() -> TestResult {
        let mut unnamed = line("sku-9", 1, 100, 100, 0.0);
        unnamed.name = None;

        let mut out = Vec::new();

        CartPromotionResult::new(vec![unnamed], GBP)?.write_to(&mut out)?;

        assert!(String::from_utf8(out)?.contains("sku-9"));

        Ok(())
    }

    #[test]
    fn discount_cell_hides_zero() {
        assert_eq!(discount_cell(&no_discount()), "");
        assert_eq!(discount_cell(&Percentage::from(0.25)), "25%");
    }

    #[test]
    fn priced_view_serialises_lines_and_discounts() -> TestResult {
        let view = PricedCartView::from(&split_result()?);
        let json = serde_json::to_value(&view)?;

        assert_eq!(json["lines"][0]["product_id"], "tea");
        assert_eq!(json["lines"][0]["quantity"], 1);
        assert_eq!(json["lines"][0]["price"], "5.00");
        assert_eq!(json["lines"][0]["discount_percent"], "50");
        assert_eq!(json["lines"][2]["price"], "0.00");
        assert_eq!(json["currency"], "GBP");

        Ok(())
    }

    #[test]
    fn selection_view_lists_candidates() -> TestResult {
        let candidates = [SelectableProduct {
            product_id: ProductId::from("mug"),
            name: "Mug".to_string(),
            price: Money::from_minor(800, GBP),
            image_url: Some("mug.png".to_string()),
        }];

        let json = serde_json::to_value(SelectionView::from(&candidates[..]))?;

        assert_eq!(json["selectable_products"][0]["name"], "Mug");
        assert_eq!(json["selectable_products"][0]["price"], "8.00");
        assert_eq!(json["selectable_products"][0]["image_url"], "mug.png");

        Ok(())
    }

    #[test]
    fn error_view_carries_kind_and_message() -> TestResult {
        let error = PromotionError::NotFound("NOPE".to_string());
        let json = serde_json::to_value(ErrorView::from(&error))?;

        assert_eq!(json["kind"], "PromotionNotFound");
        assert_eq!(json["message"], "no promotion found for code \"NOPE\"");

        Ok(())
    }
}
