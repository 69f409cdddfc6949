//! Selection gate
//!
//! When a promotion offers more discounted products than it discounts per trigger, the shopper
//! has to choose. The gate either narrows the discounted set to a valid selection or hands back
//! the candidates.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    catalog::ProductCatalog,
    prices::Price,
    products::ProductId,
    promotions::PromotionError,
};

/// Reasons a discounted product selection is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    /// An empty selection was submitted.
    #[error("selection must name at least one product")]
    Empty,

    /// The selected product is not discounted by the promotion.
    #[error("product {0} is not discounted by this promotion")]
    NotDiscounted(ProductId),

    /// More distinct products than the promotion discounts per trigger.
    #[error("selected {selected} products, at most {allowed} allowed")]
    TooMany {
        /// Distinct products selected
        selected: usize,

        /// Discounted products per trigger
        allowed: u32,
    },
}

/// A discounted product the shopper may choose.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableProduct {
    /// Product id
    pub product_id: ProductId,

    /// Product name
    pub name: String,

    /// Catalog price
    pub price: Price,

    /// Product image
    pub image_url: Option<String>,
}

/// What the gate decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Price the cart, discounting these products (in definition order).
    Proceed(Vec<ProductId>),

    /// Ask the shopper to choose among these products.
    SelectionRequired(Vec<SelectableProduct>),
}

/// Decide whether the discounted set needs narrowing before pricing.
///
/// # Errors
///
/// Returns [`PromotionError::Selection`] for an invalid `selection` and
/// [`PromotionError::InvalidProductReference`] when a candidate is missing from the catalog.
pub fn gate<C>(
    catalog: &C,
    discounted: &[ProductId],
    per_trigger: u32,
    selection: Option<&[ProductId]>,
) -> Result<Gate, PromotionError>
where
    C: ProductCatalog + ?Sized,
{
    if let Some(selection) = selection {
        return Ok(Gate::Proceed(narrow(discounted, per_trigger, selection)?));
    }

    let over_constrained = exceeds(discounted.len(), per_trigger);

    if !over_constrained {
        return Ok(Gate::Proceed(discounted.to_vec()));
    }

    let candidates = discounted
        .iter()
        .map(|product_id| {
            let product = catalog
                .product_details(product_id)
                .ok_or_else(|| PromotionError::InvalidProductReference(product_id.clone()))?;

            Ok(SelectableProduct {
                product_id: product_id.clone(),
                name: product.name,
                price: product.price,
                image_url: product.image_url,
            })
        })
        .collect::<Result<Vec<_>, PromotionError>>()?;

    Ok(Gate::SelectionRequired(candidates))
}

fn exceeds(len: usize, per_trigger: u32) -> bool {
    !u32::try_from(len).is_ok_and(|len| len <= per_trigger)
}

/// Validate a selection and return the selected products in definition order.
fn narrow(
    discounted: &[ProductId],
    per_trigger: u32,
    selection: &[ProductId],
) -> Result<Vec<ProductId>, SelectionError> {
    if selection.is_empty() {
        return Err(SelectionError::Empty);
    }

    if let Some(stray) = selection.iter().find(|id| !discounted.contains(id)) {
        return Err(SelectionError::NotDiscounted(stray.clone()));
    }

    let selected: FxHashSet<&ProductId> = selection.iter().collect();

    if exceeds(selected.len(), per_trigger) {
        return Err(SelectionError::TooMany {
            selected: selected.len(),
            allowed: per_trigger,
        });
    }

    Ok(discounted
        .iter()
        .filter(|id| selected.contains(id))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{catalog::CatalogSnapshot, products::Product};

    use super::*;

    fn ids(ids: &[&str]) -> Vec<ProductId> {
        ids.iter().copied().map(ProductId::from).collect()
    }

    fn catalog() -> CatalogSnapshot {
        let mut catalog = CatalogSnapshot::new();

        catalog.insert_product(
            ProductId::from("mug"),
            Product::new("Mug", Money::from_minor(800, GBP)).with_image("mug.png"),
        );
        catalog.insert_product(
            ProductId::from("cup"),
            Product::new("Cup", Money::from_minor(600, GBP)),
        );
        catalog.insert_product(
            ProductId::from("flask"),
            Product::new("Flask", Money::from_minor(1500, GBP)),
        );

        catalog
    }

    #[test]
    fn proceeds_when_discounted_set_fits() -> TestResult {
        let discounted = ids(&["mug"]);

        assert_eq!(
            gate(&catalog(), &discounted, 1, None)?,
            Gate::Proceed(discounted)
        );

        Ok(())
    }

    #[test]
    fn proceeds_when_sizes_are_equal() -> TestResult {
        let discounted = ids(&["mug", "cup"]);

        assert_eq!(
            gate(&catalog(), &discounted, 2, None)?,
            Gate::Proceed(discounted)
        );

        Ok(())
    }

    #[test]
    fn requires_selection_when_more_candidates_than_units() -> TestResult {
        let Gate::SelectionRequired(candidates) =
            gate(&catalog(), &ids(&["mug", "cup", "flask"]), 1, None)?
        else {
            panic!("expected a selection to be required");
        };

        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Mug", "Cup", "Flask"]);
        assert_eq!(candidates.first().and_then(|c| c.image_url.as_deref()), Some("mug.png"));
        assert_eq!(
            candidates.last().map(|c| c.price),
            Some(Money::from_minor(1500, GBP))
        );

        Ok(())
    }

    #[test]
    fn missing_candidate_is_an_invalid_reference() {
        let result = gate(&catalog(), &ids(&["mug", "ghost"]), 1, None);

        assert_eq!(
            result,
            Err(PromotionError::InvalidProductReference(ProductId::from("ghost")))
        );
    }

    #[test]
    fn valid_selection_narrows_in_definition_order() -> TestResult {
        let selection = ids(&["flask", "mug", "flask"]);

        assert_eq!(
            gate(&catalog(), &ids(&["mug", "cup", "flask"]), 2, Some(selection.as_slice()))?,
            Gate::Proceed(ids(&["mug", "flask"]))
        );

        Ok(())
    }

    #[test]
    fn selection_outside_discounted_set_is_rejected() {
        let selection = ids(&["teapot"]);

        assert_eq!(
            gate(&catalog(), &ids(&["mug", "cup"]), 1, Some(selection.as_slice())),
            Err(PromotionError::Selection(SelectionError::NotDiscounted(
                ProductId::from("teapot")
            )))
        );
    }

    #[test]
    fn selection_larger_than_allowed_is_rejected() {
        let selection = ids(&["mug", "cup"]);

        assert_eq!(
            gate(&catalog(), &ids(&["mug", "cup", "flask"]), 1, Some(selection.as_slice())),
            Err(PromotionError::Selection(SelectionError::TooMany {
                selected: 2,
                allowed: 1,
            }))
        );
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(
            gate(&catalog(), &ids(&["mug", "cup"]), 1, Some(&[][..])),
            Err(PromotionError::Selection(SelectionError::Empty))
        );
    }
}
