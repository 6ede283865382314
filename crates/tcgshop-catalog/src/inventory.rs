//! Merges inventory count rows into normalized items and products.
//!
//! Counts only ever set `inventory_count` and `location_inventory`. The
//! override-based `sold_out` flag computed during normalization is left
//! untouched: the two signals are reported side by side.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use tcgshop_core::{LocationInventory, NormalizedCatalogItem, NormalizedProductResponse};

use crate::types::{InventoryCount, InventoryState};

/// Count rows for the operational location, grouped by catalog object ID.
struct CountsByObject<'a> {
    rows: HashMap<&'a str, Vec<&'a InventoryCount>>,
}

impl<'a> CountsByObject<'a> {
    /// Without a location every row counts; with one, only rows at it.
    fn new(counts: &'a [InventoryCount], location_id: Option<&str>) -> Self {
        let mut rows: HashMap<&str, Vec<&InventoryCount>> = HashMap::new();
        for count in counts
            .iter()
            .filter(|c| location_id.is_none_or(|loc| c.location_id.as_deref() == Some(loc)))
        {
            rows.entry(count.catalog_object_id.as_str())
                .or_default()
                .push(count);
        }
        Self { rows }
    }

    fn rows_for(&self, object_id: &str) -> &[&'a InventoryCount] {
        self.rows.get(object_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Sum of `IN_STOCK` quantities; zero when the object has no rows.
    fn in_stock(&self, object_id: &str) -> Decimal {
        self.rows_for(object_id)
            .iter()
            .filter(|c| c.state == InventoryState::InStock)
            .map(|c| quantity(c))
            .sum()
    }
}

/// Parses a row's quantity. Absent or unparseable quantities count as zero.
fn quantity(count: &InventoryCount) -> Decimal {
    let Some(raw) = count.quantity.as_deref() else {
        return Decimal::ZERO;
    };
    Decimal::from_str(raw.trim()).unwrap_or_else(|e| {
        tracing::warn!(
            catalog_object_id = %count.catalog_object_id,
            quantity = raw,
            error = %e,
            "unparseable inventory quantity; counting as zero"
        );
        Decimal::ZERO
    })
}

/// Applies counts to every variation of a product.
///
/// Each variation gets the summed `IN_STOCK` quantity and one
/// [`LocationInventory`] entry per matching row (any state). The item-level
/// `inventory_count` becomes the selected variation's count; it stays `None`
/// when the product has no selected variation.
#[must_use]
pub fn reconcile_product(
    mut product: NormalizedProductResponse,
    counts: &[InventoryCount],
    location_id: Option<&str>,
) -> NormalizedProductResponse {
    let by_object = CountsByObject::new(counts, location_id);

    for variation in &mut product.variations {
        variation.inventory_count = by_object.in_stock(&variation.variation_id);
        variation.location_inventory = by_object
            .rows_for(&variation.variation_id)
            .iter()
            .map(|c| LocationInventory {
                location_id: c.location_id.clone().unwrap_or_default(),
                state: c.state.as_str().to_owned(),
                quantity: quantity(c),
            })
            .collect();
    }

    product.item.inventory_count = product
        .selected_variation()
        .map(|v| v.inventory_count);
    product
}

/// Sets `inventory_count` on listing items from their selected variation.
#[must_use]
pub fn reconcile_items(
    items: Vec<NormalizedCatalogItem>,
    counts: &[InventoryCount],
    location_id: Option<&str>,
) -> Vec<NormalizedCatalogItem> {
    let by_object = CountsByObject::new(counts, location_id);
    items
        .into_iter()
        .map(|mut item| {
            item.inventory_count = Some(by_object.in_stock(&item.variation_id));
            item
        })
        .collect()
}
