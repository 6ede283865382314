//! Normalization from raw catalog objects to [`tcgshop_core`] output types.
//!
//! Variation choice is delegated to [`crate::select`]; cross-reference
//! resolution goes through a [`RelatedObjectIndex`] built once per response.
//! Nothing here fails on missing optional data: an unresolved image, category
//! or tax is simply left out.

use rust_decimal::Decimal;
use tcgshop_core::{
    CatalogPage, CategoryGroups, NormalizedCatalogItem, NormalizedProductResponse,
    NormalizedVariation, StockFilter, TaxInfo,
};

use crate::index::RelatedObjectIndex;
use crate::select::{is_variation_sold_out, select_variation, variation_price, SelectedVariation};
use crate::types::{
    CatalogItem, CatalogItemVariation, CatalogObject, ItemData, SearchCatalogObjectsResponse,
};

/// Visibility values that hide an item from the online store.
const HIDDEN_VISIBILITY: &[&str] = &["HIDDEN", "UNAVAILABLE"];

/// Flattens one item and its selected variation into a listing record.
#[must_use]
pub fn normalize_item(
    item: &CatalogItem,
    selected: &SelectedVariation<'_>,
    index: &RelatedObjectIndex,
    groups: &CategoryGroups,
) -> NormalizedCatalogItem {
    let mut normalized = item_fields(item, index, groups);
    let data = selected.variation.item_variation_data.as_ref();

    normalized.variation_id = selected.variation_id().to_owned();
    normalized.price_amount = selected.price();
    normalized.currency = data
        .and_then(|d| d.price_money.as_ref())
        .and_then(|m| m.currency.clone());
    normalized.sku = data.and_then(|d| d.sku.clone()).filter(|s| !s.is_empty());
    normalized.sold_out = selected.sold_out;
    normalized
}

/// Normalizes one search response into a page of listing records.
///
/// The related-object index is built once for the whole response. Items
/// whose variations all fail `filter` are dropped; upstream order is kept.
#[must_use]
pub fn normalize_search_page(
    response: &SearchCatalogObjectsResponse,
    filter: StockFilter,
    location_id: Option<&str>,
    groups: &CategoryGroups,
) -> CatalogPage {
    let index = RelatedObjectIndex::build(&response.related_objects);

    let items = response
        .objects
        .iter()
        .filter_map(|object| match object {
            CatalogObject::Item(item) if !item.is_deleted => Some(item),
            _ => None,
        })
        .filter_map(|item| {
            let variations = item_variations(item);
            let Some(selected) = select_variation(variations, filter, location_id) else {
                tracing::debug!(
                    item_id = %item.id,
                    %filter,
                    "no variation matches stock filter; dropping item"
                );
                return None;
            };
            Some(normalize_item(item, &selected, &index, groups))
        })
        .collect();

    CatalogPage {
        items,
        cursor: response.cursor.clone().filter(|c| !c.is_empty()),
    }
}

/// Normalizes a single item for the product page, keeping every variation.
///
/// The representative variation follows `filter`; when nothing passes it
/// falls back to the cheapest of all variations so the page can still render.
/// An item with no variations at all yields an empty `variation_id` and is
/// reported sold out.
#[must_use]
pub fn normalize_product(
    item: &CatalogItem,
    related: &[CatalogObject],
    filter: StockFilter,
    location_id: Option<&str>,
    groups: &CategoryGroups,
) -> NormalizedProductResponse {
    let index = RelatedObjectIndex::build(related);
    let variations = item_variations(item);

    let selected = select_variation(variations, filter, location_id)
        .or_else(|| select_variation(variations, StockFilter::ALL, location_id));

    let item_record = match selected {
        Some(selected) => normalize_item(item, &selected, &index, groups),
        None => NormalizedCatalogItem {
            sold_out: true,
            ..item_fields(item, &index, groups)
        },
    };

    NormalizedProductResponse {
        item: item_record,
        variations: variations
            .iter()
            .map(|v| normalize_variation(v, location_id))
            .collect(),
    }
}

fn normalize_variation(
    variation: &CatalogItemVariation,
    location_id: Option<&str>,
) -> NormalizedVariation {
    let data = variation.item_variation_data.as_ref();
    NormalizedVariation {
        variation_id: variation.id.clone(),
        name: data.and_then(|d| d.name.clone()),
        sku: data.and_then(|d| d.sku.clone()).filter(|s| !s.is_empty()),
        price_amount: variation_price(variation),
        currency: data
            .and_then(|d| d.price_money.as_ref())
            .and_then(|m| m.currency.clone()),
        track_inventory: data.and_then(|d| d.track_inventory).unwrap_or(false),
        sold_out: is_variation_sold_out(variation, location_id),
        inventory_count: Decimal::ZERO,
        location_inventory: Vec::new(),
    }
}

fn item_variations(item: &CatalogItem) -> &[CatalogItemVariation] {
    item.item_data
        .as_ref()
        .map(|d| d.variations.as_slice())
        .unwrap_or_default()
}

/// Item-level fields shared by both paths; variation fields left empty.
fn item_fields(
    item: &CatalogItem,
    index: &RelatedObjectIndex,
    groups: &CategoryGroups,
) -> NormalizedCatalogItem {
    let empty = ItemData::default();
    let data = item.item_data.as_ref().unwrap_or(&empty);

    let image_urls = data
        .image_ids
        .iter()
        .filter_map(|id| index.image_url(id))
        .map(str::to_owned)
        .collect();

    let category_id = data.primary_category_id().map(str::to_owned);
    let category_name = category_id
        .as_deref()
        .and_then(|id| index.category_name(id))
        .map(str::to_owned);
    let category_group = category_name
        .as_deref()
        .and_then(|name| groups.group_for(name))
        .map(str::to_owned);

    let taxes = data
        .tax_ids
        .iter()
        .filter_map(|id| {
            index.tax(id).map(|tax| TaxInfo {
                id: id.clone(),
                name: tax.name.clone(),
                percentage: tax.percentage.clone(),
            })
        })
        .collect();

    NormalizedCatalogItem {
        item_id: item.id.clone(),
        name: data.name.clone().unwrap_or_default(),
        description: data.description.clone().filter(|s| !s.is_empty()),
        image_urls,
        category_id,
        category_name,
        category_group,
        taxes,
        is_archived: data.is_archived.unwrap_or(false),
        ecom_visible: data
            .ecom_visibility
            .as_deref()
            .is_none_or(|v| !HIDDEN_VISIBILITY.contains(&v)),
        ecom_available: data.ecom_available.unwrap_or(true),
        ..NormalizedCatalogItem::default()
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
