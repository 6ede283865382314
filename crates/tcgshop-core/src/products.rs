use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A resolved tax reference on a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInfo {
    pub id: String,
    pub name: String,
    /// Percentage exactly as the catalog returns it, e.g. `"8.25"`.
    pub percentage: Option<String>,
}

/// A catalog item flattened for display, carrying exactly one representative
/// variation.
///
/// The same `item_id` can appear with different variations under different
/// stock filters, so listings must be keyed by `variation_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCatalogItem {
    pub item_id: String,
    pub variation_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Resolved image URLs in the item's image-ID order; unresolved IDs are dropped.
    pub image_urls: Vec<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub category_group: Option<String>,
    pub taxes: Vec<TaxInfo>,
    /// Price of the selected variation in minor currency units.
    pub price_amount: Option<i64>,
    /// ISO 4217 currency code of `price_amount`.
    pub currency: Option<String>,
    pub sku: Option<String>,
    pub is_archived: bool,
    pub sold_out: bool,
    pub ecom_visible: bool,
    pub ecom_available: bool,
    /// Reconciled quantity of the selected variation, when inventory was fetched.
    pub inventory_count: Option<Decimal>,
}

/// One inventory row that contributed to a variation's count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInventory {
    pub location_id: String,
    /// Upstream inventory state, e.g. `"IN_STOCK"` or `"SOLD"`.
    pub state: String,
    pub quantity: Decimal,
}

/// A variation on the single-product path.
///
/// `sold_out` (manual override) and `inventory_count` (tracked quantity) are
/// independent signals and are never derived from one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedVariation {
    pub variation_id: String,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price_amount: Option<i64>,
    pub currency: Option<String>,
    pub track_inventory: bool,
    pub sold_out: bool,
    pub inventory_count: Decimal,
    pub location_inventory: Vec<LocationInventory>,
}

/// A single product with all of its variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProductResponse {
    #[serde(flatten)]
    pub item: NormalizedCatalogItem,
    pub variations: Vec<NormalizedVariation>,
}

impl NormalizedProductResponse {
    /// Returns the variation chosen as the item's representative, if present.
    #[must_use]
    pub fn selected_variation(&self) -> Option<&NormalizedVariation> {
        self.variations
            .iter()
            .find(|v| v.variation_id == self.item.variation_id)
    }
}

/// One normalized page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<NormalizedCatalogItem>,
    /// Cursor for the next page; `None` when there are no further pages.
    pub cursor: Option<String>,
}

impl CatalogPage {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}
