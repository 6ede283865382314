//! Square Catalog / Inventory API request and response types.
//!
//! ## Observed shape
//!
//! Every catalog object carries a `type` discriminant and an `id`; the
//! type-specific payload lives under `<type>_data` (`item_data`,
//! `item_variation_data`, `image_data`, `category_data`, `tax_data`). Items
//! embed their variations but reference images, categories and taxes by ID
//! only; those objects come back in a parallel `related_objects` list when
//! `include_related_objects` is set.
//!
//! The API omits fields freely (no `sku` on a variation, no `url` on an image
//! that is still processing), so every payload field except `id` is optional
//! here. Unknown object types deserialize as [`CatalogObject::Other`]; an
//! element of `objects`, `related_objects`, `variations` or `counts` that
//! fails to decode (no `id`, wrong field type) is dropped on its own.
//!
//! Prices are `{ "amount": 1299, "currency": "USD" }` with `amount` in minor
//! units. Inventory quantities are decimal strings (`"3"`, `"0.5"`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Decodes a JSON array element by element, dropping elements that fail to
/// decode instead of failing the whole document.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    target_type = std::any::type_name::<T>(),
                    "skipping malformed array element"
                );
                None
            }
        })
        .collect())
}

/// A catalog object, discriminated by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogObject {
    Item(CatalogItem),
    ItemVariation(CatalogItemVariation),
    Image(CatalogImage),
    Category(CatalogCategory),
    Tax(CatalogTax),
    #[serde(other)]
    Other,
}

impl CatalogObject {
    /// Object ID, or `None` for unrecognized object types.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            CatalogObject::Item(o) => Some(&o.id),
            CatalogObject::ItemVariation(o) => Some(&o.id),
            CatalogObject::Image(o) => Some(&o.id),
            CatalogObject::Category(o) => Some(&o.id),
            CatalogObject::Tax(o) => Some(&o.id),
            CatalogObject::Other => None,
        }
    }

    /// Wire name of the object type, for logs and errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            CatalogObject::Item(_) => "ITEM",
            CatalogObject::ItemVariation(_) => "ITEM_VARIATION",
            CatalogObject::Image(_) => "IMAGE",
            CatalogObject::Category(_) => "CATEGORY",
            CatalogObject::Tax(_) => "TAX",
            CatalogObject::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub item_data: Option<ItemData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Legacy single-category reference.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Multi-category references; the first entry is used when
    /// `category_id` is absent.
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub tax_ids: Vec<String>,
    #[serde(default)]
    pub image_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub variations: Vec<CatalogItemVariation>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    /// `VISIBLE`, `HIDDEN`, `UNINDEXED` or `UNAVAILABLE`.
    #[serde(default)]
    pub ecom_visibility: Option<String>,
    #[serde(default)]
    pub ecom_available: Option<bool>,
}

impl ItemData {
    /// The item's primary category ID.
    #[must_use]
    pub fn primary_category_id(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .or_else(|| self.categories.first().map(|c| c.id.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItemVariation {
    pub id: String,
    #[serde(default)]
    pub item_variation_data: Option<ItemVariationData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemVariationData {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price_money: Option<Money>,
    #[serde(default)]
    pub track_inventory: Option<bool>,
    #[serde(default)]
    pub location_overrides: Vec<LocationOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Per-location settings on a variation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationOverride {
    #[serde(default)]
    pub location_id: Option<String>,
    /// Manually marked sold out at this location.
    #[serde(default)]
    pub sold_out: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogImage {
    pub id: String,
    #[serde(default)]
    pub image_data: Option<ImageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCategory {
    pub id: String,
    #[serde(default)]
    pub category_data: Option<CategoryData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTax {
    pub id: String,
    #[serde(default)]
    pub tax_data: Option<TaxData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxData {
    #[serde(default)]
    pub name: Option<String>,
    /// Decimal string, e.g. `"8.25"`.
    #[serde(default)]
    pub percentage: Option<String>,
}

/// Response from `POST /v2/catalog/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCatalogObjectsResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub objects: Vec<CatalogObject>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_objects: Vec<CatalogObject>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Response from `GET /v2/catalog/object/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveCatalogObjectResponse {
    #[serde(default)]
    pub object: Option<CatalogObject>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub related_objects: Vec<CatalogObject>,
}

/// Response from `POST /v2/inventory/counts/batch-retrieve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRetrieveInventoryCountsResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub counts: Vec<InventoryCount>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One `(catalog_object_id, location_id, state)` inventory row.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryCount {
    pub catalog_object_id: String,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default = "default_inventory_state")]
    pub state: InventoryState,
    /// Decimal string; absent means zero.
    #[serde(default)]
    pub quantity: Option<String>,
}

fn default_inventory_state() -> InventoryState {
    InventoryState::Other
}

/// Inventory state. Only [`InventoryState::InStock`] counts toward availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryState {
    InStock,
    Sold,
    ReturnedByCustomer,
    ReservedForSale,
    Waste,
    InTransit,
    #[serde(other)]
    Other,
}

impl InventoryState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryState::InStock => "IN_STOCK",
            InventoryState::Sold => "SOLD",
            InventoryState::ReturnedByCustomer => "RETURNED_BY_CUSTOMER",
            InventoryState::ReservedForSale => "RESERVED_FOR_SALE",
            InventoryState::Waste => "WASTE",
            InventoryState::InTransit => "IN_TRANSIT",
            InventoryState::Other => "OTHER",
        }
    }
}

/// Square error envelope: `{ "errors": [{ "category", "code", "detail" }] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct SquareErrorResponse {
    #[serde(default)]
    pub errors: Vec<SquareApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareApiError {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Body of `POST /v2/catalog/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCatalogObjectsRequest {
    pub object_types: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<CatalogQuery>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub include_related_objects: bool,
}

/// Exactly one of the fields is set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted_attribute_query: Option<SortedAttributeQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_query: Option<TextQuery>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SortedAttributeQuery {
    pub attribute_name: &'static str,
    /// `ASC` or `DESC`.
    pub sort_order: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextQuery {
    pub keywords: Vec<String>,
}

/// Body of `POST /v2/inventory/counts/batch-retrieve`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRetrieveInventoryCountsRequest {
    pub catalog_object_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub location_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}
