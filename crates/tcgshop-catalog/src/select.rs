//! Representative-variation selection under a stock-visibility filter.

use tcgshop_core::StockFilter;

use crate::types::CatalogItemVariation;

/// The variation chosen to represent an item in a listing.
#[derive(Debug, Clone, Copy)]
pub struct SelectedVariation<'a> {
    pub variation: &'a CatalogItemVariation,
    /// Item-level sold-out flag: `false` only when the chosen variation is
    /// available.
    pub sold_out: bool,
}

impl SelectedVariation<'_> {
    #[must_use]
    pub fn variation_id(&self) -> &str {
        &self.variation.id
    }

    #[must_use]
    pub fn price(&self) -> Option<i64> {
        variation_price(self.variation)
    }
}

/// Price in minor units; `None` when the variation has no price.
#[must_use]
pub fn variation_price(variation: &CatalogItemVariation) -> Option<i64> {
    variation
        .item_variation_data
        .as_ref()
        .and_then(|d| d.price_money.as_ref())
        .and_then(|m| m.amount)
}

/// Override-based sold-out signal for one variation.
///
/// True only when inventory tracking is enabled and a location override marks
/// the variation sold out. With `location_id` set, only overrides for that
/// location count; without one, any override does. Untracked variations are
/// always available.
#[must_use]
pub fn is_variation_sold_out(variation: &CatalogItemVariation, location_id: Option<&str>) -> bool {
    let Some(data) = variation.item_variation_data.as_ref() else {
        return false;
    };
    if data.track_inventory != Some(true) {
        return false;
    }
    data.location_overrides.iter().any(|o| {
        o.sold_out == Some(true)
            && location_id.is_none_or(|loc| o.location_id.as_deref() == Some(loc))
    })
}

/// Picks the cheapest variation that passes `filter`.
///
/// Ties keep the first variation in input order; a missing price sorts after
/// every priced variation. Returns `None` when nothing passes, in which case
/// the item must be left out of listings.
#[must_use]
pub fn select_variation<'a>(
    variations: &'a [CatalogItemVariation],
    filter: StockFilter,
    location_id: Option<&str>,
) -> Option<SelectedVariation<'a>> {
    variations
        .iter()
        .map(|variation| SelectedVariation {
            variation,
            sold_out: is_variation_sold_out(variation, location_id),
        })
        .filter(|candidate| filter.matches(candidate.sold_out))
        // `min_by_key` returns the first of several equal minima.
        .min_by_key(|candidate| {
            let price = candidate.price();
            (price.is_none(), price.unwrap_or_default())
        })
}
