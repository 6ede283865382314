//! Stock-visibility filter and sort order, parsed from their query-string
//! wire values.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::NormalizedCatalogItem;

/// A single stock state as it appears in the `stock` wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockState {
    InStock,
    SoldOut,
}

impl StockState {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            StockState::InStock => "IN_STOCK",
            StockState::SoldOut => "SOLD_OUT",
        }
    }
}

/// The set of stock states a listing should show.
///
/// Parsed from a comma-separated string such as `"IN_STOCK,SOLD_OUT"`.
/// Unrecognized tokens are ignored, so a filter made only of unknown tokens is
/// empty and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StockFilter {
    in_stock: bool,
    sold_out: bool,
}

impl StockFilter {
    pub const IN_STOCK: Self = Self {
        in_stock: true,
        sold_out: false,
    };

    pub const SOLD_OUT: Self = Self {
        in_stock: false,
        sold_out: true,
    };

    pub const ALL: Self = Self {
        in_stock: true,
        sold_out: true,
    };

    /// Parses the comma-separated wire value. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut filter = Self {
            in_stock: false,
            sold_out: false,
        };
        for token in raw.split(',').map(str::trim) {
            match token {
                "IN_STOCK" => filter.in_stock = true,
                "SOLD_OUT" => filter.sold_out = true,
                _ => {}
            }
        }
        if filter.is_empty() {
            tracing::warn!(raw, "stock filter has no recognized states; nothing will match");
        }
        filter
    }

    #[must_use]
    pub fn contains(self, state: StockState) -> bool {
        match state {
            StockState::InStock => self.in_stock,
            StockState::SoldOut => self.sold_out,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !self.in_stock && !self.sold_out
    }

    /// Whether a variation with the given override sold-out signal is visible.
    #[must_use]
    pub fn matches(self, sold_out: bool) -> bool {
        if sold_out {
            self.sold_out
        } else {
            self.in_stock
        }
    }

    /// Canonical wire value, `IN_STOCK` first.
    #[must_use]
    pub fn to_wire(self) -> String {
        [StockState::InStock, StockState::SoldOut]
            .into_iter()
            .filter(|s| self.contains(*s))
            .map(StockState::as_wire)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for StockFilter {
    fn default() -> Self {
        Self::IN_STOCK
    }
}

impl std::fmt::Display for StockFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for StockFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[derive(Debug, Error)]
#[error("unknown sort order \"{0}\"; expected name_asc, name_desc, price_asc or price_desc")]
pub struct UnknownSortOrder(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }

    /// Stable client-side price sort. Name orders leave the upstream order
    /// untouched. Items without a price go last in either direction.
    pub fn apply(self, items: &mut [NormalizedCatalogItem]) {
        let descending = match self {
            SortOrder::PriceAsc => false,
            SortOrder::PriceDesc => true,
            SortOrder::NameAsc | SortOrder::NameDesc => return,
        };
        items.sort_by(|a, b| match (a.price_amount, b.price_amount) {
            (Some(x), Some(y)) if descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "price_asc" => Ok(SortOrder::PriceAsc),
            "price_desc" => Ok(SortOrder::PriceDesc),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(variation_id: &str, price: Option<i64>) -> NormalizedCatalogItem {
        NormalizedCatalogItem {
            item_id: format!("item-{variation_id}"),
            variation_id: variation_id.to_string(),
            price_amount: price,
            ..NormalizedCatalogItem::default()
        }
    }

    fn ids(items: &[NormalizedCatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.variation_id.as_str()).collect()
    }

    #[test]
    fn parse_single_states() {
        assert_eq!(StockFilter::parse("IN_STOCK"), StockFilter::IN_STOCK);
        assert_eq!(StockFilter::parse("SOLD_OUT"), StockFilter::SOLD_OUT);
    }

    #[test]
    fn parse_both_states_in_any_order() {
        assert_eq!(StockFilter::parse("IN_STOCK,SOLD_OUT"), StockFilter::ALL);
        assert_eq!(StockFilter::parse("SOLD_OUT, IN_STOCK"), StockFilter::ALL);
    }

    #[test]
    fn parse_ignores_unknown_tokens() {
        assert_eq!(StockFilter::parse("IN_STOCK,BACKORDER"), StockFilter::IN_STOCK);
    }

    #[test]
    fn parse_unknown_only_is_empty_and_matches_nothing() {
        let filter = StockFilter::parse("in_stock");
        assert!(filter.is_empty());
        assert!(!filter.matches(true));
        assert!(!filter.matches(false));
    }

    #[test]
    fn matches_follows_requested_states() {
        assert!(StockFilter::IN_STOCK.matches(false));
        assert!(!StockFilter::IN_STOCK.matches(true));
        assert!(StockFilter::SOLD_OUT.matches(true));
        assert!(!StockFilter::SOLD_OUT.matches(false));
        assert!(StockFilter::ALL.matches(true) && StockFilter::ALL.matches(false));
    }

    #[test]
    fn to_wire_is_canonical() {
        assert_eq!(StockFilter::parse("SOLD_OUT,IN_STOCK").to_wire(), "IN_STOCK,SOLD_OUT");
        assert_eq!(StockFilter::parse("nope").to_wire(), "");
    }

    #[test]
    fn sort_order_round_trips_wire_value() {
        for order in [
            SortOrder::NameAsc,
            SortOrder::NameDesc,
            SortOrder::PriceAsc,
            SortOrder::PriceDesc,
        ] {
            assert_eq!(order.as_wire().parse::<SortOrder>().unwrap(), order);
        }
    }

    #[test]
    fn sort_order_rejects_unknown_value() {
        let err = "newest".parse::<SortOrder>().unwrap_err();
        assert!(err.to_string().contains("newest"));
    }

    #[test]
    fn price_asc_is_stable_and_puts_unpriced_last() {
        let mut items = vec![
            priced("a", Some(500)),
            priced("b", None),
            priced("c", Some(300)),
            priced("d", Some(500)),
        ];
        SortOrder::PriceAsc.apply(&mut items);
        assert_eq!(ids(&items), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn price_desc_puts_unpriced_last() {
        let mut items = vec![priced("a", None), priced("b", Some(100)), priced("c", Some(900))];
        SortOrder::PriceDesc.apply(&mut items);
        assert_eq!(ids(&items), vec!["c", "b", "a"]);
    }

    #[test]
    fn name_orders_keep_upstream_order() {
        let mut items = vec![priced("z", Some(1)), priced("a", Some(2))];
        SortOrder::NameDesc.apply(&mut items);
        assert_eq!(ids(&items), vec!["z", "a"]);
    }
}
