pub mod client;
pub mod error;
pub mod index;
pub mod inventory;
pub mod normalize;
pub mod pagination;
mod rate_limit;
pub mod select;
pub mod service;
pub mod types;

pub use client::{SquareClient, SquareClientConfig};
pub use error::CatalogError;
pub use index::RelatedObjectIndex;
pub use inventory::{reconcile_items, reconcile_product};
pub use normalize::{normalize_item, normalize_product, normalize_search_page};
pub use pagination::{
    spawn_feed, Debouncer, FeedClosed, FeedEvent, FeedHandle, FeedOutcome, FeedSnapshot, PageFeed,
    PageSource, PageTicket, SearchParams,
};
pub use select::{is_variation_sold_out, select_variation, SelectedVariation};
pub use service::{CatalogService, MAX_PAGE_LIMIT};
pub use types::{CatalogObject, InventoryCount, SearchCatalogObjectsResponse};
