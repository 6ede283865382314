//! Search and product lookups composed from the client, normalizer and
//! inventory reconciler.

use std::sync::Arc;

use tcgshop_core::{
    AppConfig, CatalogPage, CategoryGroups, NormalizedProductResponse, SortOrder, StockFilter,
};

use crate::client::SquareClient;
use crate::error::CatalogError;
use crate::inventory::{reconcile_items, reconcile_product};
use crate::normalize::{normalize_product, normalize_search_page};
use crate::pagination::{PageSource, SearchParams};
use crate::types::{
    CatalogObject, CatalogQuery, SearchCatalogObjectsRequest, SortedAttributeQuery, TextQuery,
};

/// Square accepts at most this many keywords in a text query.
const MAX_KEYWORDS: usize = 3;

/// Upper bound Square accepts for a search page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

pub struct CatalogService {
    client: SquareClient,
    groups: Arc<CategoryGroups>,
    location_id: Option<String>,
    page_limit: u32,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        client: SquareClient,
        groups: Arc<CategoryGroups>,
        location_id: Option<String>,
        page_limit: u32,
    ) -> Self {
        Self {
            client,
            groups,
            location_id,
            page_limit: page_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// # Errors
    ///
    /// Returns [`CatalogError`] if the HTTP client cannot be built.
    pub fn from_app_config(
        config: &AppConfig,
        groups: Arc<CategoryGroups>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(
            SquareClient::from_app_config(config)?,
            groups,
            config.square_location_id.clone(),
            config.catalog_page_limit,
        ))
    }

    #[must_use]
    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    #[must_use]
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Fetches one page with the configured page size.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::search_page_with_limit`].
    pub async fn search_page(
        &self,
        params: &SearchParams,
        cursor: Option<&str>,
    ) -> Result<CatalogPage, CatalogError> {
        self.search_page_with_limit(params, cursor, self.page_limit)
            .await
    }

    /// Fetches and normalizes one search page.
    ///
    /// With a location configured, inventory counts for the page's selected
    /// variations are fetched and merged. Price sorts are applied within the
    /// page.
    ///
    /// # Errors
    ///
    /// Any [`CatalogError`] from the search or inventory request.
    pub async fn search_page_with_limit(
        &self,
        params: &SearchParams,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<CatalogPage, CatalogError> {
        let request = build_search_request(params, cursor, limit.clamp(1, MAX_PAGE_LIMIT));
        let response = self.client.search_catalog(&request).await?;
        let location_id = self.location_id();
        let mut page = normalize_search_page(&response, params.stock, location_id, &self.groups);

        if let Some(location_id) = location_id {
            let ids: Vec<String> = page
                .items
                .iter()
                .map(|item| item.variation_id.clone())
                .filter(|id| !id.is_empty())
                .collect();
            let counts = self
                .client
                .batch_retrieve_inventory_counts(&ids, Some(location_id))
                .await?;
            page.items = reconcile_items(page.items, &counts, Some(location_id));
        }

        params.sort.apply(&mut page.items);

        tracing::info!(
            search = params.search_term().unwrap_or(""),
            stock = %params.stock,
            sort = %params.sort,
            objects = response.objects.len(),
            items = page.items.len(),
            has_more = page.has_more(),
            "catalog page normalized"
        );
        Ok(page)
    }

    /// Fetches one item with every variation and its inventory.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] if the object does not exist or is deleted.
    /// - [`CatalogError::NotAnItem`] if the ID names some other object type.
    /// - Any other [`CatalogError`] from the upstream requests.
    pub async fn get_product(
        &self,
        object_id: &str,
        stock: StockFilter,
    ) -> Result<NormalizedProductResponse, CatalogError> {
        let response = self.client.retrieve_object(object_id).await?;
        let item = match response.object {
            Some(CatalogObject::Item(item)) if !item.is_deleted => item,
            Some(CatalogObject::Item(_)) | None => {
                return Err(CatalogError::NotFound {
                    url: format!("catalog object {object_id}"),
                })
            }
            Some(other) => {
                return Err(CatalogError::NotAnItem {
                    object_id: object_id.to_owned(),
                    found: other.type_name().to_owned(),
                })
            }
        };

        let location_id = self.location_id();
        let product = normalize_product(
            &item,
            &response.related_objects,
            stock,
            location_id,
            &self.groups,
        );

        let ids: Vec<String> = product
            .variations
            .iter()
            .map(|v| v.variation_id.clone())
            .collect();
        let counts = self
            .client
            .batch_retrieve_inventory_counts(&ids, location_id)
            .await?;
        Ok(reconcile_product(product, &counts, location_id))
    }
}

impl PageSource for CatalogService {
    async fn fetch_page(
        &self,
        params: &SearchParams,
        cursor: Option<&str>,
    ) -> Result<CatalogPage, CatalogError> {
        self.search_page(params, cursor).await
    }
}

/// Builds the upstream search body for `params`.
///
/// A search term becomes a text query on its first few words, returned in
/// upstream relevance order. Otherwise the name sort is expressed as a
/// sorted-attribute query; price sorts request name order and are re-sorted
/// locally.
pub(crate) fn build_search_request(
    params: &SearchParams,
    cursor: Option<&str>,
    limit: u32,
) -> SearchCatalogObjectsRequest {
    let query = match params.search_term() {
        Some(term) => CatalogQuery {
            text_query: Some(TextQuery {
                keywords: term
                    .split_whitespace()
                    .take(MAX_KEYWORDS)
                    .map(str::to_owned)
                    .collect(),
            }),
            ..CatalogQuery::default()
        },
        None => CatalogQuery {
            sorted_attribute_query: Some(SortedAttributeQuery {
                attribute_name: "name",
                sort_order: match params.sort {
                    SortOrder::NameDesc => "DESC",
                    SortOrder::NameAsc | SortOrder::PriceAsc | SortOrder::PriceDesc => "ASC",
                },
            }),
            ..CatalogQuery::default()
        },
    };

    SearchCatalogObjectsRequest {
        object_types: vec!["ITEM"],
        query: Some(query),
        limit,
        cursor: cursor.filter(|c| !c.is_empty()).map(str::to_owned),
        include_related_objects: true,
    }
}
