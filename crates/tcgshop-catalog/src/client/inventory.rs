//! Batch inventory count retrieval for `SquareClient`.

use reqwest::Method;

use crate::error::CatalogError;
use crate::types::{
    BatchRetrieveInventoryCountsRequest, BatchRetrieveInventoryCountsResponse, InventoryCount,
};

use super::SquareClient;
use super::MAX_PAGES;

/// Square rejects batch-retrieve requests naming more objects than this.
const MAX_IDS_PER_REQUEST: usize = 1_000;

impl SquareClient {
    /// Fetches every inventory count row for `catalog_object_ids`, optionally
    /// scoped to one location.
    ///
    /// Follows the response cursor until the upstream stops returning one.
    /// ID lists longer than the per-request limit are split into several
    /// requests. An empty ID list returns immediately without a request.
    ///
    /// # Errors
    ///
    /// Propagates any error from the underlying request. Returns
    /// [`CatalogError::PaginationLimit`] if one chunk spans more than
    /// [`MAX_PAGES`] pages.
    pub async fn batch_retrieve_inventory_counts(
        &self,
        catalog_object_ids: &[String],
        location_id: Option<&str>,
    ) -> Result<Vec<InventoryCount>, CatalogError> {
        if catalog_object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("v2/inventory/counts/batch-retrieve")?;
        let location_ids: Vec<String> = location_id.map(str::to_owned).into_iter().collect();
        let mut counts = Vec::new();

        for chunk in catalog_object_ids.chunks(MAX_IDS_PER_REQUEST) {
            let mut cursor: Option<String> = None;
            let mut page_count = 0usize;

            loop {
                page_count += 1;
                if page_count > MAX_PAGES {
                    return Err(CatalogError::PaginationLimit {
                        max_pages: MAX_PAGES,
                    });
                }

                let request = BatchRetrieveInventoryCountsRequest {
                    catalog_object_ids: chunk.to_vec(),
                    location_ids: location_ids.clone(),
                    cursor: cursor.take(),
                };
                let response: BatchRetrieveInventoryCountsResponse = self
                    .send(
                        Method::POST,
                        url.clone(),
                        Some(&request),
                        "inventory counts batch-retrieve",
                    )
                    .await?;

                counts.extend(response.counts);

                cursor = response.cursor.filter(|c| !c.is_empty());
                if cursor.is_none() {
                    break;
                }
            }
        }

        tracing::debug!(
            objects = catalog_object_ids.len(),
            rows = counts.len(),
            "inventory counts retrieved"
        );
        Ok(counts)
    }
}
