use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tcgshop_catalog::{SearchParams, MAX_PAGE_LIMIT};
use tcgshop_core::{CatalogPage, NormalizedProductResponse, SortOrder, StockFilter};

use crate::middleware::RequestId;

use super::{map_catalog_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub search: Option<String>,
    /// Comma-separated stock states; defaults to `IN_STOCK`.
    pub stock: Option<String>,
    pub sort: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub stock: Option<String>,
}

fn parse_stock(raw: Option<&str>) -> StockFilter {
    raw.map_or_else(StockFilter::default, StockFilter::parse)
}

pub(super) fn normalize_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<CatalogPage>>, ApiError> {
    let sort = match query.sort.as_deref() {
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.to_string()))?,
        None => SortOrder::default(),
    };
    let params = SearchParams {
        search: query.search,
        stock: parse_stock(query.stock.as_deref()),
        sort,
    };
    let limit = normalize_limit(query.limit, state.catalog.page_limit());

    let page = state
        .catalog
        .search_page_with_limit(&params, query.cursor.as_deref(), limit)
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: page,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<NormalizedProductResponse>>, ApiError> {
    let product = state
        .catalog
        .get_product(&id, parse_stock(query.stock.as_deref()))
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}
