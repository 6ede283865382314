//! End-to-end tests for `CatalogService` and the page feed, with the Square
//! API replaced by a `wiremock` server.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tcgshop_catalog::{
    spawn_feed, CatalogError, CatalogService, FeedEvent, SearchParams, SquareClient,
    SquareClientConfig,
};
use tcgshop_core::{CategoryGroups, SortOrder, StockFilter};

fn service(base_url: &str, location_id: Option<&str>) -> CatalogService {
    let client = SquareClient::new(&SquareClientConfig {
        base_url: base_url.to_owned(),
        access_token: "test-token".to_owned(),
        api_version: "2024-10-17".to_owned(),
        timeout_secs: 5,
        user_agent: "tcgshop-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_ms: 0,
    })
    .expect("client");
    CatalogService::new(
        client,
        Arc::new(CategoryGroups::builtin()),
        location_id.map(str::to_owned),
        24,
    )
}

fn variation(id: &str, amount: i64, sold_out_at: Option<&str>) -> serde_json::Value {
    let overrides = sold_out_at.map_or_else(
        || json!([]),
        |loc| json!([{ "location_id": loc, "sold_out": true }]),
    );
    json!({
        "type": "ITEM_VARIATION",
        "id": id,
        "item_variation_data": {
            "price_money": { "amount": amount, "currency": "USD" },
            "track_inventory": sold_out_at.is_some(),
            "location_overrides": overrides
        }
    })
}

fn item(id: &str, name: &str, variations: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "type": "ITEM",
        "id": id,
        "item_data": {
            "name": name,
            "category_id": "CAT-PKM",
            "image_ids": ["IMG1"],
            "variations": variations
        }
    })
}

fn related() -> serde_json::Value {
    json!([
        { "type": "IMAGE", "id": "IMG1", "image_data": { "url": "https://cdn.example.com/box.jpg" } },
        { "type": "CATEGORY", "id": "CAT-PKM", "category_data": { "name": "Pokémon Booster Boxes" } }
    ])
}

async fn mount_two_page_search(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/catalog/search"))
        .and(body_partial_json(json!({ "cursor": "PAGE2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [item("C", "Crown Zenith", vec![variation("C1", 4000, None)])],
            "related_objects": related()
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/catalog/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [
                item(
                    "X",
                    "Paldea Evolved",
                    vec![variation("V1", 500, None), variation("V2", 300, Some("LOC1"))]
                ),
                item("Y", "Obsidian Flames", vec![variation("V3", 1000, Some("LOC1"))])
            ],
            "related_objects": related(),
            "cursor": "PAGE2"
        })))
        .mount(server)
        .await;
}

async fn mount_inventory(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/inventory/counts/batch-retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "counts": [
                { "catalog_object_id": "V1", "location_id": "LOC1", "state": "IN_STOCK", "quantity": "6" },
                { "catalog_object_id": "V2", "location_id": "LOC1", "state": "IN_STOCK", "quantity": "2" },
                { "catalog_object_id": "V3", "location_id": "LOC1", "state": "SOLD", "quantity": "1" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_page_normalizes_filters_and_reconciles() {
    let server = MockServer::start().await;
    mount_two_page_search(&server).await;
    mount_inventory(&server).await;

    let page = service(&server.uri(), Some("LOC1"))
        .search_page(&SearchParams::default(), None)
        .await
        .expect("search page");

    assert_eq!(page.items.len(), 1, "Y has no in-stock variation");
    let x = &page.items[0];
    assert_eq!(x.item_id, "X");
    assert_eq!(x.variation_id, "V1");
    assert_eq!(x.price_amount, Some(500));
    assert!(!x.sold_out);
    assert_eq!(x.inventory_count, Some(Decimal::from(6)));
    assert_eq!(x.image_urls, vec!["https://cdn.example.com/box.jpg".to_owned()]);
    assert_eq!(x.category_group.as_deref(), Some("Pokémon"));
    assert_eq!(page.cursor.as_deref(), Some("PAGE2"));
}

#[tokio::test]
async fn search_without_location_skips_inventory() {
    let server = MockServer::start().await;
    mount_two_page_search(&server).await;
    Mock::given(method("POST"))
        .and(path("/v2/inventory/counts/batch-retrieve"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let params = SearchParams {
        stock: StockFilter::ALL,
        sort: SortOrder::PriceDesc,
        ..SearchParams::default()
    };
    let page = service(&server.uri(), None)
        .search_page(&params, None)
        .await
        .expect("search page");

    let ids: Vec<_> = page.items.iter().map(|i| i.item_id.as_str()).collect();
    assert_eq!(ids, vec!["Y", "X"], "price_desc applied within the page");
    assert!(page.items.iter().all(|i| i.inventory_count.is_none()));
}

#[tokio::test]
async fn get_product_returns_every_variation_with_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/catalog/object/X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": item(
                "X",
                "Paldea Evolved",
                vec![variation("V1", 500, None), variation("V2", 300, Some("LOC1"))]
            ),
            "related_objects": related()
        })))
        .mount(&server)
        .await;
    mount_inventory(&server).await;

    let product = service(&server.uri(), Some("LOC1"))
        .get_product("X", StockFilter::IN_STOCK)
        .await
        .expect("product");

    assert_eq!(product.item.variation_id, "V1");
    assert_eq!(product.item.inventory_count, Some(Decimal::from(6)));
    assert_eq!(product.variations.len(), 2);
    let v2 = &product.variations[1];
    assert!(v2.sold_out, "override keeps V2 sold out despite positive count");
    assert_eq!(v2.inventory_count, Decimal::from(2));
    assert_eq!(v2.location_inventory.len(), 1);
}

#[tokio::test]
async fn get_product_rejects_non_item_objects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/catalog/object/CAT-PKM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": { "type": "CATEGORY", "id": "CAT-PKM", "category_data": { "name": "Pokémon" } }
        })))
        .mount(&server)
        .await;

    let result = service(&server.uri(), None)
        .get_product("CAT-PKM", StockFilter::IN_STOCK)
        .await;
    match result {
        Err(CatalogError::NotAnItem { object_id, found }) => {
            assert_eq!(object_id, "CAT-PKM");
            assert_eq!(found, "CATEGORY");
        }
        other => panic!("expected NotAnItem, got {other:?}"),
    }
}

#[tokio::test]
async fn feed_accumulates_pages_from_service() {
    let server = MockServer::start().await;
    mount_two_page_search(&server).await;

    let source = Arc::new(service(&server.uri(), None));
    let (handle, mut events, _task) = spawn_feed(
        source,
        SearchParams {
            stock: StockFilter::ALL,
            ..SearchParams::default()
        },
    );

    for expected_total in [2, 3] {
        handle.fetch_next().expect("feed running");
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event within timeout")
            .expect("channel open");
        match event {
            FeedEvent::PageLoaded { total, .. } => assert_eq!(total, expected_total),
            other => panic!("expected PageLoaded, got {other:?}"),
        }
    }

    let snapshot = handle.snapshot().await.expect("snapshot");
    let ids: Vec<_> = snapshot.items.iter().map(|i| i.item_id.as_str()).collect();
    assert_eq!(ids, vec!["X", "Y", "C"]);
    assert!(!snapshot.has_more);
}
