use super::*;

fn config(base_url: &str) -> SquareClientConfig {
    SquareClientConfig {
        base_url: base_url.to_owned(),
        access_token: "test-token".to_owned(),
        api_version: "2024-10-17".to_owned(),
        timeout_secs: 5,
        user_agent: "tcgshop-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_ms: 0,
    }
}

fn client(base_url: &str) -> SquareClient {
    SquareClient::new(&config(base_url)).expect("client construction should not fail")
}

#[test]
fn endpoint_joins_onto_bare_host() {
    let url = client("https://connect.squareup.com")
        .endpoint("v2/catalog/search")
        .unwrap();
    assert_eq!(url.as_str(), "https://connect.squareup.com/v2/catalog/search");
}

#[test]
fn endpoint_strips_trailing_slashes() {
    let url = client("https://connect.squareupsandbox.com//")
        .endpoint("v2/catalog/search")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://connect.squareupsandbox.com/v2/catalog/search"
    );
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let url = client("http://localhost:8080/square")
        .endpoint("v2/inventory/counts/batch-retrieve")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/square/v2/inventory/counts/batch-retrieve"
    );
}

#[test]
fn rejects_invalid_base_url() {
    let result = SquareClient::new(&config("not a url"));
    assert!(matches!(result, Err(CatalogError::InvalidBaseUrl { .. })));
}

#[test]
fn config_debug_redacts_token() {
    let rendered = format!("{:?}", config("https://connect.squareup.com"));
    assert!(!rendered.contains("test-token"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn client_error_with_envelope_maps_to_api_error() {
    let url = Url::parse("https://connect.squareup.com/v2/catalog/search").unwrap();
    let body = r#"{"errors":[{"category":"INVALID_REQUEST_ERROR","code":"INVALID_CURSOR","detail":"bad cursor"}]}"#;
    let err = error_for_status(StatusCode::BAD_REQUEST, &url, body);
    match err {
        CatalogError::Api {
            category,
            code,
            detail,
        } => {
            assert_eq!(category, "INVALID_REQUEST_ERROR");
            assert_eq!(code, "INVALID_CURSOR");
            assert_eq!(detail, "bad cursor");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn server_error_stays_unexpected_status_even_with_envelope() {
    let url = Url::parse("https://connect.squareup.com/v2/catalog/search").unwrap();
    let body = r#"{"errors":[{"category":"API_ERROR","code":"INTERNAL_SERVER_ERROR"}]}"#;
    let err = error_for_status(StatusCode::SERVICE_UNAVAILABLE, &url, body);
    assert!(matches!(
        err,
        CatalogError::UnexpectedStatus { status: 503, .. }
    ));
}

#[test]
fn client_error_without_envelope_is_unexpected_status() {
    let url = Url::parse("https://connect.squareup.com/v2/catalog/search").unwrap();
    let err = error_for_status(StatusCode::FORBIDDEN, &url, "<html>denied</html>");
    assert!(matches!(
        err,
        CatalogError::UnexpectedStatus { status: 403, .. }
    ));
}
