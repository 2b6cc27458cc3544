//! Integration tests for the source adapters using wiremock HTTP mocks.

use shelfscan_lookup::{
    BarcodeLookupAdapter, LookupError, OpenFoodFactsAdapter, SourceAdapter, UpcItemDbAdapter,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPC: &str = "012345678905";

fn upc_adapter(base_url: &str) -> UpcItemDbAdapter {
    UpcItemDbAdapter::with_base_url(5, 0, 0, base_url).expect("client construction should not fail")
}

fn off_adapter(base_url: &str) -> OpenFoodFactsAdapter {
    OpenFoodFactsAdapter::with_base_url(5, 0, 0, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn upc_item_db_maps_first_item_to_a_record() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "code": "OK",
        "total": 1,
        "items": [{
            "title": "Acme Widget Deluxe",
            "brand": "Acme",
            "category": "Hardware > Widgets",
            "description": "The deluxe widget.",
            "images": ["https://img.example.com/widget.jpg", "https://img.example.com/alt.jpg"],
            "upc": UPC,
            "ean": "0012345678905"
        }]
    });

    Mock::given(method("GET"))
        .and(query_param("upc", UPC))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let record = upc_adapter(&server.uri())
        .query(UPC)
        .await
        .expect("should parse record");

    assert_eq!(record.source_tag, "upc_database");
    assert_eq!(record.name.as_deref(), Some("Acme Widget Deluxe"));
    assert_eq!(record.brand.as_deref(), Some("Acme"));
    // Only the first image is taken, and it is primary.
    assert_eq!(record.images.len(), 1);
    assert!(record.images[0].is_primary);
    assert_eq!(record.identifiers.len(), 2);
    assert_eq!(record.identifiers[0].kind, "upc");
    assert_eq!(record.identifiers[1].kind, "ean");
}

#[tokio::test]
async fn upc_item_db_empty_envelope_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "OK",
            "total": 0,
            "items": []
        })))
        .mount(&server)
        .await;

    let err = upc_adapter(&server.uri()).query(UPC).await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn upc_item_db_http_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = upc_adapter(&server.uri()).query(UPC).await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "OK",
            "items": [{ "title": "Widget" }]
        })))
        .mount(&server)
        .await;

    // One retry, zero backoff: the 503 is consumed, the 200 answers.
    let adapter =
        UpcItemDbAdapter::with_base_url(5, 1, 0, &server.uri()).expect("client construction");
    let record = adapter.query(UPC).await.expect("retry should recover");
    assert_eq!(record.name.as_deref(), Some("Widget"));
}

#[tokio::test]
async fn open_food_facts_maps_product_fields() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": 1,
        "product": {
            "code": UPC,
            "product_name": "Chocolat noir 70%",
            "product_name_en": "Dark chocolate 70%",
            "brands": "ChocoCo",
            "categories": "Snacks, Chocolates",
            "ingredients_text_en": "Cocoa mass, sugar, cocoa butter.",
            "image_url": "https://images.off.example/front.jpg"
        }
    });

    Mock::given(method("GET"))
        .and(path(format!("/{UPC}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let record = off_adapter(&server.uri())
        .query(UPC)
        .await
        .expect("should parse record");

    assert_eq!(record.source_tag, "open_food_facts");
    // The any-language name is preferred, matching the upstream field order.
    assert_eq!(record.name.as_deref(), Some("Chocolat noir 70%"));
    assert_eq!(record.brand.as_deref(), Some("ChocoCo"));
    assert_eq!(
        record.description.as_deref(),
        Some("Cocoa mass, sugar, cocoa butter.")
    );
    assert_eq!(record.identifiers[0].kind, "barcode");
    assert_eq!(record.identifiers[0].value, UPC);
}

#[tokio::test]
async fn open_food_facts_status_zero_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&server)
        .await;

    let err = off_adapter(&server.uri()).query(UPC).await.unwrap_err();
    assert!(matches!(err, LookupError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn barcode_lookup_extracts_first_store_price() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "products": [{
            "title": "Acme Widget Deluxe",
            "brand": "Acme",
            "category": "Widgets",
            "description": "Deluxe widget, boxed.",
            "images": ["https://img.example.com/1.jpg", "https://img.example.com/2.jpg"],
            "barcode_number": UPC,
            "stores": [
                { "store_name": "ShopFast", "price": "" },
                { "store_name": "MegaMart", "price": "24.99" }
            ]
        }]
    });

    Mock::given(method("GET"))
        .and(query_param("code", UPC))
        .and(query_param("key", "test-key"))
        .and(query_param("formatted", "y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let adapter = BarcodeLookupAdapter::new(5, 0, 0, &server.uri(), "test-key")
        .expect("client construction should not fail");
    let record = adapter.query(UPC).await.expect("should parse record");

    assert_eq!(record.source_tag, "barcode_lookup");
    assert_eq!(record.suggested_price, Some(24.99));
    // This source never marks a primary image; the merger repairs that.
    assert_eq!(record.images.len(), 2);
    assert!(record.images.iter().all(|img| !img.is_primary));
}
