//! Integration tests for the acquisition strategy chain.
//!
//! Each test serves a fake storefront from `wiremock` and drives
//! `acquire_products` / `acquire_collections` end to end.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopcat_core::{export, ExportFormat, Product, ScrapeOptions};
use shopcat_scraper::{
    acquire, acquire_collections, acquire_products, map_collections, CatalogRecords, RecordKind,
    ScraperError, ShopifyClient,
};

fn test_client() -> ShopifyClient {
    ShopifyClient::new(5, "shopcat-test/0.1", 0, 0).expect("failed to build test ShopifyClient")
}

fn fast_options() -> ScrapeOptions {
    ScrapeOptions {
        page_delay: Duration::ZERO,
        collection_delay: Duration::ZERO,
        ..ScrapeOptions::default()
    }
}

fn product_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Product {id}"),
        "handle": format!("product-{id}"),
        "vendor": "Acme",
        "variants": [{"id": id * 10, "title": "Default Title", "price": "10.00"}]
    })
}

fn products_page(start: u64, count: u64) -> serde_json::Value {
    let products: Vec<_> = (start..start + count).map(product_json).collect();
    json!({ "products": products })
}

fn products(records: CatalogRecords) -> Vec<Product> {
    match records {
        CatalogRecords::Products(products) => products,
        other => panic!("expected products, got: {other:?}"),
    }
}

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_owned()))
        .mount(server)
        .await;
}

const LISTING_HTML: &str = r#"
    <html><body>
      <div class="product-card">
        <a href="/products/classic-tee"><img src="//cdn.example.com/tee.jpg"></a>
        <h3 class="product-card__title">Classic Tee</h3>
        <span class="price">$25.00</span>
      </div>
      <div class="product-card">
        <a href="/products/wool-socks">Socks</a>
        <h3 class="product-card__title">Wool Socks</h3>
        <span class="price">$9.00</span>
      </div>
    </body></html>
"#;

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_store_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client();
    let result = acquire_products(&client, "not a url", 50, &fast_options()).await;
    assert!(
        matches!(result, Err(ScraperError::InvalidInput { .. })),
        "got: {result:?}"
    );

    let result = acquire_collections(&client, "ftp://shop.example.com", 1, 50).await;
    assert!(
        matches!(result, Err(ScraperError::InvalidInput { .. })),
        "got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Structured product listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn products_are_paginated_across_the_basic_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("limit", "250"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 250)))
        .expect(1)
        .mount(&server)
        .await;
    for (page, start, count) in [("2", 251, 250), ("3", 501, 137)] {
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_page(start, count)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 1000, &fast_options())
        .await
        .unwrap();

    assert_eq!(acquisition.total, 637);
    assert!(!acquisition.has_more);
    assert_eq!(acquisition.store, server.uri());
    let products = products(acquisition.records);
    assert_eq!(products[0].id, "1");
    assert_eq!(products[636].id, "637");
    assert_eq!(
        products[0].url,
        format!("{}/products/product-1", server.uri())
    );
    // No collection listing was served, so nothing is associated.
    assert!(products.iter().all(|p| p.collections.is_empty()));
}

#[tokio::test]
async fn has_more_is_set_when_total_equals_limit() {
    let server = MockServer::start().await;
    mount_json(&server, "/products.json", products_page(1, 3)).await;

    let options = ScrapeOptions {
        page_size: 3,
        max_pages: 1,
        ..fast_options()
    };
    let acquisition = acquire_products(&test_client(), &server.uri(), 3, &options)
        .await
        .unwrap();

    assert_eq!(acquisition.total, 3);
    assert!(acquisition.has_more);
}

#[tokio::test]
async fn catch_all_collection_is_used_when_basic_listing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;
    mount_json(&server, "/collections/all/products.json", products_page(1, 3)).await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 50, &fast_options())
        .await
        .unwrap();

    assert_eq!(acquisition.total, 3);
    let ids: Vec<_> = products(acquisition.records)
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn pagination_failure_returns_records_gathered_so_far() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 250)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 1000, &fast_options())
        .await
        .unwrap();

    assert_eq!(acquisition.total, 250);
    assert!(!acquisition.has_more);
}

// ---------------------------------------------------------------------------
// HTML fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn html_listing_is_used_when_structured_listings_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/all/products.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, "/collections/all", LISTING_HTML).await;
    // Limit reached on the first listing page, so later slugs are not scraped.
    Mock::given(method("GET"))
        .and(path("/collections/featured"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 2, &fast_options())
        .await
        .unwrap();

    assert_eq!(acquisition.total, 2);
    assert!(!acquisition.has_more, "HTML results never report more");
    let products = products(acquisition.records);
    assert_eq!(products[0].id, "html-0");
    assert_eq!(products[0].title, "Classic Tee");
    assert_eq!(products[0].handle, "classic-tee");
    assert_eq!(products[0].price, "$25.00");
    assert_eq!(products[0].images[0].src, "https://cdn.example.com/tee.jpg");
    assert!(products[0].variants.is_empty());
    assert_eq!(products[1].id, "html-1");
}

#[tokio::test]
async fn html_ids_continue_across_listing_pages() {
    let server = MockServer::start().await;
    mount_json(&server, "/products.json", json!({"products": []})).await;
    mount_json(
        &server,
        "/collections/all/products.json",
        json!({"products": []}),
    )
    .await;
    mount_html(&server, "/collections/all", LISTING_HTML).await;
    Mock::given(method("GET"))
        .and(path("/collections/featured"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_html(&server, "/collections/new-arrivals", LISTING_HTML).await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 50, &fast_options())
        .await
        .unwrap();

    let ids: Vec<_> = products(acquisition.records)
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["html-0", "html-1", "html-2", "html-3"]);
}

#[tokio::test]
async fn store_blocking_everything_yields_empty_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let acquisition = acquire(
        &test_client(),
        &server.uri(),
        RecordKind::Products,
        1,
        50,
        &fast_options(),
    )
    .await
    .unwrap();

    assert_eq!(acquisition.total, 0);
    assert!(acquisition.records.is_empty());
    assert!(!acquisition.has_more);
}

// ---------------------------------------------------------------------------
// Collection association
// ---------------------------------------------------------------------------

#[tokio::test]
async fn products_carry_collections_in_enumeration_order() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/collections.json",
        json!({"collections": [
            {"id": 1, "title": "Sale", "handle": "sale"},
            {"id": 2, "title": "New", "handle": "new"},
            {"id": 3, "title": "Broken", "handle": "broken"},
            {"id": 4, "title": "No handle"}
        ]}),
    )
    .await;
    mount_json(
        &server,
        "/collections/sale/products.json",
        json!({"products": [product_json(1), product_json(2)]}),
    )
    .await;
    mount_json(
        &server,
        "/collections/new/products.json",
        json!({"products": [product_json(1)]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/collections/broken/products.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 50, &fast_options())
        .await
        .unwrap();
    assert_eq!(acquisition.total, 3);
    let products = products(acquisition.records);

    let handles = |p: &Product| -> Vec<String> {
        p.collections.iter().map(|c| c.handle.clone()).collect()
    };
    assert_eq!(handles(&products[0]), vec!["sale", "new"]);
    assert_eq!(products[0].collections[0].id, "1");
    assert_eq!(products[0].collections[0].title, "Sale");
    assert_eq!(handles(&products[1]), vec!["sale"]);
    assert!(products[2].collections.is_empty());
}

#[tokio::test]
async fn collection_membership_is_read_past_the_first_page() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/collections.json",
        json!({"collections": [{"id": 9, "title": "Big", "handle": "big"}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/collections/big/products.json"))
        .and(query_param("limit", "30"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 30)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/big/products.json"))
        .and(query_param("limit", "30"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(31, 1)))
        .expect(1)
        .mount(&server)
        .await;
    // Page 2 was short, so page 3 must never be requested.
    Mock::given(method("GET"))
        .and(path("/collections/big/products.json"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(32, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        page_size: 30,
        ..fast_options()
    };
    let index = map_collections(&test_client(), &server.uri(), &options).await;

    assert_eq!(index.len(), 31);
    let last = index.get("31").expect("product from the second membership page");
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].handle, "big");
    assert_eq!(last[0].id, "9");
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collections_listing_forwards_page_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .and(query_param("limit", "2"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collections": [
            {"id": 10, "title": "Summer", "handle": "summer", "body_html": "<p>Hot</p>", "products_count": 4},
            {"id": 11, "title": "Winter", "handle": "winter"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let acquisition = acquire_collections(&test_client(), &server.uri(), 3, 2)
        .await
        .unwrap();

    assert_eq!(acquisition.total, 2);
    assert!(acquisition.has_more);
    match acquisition.records {
        CatalogRecords::Collections(collections) => {
            assert_eq!(collections[0].id, "10");
            assert_eq!(collections[0].description, "Hot");
            assert_eq!(collections[0].products_count, 4);
            assert_eq!(
                collections[1].url,
                format!("{}/collections/winter", server.uri())
            );
        }
        other => panic!("expected collections, got: {other:?}"),
    }
}

#[tokio::test]
async fn empty_collections_listing_is_returned_as_is() {
    let server = MockServer::start().await;
    mount_json(&server, "/collections.json", json!({"collections": []})).await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let acquisition = acquire_collections(&test_client(), &server.uri(), 1, 50)
        .await
        .unwrap();
    assert_eq!(acquisition.total, 0);
    assert!(!acquisition.has_more);
}

#[tokio::test]
async fn collections_fall_back_to_html_index() {
    let server = MockServer::start().await;
    mount_json(&server, "/collections.json", json!({"error": "blocked"})).await;
    mount_html(
        &server,
        "/collections",
        r#"<div class="collection-card">
             <a href="/collections/gifts"><span class="collection-card__title">Gifts</span></a>
           </div>"#,
    )
    .await;

    let acquisition = acquire_collections(&test_client(), &server.uri(), 1, 1)
        .await
        .unwrap();

    assert_eq!(acquisition.total, 1);
    assert!(!acquisition.has_more, "HTML results never report more");
    match acquisition.records {
        CatalogRecords::Collections(collections) => {
            assert_eq!(collections[0].id, "html-collection-0");
            assert_eq!(collections[0].title, "Gifts");
            assert_eq!(collections[0].handle, "gifts");
            assert_eq!(collections[0].products_count, 0);
        }
        other => panic!("expected collections, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Export of acquired records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn acquired_products_export_to_bulk_csv() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/products.json",
        json!({"products": [{
            "id": 7,
            "title": "Classic Tee",
            "handle": "classic-tee",
            "vendor": "Acme",
            "tags": ["cotton", "summer"],
            "variants": [
                {"id": 71, "title": "S", "option1": "S", "price": "19.99", "sku": "TEE-S"},
                {"id": 72, "title": "M", "option1": "M", "price": "21.99", "sku": "TEE-M"}
            ]
        }]}),
    )
    .await;

    let acquisition = acquire_products(&test_client(), &server.uri(), 50, &fast_options())
        .await
        .unwrap();
    let products = products(acquisition.records);
    let csv_text = export::export_products(&products, ExportFormat::Csv).unwrap();

    let mut reader = csv::ReaderBuilder::new().from_reader(csv_text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 47);
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);

    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
    assert_eq!(&rows[0][col("Handle")], "classic-tee");
    assert_eq!(&rows[0][col("Title")], "Classic Tee");
    assert_eq!(&rows[0][col("Tags")], "cotton,summer");
    assert_eq!(&rows[0][col("Variant SKU")], "TEE-S");
    assert_eq!(&rows[1][col("Handle")], "classic-tee");
    assert_eq!(&rows[1][col("Title")], "");
    assert_eq!(&rows[1][col("Variant Price")], "21.99");
}
