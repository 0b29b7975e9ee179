use catalog_client::{CatalogConfig, CatalogError, OpenFoodFactsClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenFoodFactsClient {
    OpenFoodFactsClient::from_config(CatalogConfig {
        base_url: server.uri(),
        page_size: 2,
        timeout_secs: 5,
        user_agent: "food-similarity-tests".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn search_page_sends_paging_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .and(query_param("page", "3"))
        .and(query_param("page_size", "2"))
        .and(query_param("json", "1"))
        .and(query_param("sort_by", "unique_scans_n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "page": 3,
            "products": [
                {
                    "code": "1",
                    "product_name": "Widget",
                    "ecoscore_extended_data": { "impact": { "likeliest_recipe": { "en:a": 2 } } }
                },
                { "code": "2", "product_name": "Gadget" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let products = client_for(&server).search_page(3).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].code.as_deref(), Some("1"));
    assert!(products[0].category_weights().is_some());
    assert!(products[1].category_weights().is_none());
}

#[tokio::test]
async fn search_page_maps_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).search_page(1).await.unwrap_err();
    assert!(matches!(err, CatalogError::Server(503)), "got {err:?}");
}

#[tokio::test]
async fn page_zero_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    let err = client_for(&server).search_page(0).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPage(0)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn product_uses_top_level_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/product/3017620429484.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "3017620429484",
            "status": 1,
            "product": {
                "product_name": "Nutella",
                "image_front_url": "https://images.example/nutella.jpg",
                "ecoscore_extended_data": {
                    "impact": { "likeliest_recipe": { "en:sugar": 56.3 } }
                }
            }
        })))
        .mount(&server)
        .await;

    let product = client_for(&server)
        .product("3017620429484")
        .await
        .unwrap()
        .expect("product present");

    assert_eq!(product.code.as_deref(), Some("3017620429484"));
    assert_eq!(product.product_name.as_deref(), Some("Nutella"));
    assert_eq!(
        product.image_front_url.as_deref(),
        Some("https://images.example/nutella.jpg")
    );
}

#[tokio::test]
async fn unknown_product_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/product/42.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "42",
            "status": 0,
            "status_verbose": "product not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/product/43.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.product("42").await.unwrap().is_none());
    assert!(client.product("43").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_code_is_rejected() {
    let server = MockServer::start().await;
    let err = client_for(&server).product("abc").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidCode(ref c) if c == "abc"));
}

#[tokio::test]
async fn malformed_item_does_not_lose_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi/search.pl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "code": "1",
                    "product_name": "Widget",
                    "ecoscore_extended_data": { "impact": { "likeliest_recipe": { "en:a": 2 } } }
                },
                {
                    "code": "2",
                    "product_name": 1664,
                    "ecoscore_extended_data": { "impact": { "likeliest_recipe": [] } }
                },
                "not a product"
            ]
        })))
        .mount(&server)
        .await;

    let products = client_for(&server).search_page(1).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].product_name.as_deref(), Some("Widget"));
    assert!(products[0].category_weights().is_some());
    assert_eq!(products[1].code.as_deref(), Some("2"));
    assert!(products[1].category_weights().is_none());
}
