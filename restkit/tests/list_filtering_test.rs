use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;
use common::{body_json, create_product, empty_request, send, setup_test_app, setup_test_db};

async fn seeded_app() -> axum::Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    for product in [
        json!({"name": "Widget", "price": 100, "category": "tools"}),
        json!({"name": "Wide Gadget", "price": 250, "category": "tools"}),
        json!({"name": "Gizmo", "price": 400}),
        json!({"name": "Sprocket", "price": 50, "category": "parts"}),
        json!({"name": "Relic", "price": 10, "discontinued_at": "2020-05-01T12:00:00+00:00"}),
    ] {
        create_product(&app, &product).await;
    }
    app
}

fn filter_uri(filter: &Value, rest: &str) -> String {
    let encoded: String = filter
        .to_string()
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect();
    format!("/api/v1/products?filter={encoded}{rest}")
}

fn names(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_defaults() {
    let app = seeded_app().await;

    let response = send(&app, empty_request("GET", "/api/v1/products?sort=name")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "products 0-4/5"
    );

    let body = body_json(response).await;
    assert_eq!(
        names(&body),
        vec!["Gizmo", "Relic", "Sprocket", "Wide Gadget", "Widget"]
    );
    assert_eq!(
        body["meta"]["pagination"],
        json!({"total": 5, "offset": 0, "limit": 10})
    );
}

#[tokio::test]
async fn test_exact_match_filter() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"name": "Gizmo"}), "");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Gizmo"]);
}

#[tokio::test]
async fn test_range_filter_both_bounds_inclusive() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"price": {"from": 100, "to": 400}}), "&sort=price");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Widget", "Wide Gadget", "Gizmo"]);
}

#[tokio::test]
async fn test_range_filter_single_bound() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"price": {"to": 50}}), "&sort=-price");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Sprocket", "Relic"]);

    let uri = filter_uri(&json!({"price": {"from": 0}}), "");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(body["meta"]["pagination"]["total"], 5);
}

#[tokio::test]
async fn test_partial_match_filter() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"name": {"like": "Wid"}}), "&sort=name");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Wide Gadget", "Widget"]);
}

#[tokio::test]
async fn test_null_filter() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"category": null}), "&sort=name");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Gizmo", "Relic"]);
}

#[tokio::test]
async fn test_datetime_equality_filter() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"discontinued_at": "2020-05-01T12:00:00+00:00"}), "");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Relic"]);

    let uri = filter_uri(&json!({"discontinued_at": "2021-05-01T12:00:00+00:00"}), "");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert!(names(&body).is_empty());
}

#[tokio::test]
async fn test_datetime_range_filter() {
    let app = seeded_app().await;

    let uri = filter_uri(
        &json!({"discontinued_at": {"from": "2020-01-01T00:00:00+00:00", "to": "2020-12-31T23:59:59+00:00"}}),
        "",
    );
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Relic"]);
    assert_eq!(body["meta"]["pagination"]["total"], 1);

    let uri = filter_uri(
        &json!({"discontinued_at": {"from": "2021-01-01T00:00:00+00:00"}}),
        "",
    );
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert!(names(&body).is_empty());
}

#[tokio::test]
async fn test_combined_filters_are_anded() {
    let app = seeded_app().await;

    let uri = filter_uri(
        &json!({"category": "tools", "price": {"from": 200}}),
        "",
    );
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(names(&body), vec!["Wide Gadget"]);
    assert_eq!(body["meta"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_pagination_reports_total_of_filtered_rows() {
    let app = seeded_app().await;

    let response = send(
        &app,
        empty_request("GET", "/api/v1/products?sort=-price&page=2&per_page=2"),
    )
    .await;
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "products 2-3/5"
    );
    let body = body_json(response).await;
    assert_eq!(names(&body), vec!["Widget", "Sprocket"]);
    assert_eq!(
        body["meta"]["pagination"],
        json!({"total": 5, "offset": 2, "limit": 2})
    );
}

#[tokio::test]
async fn test_page_past_the_end() {
    let app = seeded_app().await;

    let response = send(&app, empty_request("GET", "/api/v1/products?offset=50&limit=10")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "products */5"
    );
    let body = body_json(response).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["pagination"]["total"], 5);
}

#[tokio::test]
async fn test_react_admin_range_and_sort() {
    let app = seeded_app().await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/api/v1/products?range=%5B0%2C1%5D&sort=%5B%22price%22%2C%22DESC%22%5D",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(names(&body), vec!["Gizmo", "Wide Gadget"]);
}

#[tokio::test]
async fn test_collection_includes_are_deduplicated() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"category": "tools"}), "&include=category");
    let body = body_json(send(&app, empty_request("GET", &uri)).await).await;
    assert_eq!(body["included"], json!({"category": [{"name": "tools"}]}));
}

#[tokio::test]
async fn test_empty_result() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"name": "Nothing"}), "");
    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "products */0"
    );
    let body = body_json(response).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_unknown_filter_field_returns_400() {
    let app = seeded_app().await;

    let uri = filter_uri(&json!({"colour": "red"}), "");
    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "invalid_filter");
}

#[tokio::test]
async fn test_malformed_filter_returns_400() {
    let app = seeded_app().await;

    let response = send(&app, empty_request("GET", "/api/v1/products?filter=%7Bnope")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = filter_uri(&json!({"name": ["a", "b"]}), "");
    let response = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_sort_field_returns_400() {
    let app = seeded_app().await;

    let response = send(&app, empty_request("GET", "/api/v1/products?sort=colour")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
