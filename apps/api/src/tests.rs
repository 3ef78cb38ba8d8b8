use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use medpos_core::idempotency::InMemoryIdempotencyStore;
use medpos_core::InventoryItem;
use medpos_db::repository::inventory;
use medpos_db::{Database, DbConfig};
use medpos_engine::SaleEngine;

use crate::{router, AppState};

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    {
        let mut conn = db.connection().await.unwrap();
        inventory::insert(
            &mut conn,
            &InventoryItem {
                id: "para".to_string(),
                name: "Paracetamol 500mg".to_string(),
                unit_price_cents: 20,
                cost_price_cents: 12,
                stock_quantity: 50,
                unit_conversions: Some(r#"[{"type":"box","quantity":10}]"#.to_string()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    let engine = SaleEngine::new(db, Arc::new(InMemoryIdempotencyStore::default()));
    router(AppState::new(engine))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-actor-id", "user-1")
        .header("x-actor-name", "Akosua")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn sale_body(key: &str, quantity: i64) -> Value {
    json!({
        "items": [{ "item_id": "para", "quantity": quantity }],
        "payment_method": "cash",
        "idempotency_key": key,
    })
}

#[tokio::test]
async fn test_create_sale_returns_created_receipt() {
    let app = app().await;

    let (status, body) = send(&app, post_json("/api/sales", sale_body("k-1", 5))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["final_amount_cents"], 100);
    assert_eq!(body["data"]["final_profit_cents"], 40);
    assert_eq!(body["data"]["payment_method"], "CASH");
    assert_eq!(body["data"]["cashier"]["name"], "Akosua");

    let sale_id = body["data"]["sale_id"].as_str().unwrap().to_string();
    let (status, fetched) = send(&app, get(&format!("/api/sales/{sale_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["transaction_code"], body["data"]["transaction_code"]);

    let (_, movements) = send(&app, get(&format!("/api/movements?reference_id={sale_id}"))).await;
    assert_eq!(movements["data"].as_array().unwrap().len(), 1);
    assert_eq!(movements["data"][0]["movement_type"], "SALE");
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/sales")
        .header("content-type", "application/json")
        .body(Body::from(sale_body("k-1", 1).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_header_idempotency_key_blocks_resubmission() {
    let app = app().await;
    let body = json!({ "items": [{ "item_id": "para", "quantity": 1 }] });

    let with_key = |body: &Value| {
        let mut request = post_json("/api/sales", body.clone());
        request
            .headers_mut()
            .insert("idempotency-key", "till-7-42".parse().unwrap());
        request
    };

    let (first, _) = send(&app, with_key(&body)).await;
    let (second, error) = send(&app, with_key(&body)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(error["success"], false);

    let (_, sales) = send(&app, get("/api/sales")).await;
    assert_eq!(sales["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_business_failures_carry_reason() {
    let app = app().await;

    let (status, body) = send(&app, post_json("/api/sales", sale_body("k-big", 51))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Insufficient stock for Paracetamol 500mg: available 50, needed 51"
    );

    let credit = json!({
        "items": [{ "item_id": "para", "quantity": 1 }],
        "payment_method": "CREDIT",
        "customer_name": "Kwame",
        "idempotency_key": "k-credit",
    });
    let (status, body) = send(&app, post_json("/api/sales", credit)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Customer name and phone are required for credit sales");

    let (status, _) = send(&app, get("/api/sales/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/sales")
        .header("content-type", "application/json")
        .header("x-actor-id", "user-1")
        .body(Body::from("{\"items\": 12"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_credit_sale_void_and_payments() {
    let app = app().await;
    let credit = json!({
        "items": [{ "item_id": "para", "quantity": 2, "unit_type": "box" }],
        "payment_method": "credit",
        "customer_name": "Kwame Asante",
        "customer_phone": "0244123456",
        "idempotency_key": "k-credit",
    });

    let (status, body) = send(&app, post_json("/api/sales", credit)).await;
    assert_eq!(status, StatusCode::CREATED);
    let sale_id = body["data"]["sale_id"].as_str().unwrap().to_string();
    let receivable_id = body["data"]["receivable_id"].as_str().unwrap().to_string();

    let (status, paid) = send(
        &app,
        post_json(
            &format!("/api/receivables/{receivable_id}/payments"),
            json!({ "amount_cents": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["data"]["status"], "PARTIAL");

    let (_, movements) = send(&app, get("/api/inventory/para/movements")).await;
    assert_eq!(movements["data"][0]["new_stock"], 30);

    let (status, voided) = send(&app, post_json(&format!("/api/sales/{sale_id}/void"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voided["data"]["receivable_removed"], true);
    assert_eq!(voided["data"]["adjustments"][0]["new_stock"], 50);

    let (status, _) = send(&app, post_json(&format!("/api/sales/{sale_id}/void"), json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movements_query_requires_reference() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/movements")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}
