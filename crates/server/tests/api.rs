//! HTTP API tests driven through the router, no TCP listener involved.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use ledger::Ledger;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::util::ServiceExt;

async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");

    for (username, password, role) in [
        ("boss", "secret", "admin"),
        ("clerk", "secret", "employee"),
    ] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            [username.into(), password.into(), role.into()],
        ))
        .await
        .expect("seed user");
    }

    db
}

async fn test_app() -> Router {
    let db = test_db().await;
    let ledger = Ledger::builder().database(db.clone()).build();
    server::app(ledger, db)
}

fn basic(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

async fn request(
    app: Router,
    method: &str,
    uri: &str,
    auth: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, json)
}

/// Create a product and stock it via a cash purchase. Returns the
/// product id as a JSON string.
async fn seed_product(app: &Router, name: &str, price_minor: i64, stock: i64, cost_minor: i64) -> Value {
    let (status, product) = request(
        app.clone(),
        "POST",
        "/products",
        &basic("boss", "secret"),
        Some(json!({ "name": name, "category": "grocery", "unit_price_minor": price_minor })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = product["id"].clone();

    let (status, _) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("boss", "secret"),
        Some(json!({
            "kind": "purchase",
            "counterparty": "Distribuidora Norte",
            "payment_mode": "cash",
            "items": [{ "product_id": id, "quantity": stock, "unit_price_minor": cost_minor }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    id
}

#[tokio::test]
async fn rejects_missing_and_bad_credentials() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = request(app, "GET", "/products", &basic("boss", "wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cash_sale_is_created_settled_and_decrements_stock() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Arroz 5lb", 80_00, 10, 50_00).await;

    let (status, entry) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Luis",
            "payment_mode": "cash",
            "items": [{ "product_id": product_id, "quantity": 1, "unit_price_minor": null }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["invoice_id"], "V-00001");
    assert_eq!(entry["principal_minor"], 80_00);
    assert_eq!(entry["paid_minor"], 80_00);
    assert_eq!(entry["outstanding_minor"], 0);
    assert_eq!(entry["status"], "settled");
    assert_eq!(entry["payments"].as_array().map(Vec::len), Some(1));

    let (status, products) = request(
        app,
        "GET",
        "/products",
        &basic("clerk", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products["products"][0]["quantity"], 9);
}

#[tokio::test]
async fn credit_sale_settles_through_partial_payments() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Aceite", 150_00, 5, 90_00).await;

    let (status, entry) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Ana",
            "payment_mode": "credit",
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["status"], "open");
    assert_eq!(entry["outstanding_minor"], 150_00);
    let invoice_id = entry["invoice_id"].as_str().expect("invoice id").to_string();

    let uri = format!("/entries/{invoice_id}/payments");
    let (status, entry) = request(
        app.clone(),
        "POST",
        &uri,
        &basic("boss", "secret"),
        Some(json!({ "amount_minor": 50_00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["paid_minor"], 50_00);
    assert_eq!(entry["outstanding_minor"], 100_00);
    assert_eq!(entry["status"], "open");

    let (status, entry) = request(
        app.clone(),
        "POST",
        &uri,
        &basic("boss", "secret"),
        Some(json!({ "amount_minor": 100_00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["outstanding_minor"], 0);
    assert_eq!(entry["status"], "settled");
    assert_eq!(entry["payments"].as_array().map(Vec::len), Some(2));

    // Settled means no further payments, however small.
    let (status, body) = request(
        app,
        "POST",
        &uri,
        &basic("boss", "secret"),
        Some(json!({ "amount_minor": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().expect("error").contains("settled"));
}

#[tokio::test]
async fn payments_and_cancellation_require_admin() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Habichuelas", 60_00, 4, 35_00).await;

    let (_, entry) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Ana",
            "payment_mode": "credit",
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    let invoice_id = entry["invoice_id"].as_str().expect("invoice id").to_string();

    let (status, _) = request(
        app.clone(),
        "POST",
        &format!("/entries/{invoice_id}/payments"),
        &basic("clerk", "secret"),
        Some(json!({ "amount_minor": 10_00 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        app,
        "POST",
        &format!("/entries/{invoice_id}/cancel"),
        &basic("clerk", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cancelling_twice_conflicts() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Leche", 70_00, 6, 45_00).await;

    let (_, entry) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("boss", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Luis",
            "payment_mode": "cash",
            "items": [{ "product_id": product_id, "quantity": 2 }],
        })),
    )
    .await;
    let uri = format!(
        "/entries/{}/cancel",
        entry["invoice_id"].as_str().expect("invoice id")
    );

    let (status, _) = request(app.clone(), "POST", &uri, &basic("boss", "secret"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(app.clone(), "POST", &uri, &basic("boss", "secret"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Stock was restored exactly once.
    let (_, products) = request(app, "GET", "/products", &basic("boss", "secret"), None).await;
    assert_eq!(products["products"][0]["quantity"], 6);
}

#[tokio::test]
async fn oversell_is_rejected_with_422() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Café", 120_00, 2, 80_00).await;

    let (status, body) = request(
        app,
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Ana",
            "payment_mode": "cash",
            "items": [{ "product_id": product_id, "quantity": 3 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().expect("error").contains("Café"));
}

#[tokio::test]
async fn unknown_entry_is_404() {
    let app = test_app().await;
    let (status, _) = request(
        app,
        "GET",
        "/entries/V-99999",
        &basic("clerk", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn monthly_report_includes_profit() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Azúcar", 40_00, 10, 20_00).await;

    let (status, _) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Luis",
            "payment_mode": "cash",
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let today = chrono::Utc::now().date_naive();
    let (status, report) = request(
        app,
        "GET",
        &format!("/reports/monthly?start={today}&end={today}"),
        &basic("boss", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let month = &report["months"][0];
    assert_eq!(month["revenue_cash_minor"], 40_00);
    assert_eq!(month["cost_of_goods_sold_minor"], 20_00);
    assert_eq!(month["profit_minor"], 20_00);
    assert_eq!(month["items_sold"], 1);
}

#[tokio::test]
async fn expenses_are_admin_only_with_monthly_totals() {
    let app = test_app().await;

    let payload = json!({
        "description": "Alquiler local",
        "category": "fijo",
        "amount_minor": 500_00,
        "spent_at": "2026-02-03",
    });
    let (status, _) = request(
        app.clone(),
        "POST",
        "/expenses",
        &basic("clerk", "secret"),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, expense) = request(
        app.clone(),
        "POST",
        "/expenses",
        &basic("boss", "secret"),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["amount_minor"], 500_00);
    assert_eq!(expense["recorded_by"], "boss");
    let id = expense["id"].as_str().expect("expense id").to_string();

    let (status, _) = request(
        app.clone(),
        "POST",
        "/expenses",
        &basic("boss", "secret"),
        Some(json!({
            "description": "Luz",
            "category": "servicios",
            "amount_minor": 250_00,
            "spent_at": "2026-03-10",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        app.clone(),
        "POST",
        "/expenses",
        &basic("boss", "secret"),
        Some(json!({ "description": "  ", "amount_minor": 10_00, "spent_at": "2026-03-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = request(
        app.clone(),
        "GET",
        "/expenses",
        &basic("boss", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["expenses"].as_array().map(Vec::len), Some(2));
    assert_eq!(list["expenses"][0]["description"], "Luz");

    let (status, monthly) = request(
        app.clone(),
        "GET",
        "/expenses/monthly",
        &basic("boss", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(monthly["months"][0]["month"], 3);
    assert_eq!(monthly["months"][0]["total_minor"], 250_00);
    assert_eq!(monthly["months"][1]["total_minor"], 500_00);

    let (status, _) = request(
        app.clone(),
        "DELETE",
        &format!("/expenses/{id}"),
        &basic("clerk", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        app.clone(),
        "DELETE",
        &format!("/expenses/{id}"),
        &basic("boss", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        app,
        "DELETE",
        &format!("/expenses/{id}"),
        &basic("boss", "secret"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_trail_is_admin_only_and_records_actions() {
    let app = test_app().await;
    let product_id = seed_product(&app, "Sal", 25_00, 8, 10_00).await;

    let (_, entry) = request(
        app.clone(),
        "POST",
        "/entries",
        &basic("clerk", "secret"),
        Some(json!({
            "kind": "sale",
            "counterparty": "Ana",
            "payment_mode": "credit",
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    let invoice_id = entry["invoice_id"].as_str().expect("invoice id");

    let (status, _) = request(app.clone(), "GET", "/audit", &basic("clerk", "secret"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, audit) = request(app, "GET", "/audit", &basic("boss", "secret"), None).await;
    assert_eq!(status, StatusCode::OK);
    let events = audit["events"].as_array().expect("events");
    // Seed purchase plus the credit sale.
    assert!(events.iter().any(|e| e["action"] == "purchase"));
    assert!(
        events
            .iter()
            .any(|e| e["action"] == "sale" && e["invoice_id"] == invoice_id)
    );
}
