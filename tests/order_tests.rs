use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use merits::config::Config;
use sea_orm::ConnectionTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Bootstrap credentials seeded by the initial migration (must match
/// m20260815_initial.rs)
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "1234";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // Every pooled connection gets its own private in-memory database, so
    // the pool has to stay at exactly one connection.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    // Production hashing costs would dominate the suite's runtime.
    config.auth.argon2_memory_cost_kib = 1024;
    config.auth.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> Router {
    let state = merits::api::create_app_state(test_config(), None)
        .await
        .expect("Failed to create app state");
    merits::api::router(state)
}

fn req(method: &str, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookie.is_empty() {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            "/api/auth/login",
            "",
            Some(json!({ "username": username, "password": password })),
        ))
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        StatusCode::OK,
        "login as {username} should succeed"
    );

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

async fn create_account(app: &Router, cookie: &str, payload: Value) {
    let response = app
        .clone()
        .oneshot(req("POST", "/api/accounts", cookie, Some(payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Purchase as the signed-in account, asserting success; returns the order.
async fn purchase(app: &Router, cookie: &str, product: &str, cost: i64) -> Value {
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            "/api/orders",
            cookie,
            Some(json!({ "product": product, "cost": cost })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "buying {product}");
    body_json(response).await["data"].clone()
}

async fn current_points(app: &Router, cookie: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(req("GET", "/api/auth/me", cookie, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["points"].as_i64().unwrap()
}

#[tokio::test]
async fn test_purchases_debit_the_exact_cost() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({
            "username": "alice",
            "password": "alicepass1",
            "full_name": "Alice Liddell",
            "points": 5
        }),
    )
    .await;
    let alice = login(&app, "alice", "alicepass1").await;

    let order = purchase(&app, &alice, "Coffee Mug", 3).await;
    assert!(order["id"].as_i64().unwrap() >= 1);
    assert_eq!(order["username"], "alice");
    assert_eq!(order["recipient"], "Alice Liddell");
    assert_eq!(order["product"], "Coffee Mug");
    assert_eq!(order["cost"], 3);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["status_display"], "Pending");
    assert!(order["fulfilled_by"].is_null());
    assert!(order["created_at"].is_string());

    assert_eq!(current_points(&app, &alice).await, 2);

    // An exact-cost purchase is allowed: the floor applies to
    // administrative adjustments, not to spending
    purchase(&app, &alice, "Pen", 2).await;
    assert_eq!(current_points(&app, &alice).await, 0);
}

#[tokio::test]
async fn test_purchases_guard_the_balance() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({ "username": "bob", "password": "bobpass99", "points": 2 }),
    )
    .await;
    let bob = login(&app, "bob", "bobpass99").await;

    let response = app
        .clone()
        .oneshot(req(
            "POST",
            "/api/orders",
            &bob,
            Some(json!({ "product": "Coffee Mug", "cost": 3 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Not enough points for this purchase"
    );

    // The refusal left no trace: no order, no debit
    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders", &admin, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);
    assert_eq!(current_points(&app, &bob).await, 2);
}

#[tokio::test]
async fn test_purchase_validation_and_roles() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({ "username": "carl", "password": "carlpass99", "points": 10 }),
    )
    .await;
    create_account(
        &app,
        &admin,
        json!({ "username": "sue", "password": "suepass99", "role": "supervisor" }),
    )
    .await;
    let carl = login(&app, "carl", "carlpass99").await;

    let cases = [
        (json!({ "product": "", "cost": 3 }), "Product name is required"),
        (
            json!({ "product": "   ", "cost": 3 }),
            "Product name is required",
        ),
        (
            json!({ "product": "Mug", "cost": 0 }),
            "Cost must be a positive number",
        ),
        (
            json!({ "product": "Mug", "cost": -5 }),
            "Cost must be a positive number",
        ),
    ];

    for (payload, expected) in cases {
        let response = app
            .clone()
            .oneshot(req("POST", "/api/orders", &carl, Some(payload)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], expected);
    }

    // Only user-tier accounts spend points
    let sue = login(&app, "sue", "suepass99").await;
    for cookie in [&admin, &sue] {
        let response = app
            .clone()
            .oneshot(req(
                "POST",
                "/api/orders",
                cookie,
                Some(json!({ "product": "Mug", "cost": 1 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["error"],
            "Operation not permitted for this role"
        );
    }

    assert_eq!(current_points(&app, &carl).await, 10);
}

#[tokio::test]
async fn test_fulfillment_is_one_way() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({ "username": "alice", "password": "alicepass1", "points": 10 }),
    )
    .await;
    create_account(
        &app,
        &admin,
        json!({
            "username": "sam",
            "password": "sampass99",
            "full_name": "Sam Spade",
            "role": "supervisor"
        }),
    )
    .await;
    let alice = login(&app, "alice", "alicepass1").await;

    let first = purchase(&app, &alice, "Coffee Mug", 3).await["id"]
        .as_i64()
        .unwrap();
    let second = purchase(&app, &alice, "Pen", 1).await["id"].as_i64().unwrap();

    // Purchasers cannot fulfill, not even their own orders
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{first}/fulfill"),
            &alice,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{first}/fulfill"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "fulfilled");
    assert_eq!(body["data"]["status_display"], "Fulfilled");
    assert_eq!(body["data"]["fulfilled_by"], "Administrator");

    // Fulfilled is final
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{first}/fulfill"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Order has already been fulfilled"
    );

    let response = app
        .clone()
        .oneshot(req("POST", "/api/orders/9999/fulfill", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Order not found");

    // Supervisors fulfill too, stamped with their display name
    let sam = login(&app, "sam", "sampass99").await;
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{second}/fulfill"),
            &sam,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["fulfilled_by"], "Sam Spade");
}

#[tokio::test]
async fn test_order_listing_roles_and_filters() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({ "username": "alice", "password": "alicepass1", "points": 10 }),
    )
    .await;
    create_account(
        &app,
        &admin,
        json!({ "username": "sue", "password": "suepass99", "role": "supervisor" }),
    )
    .await;
    let alice = login(&app, "alice", "alicepass1").await;

    let mug = purchase(&app, &alice, "Coffee Mug", 3).await["id"]
        .as_i64()
        .unwrap();
    purchase(&app, &alice, "Pen", 1).await;

    // Purchasers do not see the ledger
    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders", &alice, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Administrators see everything, newest first
    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["product"], "Pen");
    assert_eq!(orders[1]["product"], "Coffee Mug");

    let sue = login(&app, "sue", "suepass99").await;
    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders", &sue, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    // The pending filter hides fulfilled orders
    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{mug}/fulfill"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders?status=pending", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["product"], "Pen");

    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders?status=all", &admin, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders?status=bogus", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Unknown status filter: bogus"
    );
}

#[tokio::test]
async fn test_orders_keep_purchaser_identity() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({
            "username": "alice",
            "password": "alicepass1",
            "full_name": "Alice Liddell",
            "points": 5
        }),
    )
    .await;
    let alice = login(&app, "alice", "alicepass1").await;
    purchase(&app, &alice, "Coffee Mug", 2).await;

    let response = app
        .clone()
        .oneshot(req("DELETE", "/api/accounts/alice", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The order still names its purchaser after the account is gone
    let response = app
        .clone()
        .oneshot(req("GET", "/api/orders", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["username"], "alice");
    assert_eq!(orders[0]["recipient"], "Alice Liddell");
    assert_eq!(orders[0]["status"], "pending");
}

#[tokio::test]
async fn test_order_export_renders_csv() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    create_account(
        &app,
        &admin,
        json!({
            "username": "alice",
            "password": "alicepass1",
            "full_name": "Alice Liddell",
            "points": 5
        }),
    )
    .await;
    create_account(
        &app,
        &admin,
        json!({ "username": "sue", "password": "suepass99", "role": "supervisor" }),
    )
    .await;
    let alice = login(&app, "alice", "alicepass1").await;

    let mug = purchase(&app, &alice, "Coffee Mug", 2).await["id"]
        .as_i64()
        .unwrap();
    purchase(&app, &alice, "Pen", 1).await;

    let response = app
        .clone()
        .oneshot(req(
            "POST",
            &format!("/api/orders/{mug}/fulfill"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(req("GET", "/api/reports/orders", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv");
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"orders_"));
    assert!(disposition.ends_with(".csv\""));

    let csv = body_text(response).await;
    assert!(csv.starts_with("Recipient,Login,Product,Cost,Status,Fulfilled By,Created,Updated"));
    assert!(csv.contains("Alice Liddell,alice,Coffee Mug,2,Fulfilled,Administrator"));
    assert!(csv.contains("Alice Liddell,alice,Pen,1,Pending,,"));

    // Supervisors export the same ledger; users export nothing
    let sue = login(&app, "sue", "suepass99").await;
    let response = app
        .clone()
        .oneshot(req("GET", "/api/reports/orders", &sue, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(req("GET", "/api/reports/orders", &alice, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_orders_table_reads_as_empty() {
    let state = merits::api::create_app_state(test_config(), None)
        .await
        .expect("Failed to create app state");

    state
        .store
        .conn
        .execute_unprepared("DROP TABLE orders")
        .await
        .expect("Failed to drop orders table");

    let app = merits::api::router(state);
    let admin = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Listing treats the absent table as an empty ledger
    for uri in ["/api/orders", "/api/orders?status=pending"] {
        let response = app
            .clone()
            .oneshot(req("GET", uri, &admin, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    // Recording a purchase without the table is a hard error
    create_account(
        &app,
        &admin,
        json!({ "username": "zed", "password": "zedpass99", "points": 5 }),
    )
    .await;
    let zed = login(&app, "zed", "zedpass99").await;

    let response = app
        .clone()
        .oneshot(req(
            "POST",
            "/api/orders",
            &zed,
            Some(json!({ "product": "Mug", "cost": 1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "An internal error occurred"
    );
}
