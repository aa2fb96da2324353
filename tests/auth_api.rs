//! Login, registration and session endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, CUSTOMER_PHONE, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn login_accepts_any_phone_format() {
    let app = TestApp::new().await;

    // +79990000002 written the local way
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": "8 (999) 000-00-02", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 7 * 24 * 60 * 60);
    assert_eq!(body["customer"]["phone"], CUSTOMER_PHONE);
    assert!(body["customer"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    let (status, session) = app
        .call(Method::GET, "/api/auth/session", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["id"], app.customer.id.to_string());
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE, "password": "not-the-password" })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn login_rejects_unknown_phone_like_wrong_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": "+79995554433", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Invalid phone or password");
}

#[tokio::test]
async fn login_validates_the_body() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": "12-34", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_is_rate_limited_per_phone() {
    let app = TestApp::new().await;
    let attempts = app.state.config.login_rate_limit_attempts;

    for _ in 0..attempts {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "phone": CUSTOMER_PHONE, "password": "wrong-password" })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused until the window passes
    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    // Other phones have their own counter
    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": common::ADMIN_PHONE, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn successful_login_clears_failed_attempts() {
    let app = TestApp::new().await;
    let attempts = app.state.config.login_rate_limit_attempts;

    for _ in 0..attempts - 1 {
        app.call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE, "password": "wrong-password" })),
            None,
        )
        .await;
    }
    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..attempts - 1 {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "phone": CUSTOMER_PHONE, "password": "wrong-password" })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn disabled_account_cannot_log_in() {
    let app = TestApp::new().await;

    let (status, _) = app
        .as_admin(
            Method::PATCH,
            &format!("/api/customers/{}", app.customer.id),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": CUSTOMER_PHONE, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Account is disabled");
}

#[tokio::test]
async fn register_then_duplicate_phone_conflicts() {
    let app = TestApp::new().await;
    let payload = json!({
        "phone": "9123456789",
        "password": "long-enough-pw",
        "name": "New Buyer",
        "company_name": "Buyer Co"
    });

    let (status, body) = app
        .call(Method::POST, "/api/auth/register", Some(payload.clone()), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["phone"], "+79123456789");
    assert_eq!(body["role"], "customer");

    let (status, _) = app
        .call(Method::POST, "/api/auth/register", Some(payload), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn session_requires_a_valid_token() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/api/auth/session", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/api/auth/session", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_manages_customer_accounts() {
    let app = TestApp::new().await;

    let (status, _) = app.as_customer(Method::GET, "/api/customers", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .as_admin(
            Method::POST,
            "/api/customers",
            Some(json!({
                "phone": "+7 912 000 11 22",
                "password": "temporary-pass",
                "name": "Field Office",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["phone"], "+79120001122");
    assert_eq!(created["role"], "admin");

    let (status, page) = app
        .as_admin(Method::GET, "/api/customers?search=Field", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);

    // Moving onto a taken phone conflicts
    let uri = format!("/api/customers/{}", created["id"].as_str().unwrap());
    let (status, _) = app
        .as_admin(Method::PATCH, &uri, Some(json!({ "phone": CUSTOMER_PHONE })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customers_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product = app.seed_product("CEMENT-50", "7.20").await;

    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/reservations",
            Some(json!({ "items": [{ "product_id": product.id, "quantity": 3 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .as_customer(
            Method::POST,
            "/api/purchase-orders",
            Some(json!({ "products": [{ "product_id": product.id, "quantity": 10 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/customers/{}", app.customer.id);
    let (status, body) = app.as_admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    let (status, _) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    // Reservations alone do not block removal
    let (status, other) = app
        .call(
            Method::POST,
            "/api/auth/register",
            Some(json!({
                "phone": "+79995550011",
                "password": "reserved-only",
                "name": "Window Shopper"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, login) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "phone": "+79995550011", "password": "reserved-only" })),
            None,
        )
        .await;
    let other_token = login["token"].as_str().unwrap().to_string();
    let (status, _) = app
        .call(
            Method::POST,
            "/api/reservations",
            Some(json!({ "items": [{ "product_id": product.id, "quantity": 1 }] })),
            Some(&other_token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let other_id = other["id"].as_str().unwrap();
    let (status, _) = app
        .as_admin(Method::DELETE, &format!("/api/customers/{}", other_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
