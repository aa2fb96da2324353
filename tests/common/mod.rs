//! Shared harness for the HTTP integration tests.
//!
//! Every `TestApp` owns a fresh in-memory SQLite database, so the per-IP and
//! per-phone limiters start empty too.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use marketplace_api::{
    config::AppConfig,
    db,
    entities::{customer, partner, product, CustomerRole},
    services::{
        customers::CreateCustomerInput,
        partners::{CreatePartnerInput, LinkPartnerInput},
        products::CreateProductInput,
    },
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_PHONE: &str = "+79990000001";
pub const CUSTOMER_PHONE: &str = "+79990000002";
pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: customer::Model,
    pub customer: customer::Model,
    admin_token: String,
    customer_token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);

        let admin = seed_customer(&state, ADMIN_PHONE, "Admin", CustomerRole::Admin).await;
        let customer = seed_customer(&state, CUSTOMER_PHONE, "Buyer", CustomerRole::Customer).await;

        let admin_token = state.auth.issue_token(&admin).expect("admin token").token;
        let customer_token = state
            .auth
            .issue_token(&customer)
            .expect("customer token")
            .token;

        let router = marketplace_api::build_router(state.clone());

        Self {
            router,
            state,
            admin,
            customer,
            admin_token,
            customer_token,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn customer_token(&self) -> &str {
        &self.customer_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body (`Null` when empty).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, body, Some(self.admin_token())).await
    }

    pub async fn as_customer(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call(method, uri, body, Some(self.customer_token())).await
    }

    pub async fn seed_product(&self, sku: &str, base_price: &str) -> product::Model {
        self.state
            .services
            .products
            .create(CreateProductInput {
                sku: sku.to_string(),
                name: format!("Product {}", sku),
                description: None,
                manufacturer_id: None,
                category: Some("fasteners".to_string()),
                unit: None,
                base_price: dec(base_price),
                image_url: None,
                is_active: Some(true),
            })
            .await
            .expect("seed product for tests")
    }

    pub async fn seed_partner(&self, name: &str) -> partner::Model {
        self.state
            .services
            .partners
            .create(CreatePartnerInput {
                name: name.to_string(),
                legal_name: None,
                tax_id: None,
                email: None,
                phone: None,
                address: None,
                is_active: Some(true),
            })
            .await
            .expect("seed partner for tests")
    }

    /// Links `partner` to `product` at the given price
    pub async fn seed_offer(&self, product: &product::Model, partner: &partner::Model, price: &str) {
        self.state
            .services
            .partners
            .link(
                product.id,
                LinkPartnerInput {
                    partner_id: partner.id,
                    partner_sku: None,
                    price: dec(price),
                    stock: Some(100),
                    lead_time_days: Some(3),
                },
            )
            .await
            .expect("seed offer for tests");
    }
}

async fn seed_customer(
    state: &AppState,
    phone: &str,
    name: &str,
    role: CustomerRole,
) -> customer::Model {
    state
        .services
        .customers
        .create(CreateCustomerInput {
            phone: phone.to_string(),
            password: PASSWORD.to_string(),
            name: name.to_string(),
            company_name: Some(format!("{} LLC", name)),
            email: None,
            tax_id: None,
            role: Some(role),
            is_active: Some(true),
        })
        .await
        .expect("seed customer for tests")
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body bytes")
        .to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal literal")
}

/// Reads a decimal field that was serialized as a string.
pub fn dec_field(value: &Value) -> Decimal {
    let raw = value.as_str().expect("decimal serialized as string");
    dec(raw)
}
