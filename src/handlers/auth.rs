use super::common::{created_response, success_response, ValidatedJson};
use crate::{
    auth::{normalize_phone, AuthRouterExt, AuthUser},
    entities::customer,
    errors::ServiceError,
    metrics,
    rate_limiter::login_key,
    services::customers::RegisterCustomerInput,
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Creates the router for authentication endpoints
pub fn auth_routes() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register));

    let session = Router::new()
        .route("/auth/session", get(session))
        .with_auth();

    public.merge(session)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub customer: customer::Model,
}

/// Exchange phone and password for a bearer token.
///
/// Attempts are limited per normalized phone; a successful login clears the counter.
async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    let phone = normalize_phone(&payload.phone)?;
    let key = login_key(&phone);

    let limit = state.login_limiter.check_rate_limit(&key);
    if !limit.allowed {
        warn!(phone = %phone, "Too many login attempts");
        metrics::record_rate_limited("login");
        metrics::record_login("rate_limited");
        return Ok(limit.rejection());
    }

    let customer = match state
        .services
        .customers
        .authenticate(&phone, &payload.password)
        .await
    {
        Ok(customer) => customer,
        Err(e) => {
            metrics::record_login("failure");
            return Err(e);
        }
    };

    state.login_limiter.reset(&key);
    let issued = state.auth.issue_token(&customer)?;
    metrics::record_login("success");
    info!(customer_id = %customer.id, "Customer logged in");

    Ok(success_response(LoginResponse {
        token: issued.token,
        token_type: issued.token_type,
        expires_in: issued.expires_in,
        customer,
    }))
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterCustomerInput>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.register(payload).await?;
    Ok(created_response(customer))
}

/// The customer behind the presented token
async fn session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.get(user.customer_id).await?;
    Ok(success_response(customer))
}
