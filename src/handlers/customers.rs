use super::common::{
    created_response, no_content_response, success_response, PaginatedResponse,
    PaginationParams, ValidatedJson,
};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::customers::{CreateCustomerInput, CustomerFilter, UpdateCustomerInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Customer administration; every route requires the admin role.
pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
        .with_role("admin")
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Response, ServiceError> {
    let (customers, total) = state
        .services
        .customers
        .list(&filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(success_response(PaginatedResponse::new(
        customers,
        &pagination,
        total,
    )))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.get(id).await?;
    Ok(success_response(customer))
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateCustomerInput>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.create(payload).await?;
    Ok(created_response(customer))
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerInput>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.update(id, payload).await?;
    Ok(success_response(customer))
}

async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(no_content_response())
}
