use super::common::{
    created_response, no_content_response, success_response, PaginatedResponse,
    PaginationParams, ValidatedJson,
};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    services::purchase_orders::{PurchaseOrderFilter, PurchaseOrderInput, UpdateStatusInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<Arc<AppState>> {
    let customer = Router::new()
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route(
            "/purchase-orders/:id",
            get(get_purchase_order).put(update_purchase_order),
        )
        .with_auth();

    let admin = Router::new()
        .route("/purchase-orders/:id/status", patch(update_status))
        .route("/purchase-orders/:id", delete(delete_purchase_order))
        .with_role("admin");

    customer.merge(admin)
}

async fn list_purchase_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> Result<Response, ServiceError> {
    let (orders, total) = state
        .services
        .purchase_orders
        .list(&user, &filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(success_response(PaginatedResponse::new(
        orders,
        &pagination,
        total,
    )))
}

async fn get_purchase_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.purchase_orders.get(&user, id).await?;
    Ok(success_response(order))
}

async fn create_purchase_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<PurchaseOrderInput>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .create(&user, payload)
        .await?;
    Ok(created_response(order))
}

/// Full replacement of the order and its products, payments and files
async fn update_purchase_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PurchaseOrderInput>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .update(&user, id, payload)
        .await?;
    Ok(success_response(order))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusInput>,
) -> Result<Response, ServiceError> {
    let order = state
        .services
        .purchase_orders
        .update_status(id, payload.status)
        .await?;
    Ok(success_response(order))
}

async fn delete_purchase_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.purchase_orders.delete(id).await?;
    Ok(no_content_response())
}
