use super::common::{success_response, PaginatedResponse, PaginationParams, ValidatedJson};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::stock::{StockFilter, UpsertStockInput},
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

pub fn stock_routes() -> Router<Arc<AppState>> {
    let public = Router::new().route("/stock", get(list_stock));
    let admin = Router::new()
        .route("/stock", put(upsert_stock))
        .with_role("admin");
    public.merge(admin)
}

async fn list_stock(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<StockFilter>,
) -> Result<Response, ServiceError> {
    let (rows, total) = state
        .services
        .stock
        .list(&filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(success_response(PaginatedResponse::new(rows, &pagination, total)))
}

async fn upsert_stock(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<UpsertStockInput>,
) -> Result<Response, ServiceError> {
    let row = state.services.stock.upsert(payload).await?;
    Ok(success_response(row))
}
