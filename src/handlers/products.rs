use super::common::{
    created_response, no_content_response, success_response, PaginatedResponse,
    PaginationParams, ValidatedJson,
};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::products::{CreateProductInput, ProductFilter, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Catalog browsing is public; catalog changes require the admin role.
pub fn product_routes() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product));

    let admin = Router::new()
        .route("/products", post(create_product))
        .route(
            "/products/:id",
            patch(update_product).delete(delete_product),
        )
        .with_role("admin");

    public.merge(admin)
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<Response, ServiceError> {
    let (products, total) = state
        .services
        .products
        .list(&filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(success_response(PaginatedResponse::new(
        products,
        &pagination,
        total,
    )))
}

/// Product with manufacturer and partner offers
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let detail = state.services.products.get_detail(id).await?;
    Ok(success_response(detail))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateProductInput>,
) -> Result<Response, ServiceError> {
    let product = state.services.products.create(payload).await?;
    Ok(created_response(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductInput>,
) -> Result<Response, ServiceError> {
    let product = state.services.products.update(id, payload).await?;
    Ok(success_response(product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(no_content_response())
}
