use super::common::{created_response, no_content_response, success_response, ValidatedJson};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    services::favorites::AddFavoriteInput,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// The signed-in customer's favorite products
pub fn favorite_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:product_id", delete(remove_favorite))
        .with_auth()
}

async fn list_favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    let favorites = state.services.favorites.list(user.customer_id).await?;
    Ok(success_response(favorites))
}

async fn add_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<AddFavoriteInput>,
) -> Result<Response, ServiceError> {
    let favorite = state
        .services
        .favorites
        .add(user.customer_id, payload.product_id)
        .await?;
    Ok(created_response(favorite))
}

async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state
        .services
        .favorites
        .remove(user.customer_id, product_id)
        .await?;
    Ok(no_content_response())
}
