use super::common::{created_response, no_content_response, success_response, ValidatedJson};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::banners::{CreateBannerInput, UpdateBannerInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub fn banner_routes() -> Router<Arc<AppState>> {
    let public = Router::new().route("/banners", get(list_visible_banners));

    let admin = Router::new()
        .route("/banners", post(create_banner))
        .route("/banners/all", get(list_all_banners))
        .route(
            "/banners/:id",
            get(get_banner).patch(update_banner).delete(delete_banner),
        )
        .with_role("admin");

    public.merge(admin)
}

/// Banners currently on display
async fn list_visible_banners(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let banners = state.services.banners.list_visible(Utc::now()).await?;
    Ok(success_response(banners))
}

async fn list_all_banners(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let banners = state.services.banners.list_all().await?;
    Ok(success_response(banners))
}

async fn get_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let banner = state.services.banners.get(id).await?;
    Ok(success_response(banner))
}

async fn create_banner(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateBannerInput>,
) -> Result<Response, ServiceError> {
    let banner = state.services.banners.create(payload).await?;
    Ok(created_response(banner))
}

async fn update_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBannerInput>,
) -> Result<Response, ServiceError> {
    let banner = state.services.banners.update(id, payload).await?;
    Ok(success_response(banner))
}

async fn delete_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.banners.delete(id).await?;
    Ok(no_content_response())
}
