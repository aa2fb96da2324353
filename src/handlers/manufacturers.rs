use super::common::{created_response, no_content_response, success_response, ValidatedJson};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::manufacturers::{CreateManufacturerInput, UpdateManufacturerInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn manufacturer_routes() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/manufacturers", get(list_manufacturers))
        .route("/manufacturers/:id", get(get_manufacturer));

    let admin = Router::new()
        .route("/manufacturers", post(create_manufacturer))
        .route(
            "/manufacturers/:id",
            patch(update_manufacturer).delete(delete_manufacturer),
        )
        .with_role("admin");

    public.merge(admin)
}

async fn list_manufacturers(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let manufacturers = state.services.manufacturers.list().await?;
    Ok(success_response(manufacturers))
}

async fn get_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let manufacturer = state.services.manufacturers.get(id).await?;
    Ok(success_response(manufacturer))
}

async fn create_manufacturer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateManufacturerInput>,
) -> Result<Response, ServiceError> {
    let manufacturer = state.services.manufacturers.create(payload).await?;
    Ok(created_response(manufacturer))
}

async fn update_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateManufacturerInput>,
) -> Result<Response, ServiceError> {
    let manufacturer = state.services.manufacturers.update(id, payload).await?;
    Ok(success_response(manufacturer))
}

async fn delete_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.manufacturers.delete(id).await?;
    Ok(no_content_response())
}
