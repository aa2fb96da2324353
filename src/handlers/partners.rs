use super::common::{created_response, no_content_response, success_response, ValidatedJson};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    services::partners::{
        CreatePartnerInput, LinkPartnerInput, UpdateOfferInput, UpdatePartnerInput,
    },
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

/// Partner management plus the product/partner offer links.
///
/// Reading a product's offers is public, everything else is admin only.
pub fn partner_routes() -> Router<Arc<AppState>> {
    let public = Router::new().route("/products/:id/partners", get(list_offers));

    let admin = Router::new()
        .route("/partners", get(list_partners).post(create_partner))
        .route(
            "/partners/:id",
            get(get_partner).patch(update_partner).delete(delete_partner),
        )
        .route("/products/:id/partners", post(link_partner))
        .route("/sku-partners/:id", patch(update_offer).delete(unlink_partner))
        .with_role("admin");

    public.merge(admin)
}

async fn list_partners(State(state): State<Arc<AppState>>) -> Result<Response, ServiceError> {
    let partners = state.services.partners.list().await?;
    Ok(success_response(partners))
}

async fn get_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let partner = state.services.partners.get(id).await?;
    Ok(success_response(partner))
}

async fn create_partner(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreatePartnerInput>,
) -> Result<Response, ServiceError> {
    let partner = state.services.partners.create(payload).await?;
    Ok(created_response(partner))
}

async fn update_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePartnerInput>,
) -> Result<Response, ServiceError> {
    let partner = state.services.partners.update(id, payload).await?;
    Ok(success_response(partner))
}

async fn delete_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.partners.delete(id).await?;
    Ok(no_content_response())
}

async fn list_offers(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let offers = state.services.partners.list_offers(product_id).await?;
    Ok(success_response(offers))
}

async fn link_partner(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<LinkPartnerInput>,
) -> Result<Response, ServiceError> {
    let offer = state.services.partners.link(product_id, payload).await?;
    Ok(created_response(offer))
}

async fn update_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOfferInput>,
) -> Result<Response, ServiceError> {
    let offer = state.services.partners.update_offer(id, payload).await?;
    Ok(success_response(offer))
}

async fn unlink_partner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.partners.unlink(id).await?;
    Ok(no_content_response())
}
