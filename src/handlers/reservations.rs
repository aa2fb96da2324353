use super::common::{
    created_response, success_response, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    services::reservations::{ConvertReservationInput, ReservationFilter, ReservationInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn reservation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/reservations/:id",
            get(get_reservation)
                .put(update_reservation)
                .delete(cancel_reservation),
        )
        .route("/reservations/:id/convert", post(convert_reservation))
        .with_auth()
}

async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ReservationFilter>,
) -> Result<Response, ServiceError> {
    let (reservations, total) = state
        .services
        .reservations
        .list(&user, &filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(success_response(PaginatedResponse::new(
        reservations,
        &pagination,
        total,
    )))
}

async fn get_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let reservation = state.services.reservations.get(&user, id).await?;
    Ok(success_response(reservation))
}

async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ReservationInput>,
) -> Result<Response, ServiceError> {
    let reservation = state.services.reservations.create(&user, payload).await?;
    Ok(created_response(reservation))
}

async fn update_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReservationInput>,
) -> Result<Response, ServiceError> {
    let reservation = state
        .services
        .reservations
        .update(&user, id, payload)
        .await?;
    Ok(success_response(reservation))
}

/// Cancels rather than deletes; the row stays for history.
async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let reservation = state.services.reservations.cancel(&user, id).await?;
    Ok(success_response(reservation))
}

/// The body is optional; without one the order takes its defaults from the reservation.
async fn convert_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<ValidatedJson<ConvertReservationInput>>,
) -> Result<Response, ServiceError> {
    let input = payload.map(|ValidatedJson(input)| input).unwrap_or_default();
    let order = state
        .services
        .reservations
        .convert(&user, id, input)
        .await?;
    Ok(created_response(order))
}
