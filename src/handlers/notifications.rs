use super::common::{created_response, no_content_response, success_response, ValidatedJson};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    services::notifications::{NotificationFilter, SendNotificationInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct MarkAllReadResponse {
    updated: u64,
}

pub fn notification_routes() -> Router<Arc<AppState>> {
    let customer = Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", patch(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
        .with_auth();

    let admin = Router::new()
        .route("/notifications", post(send_notification))
        .route("/notifications/:id", delete(delete_notification))
        .with_role("admin");

    customer.merge(admin)
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(filter): Query<NotificationFilter>,
) -> Result<Response, ServiceError> {
    let notifications = state
        .services
        .notifications
        .list(user.customer_id, &filter)
        .await?;
    Ok(success_response(notifications))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let notification = state
        .services
        .notifications
        .mark_read(user.customer_id, id)
        .await?;
    Ok(success_response(notification))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Response, ServiceError> {
    let updated = state
        .services
        .notifications
        .mark_all_read(user.customer_id)
        .await?;
    Ok(success_response(MarkAllReadResponse { updated }))
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SendNotificationInput>,
) -> Result<Response, ServiceError> {
    let notification = state.services.notifications.send(payload).await?;
    Ok(created_response(notification))
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.notifications.delete(id).await?;
    Ok(no_content_response())
}
