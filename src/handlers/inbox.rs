use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::notification;
use crate::error::AppResult;
use crate::services::notifications;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NotificationInbox {
    pub unread_count: u64,
    pub notifications: Vec<notification::Model>,
}

/// Notifications addressed to the caller, newest first
pub async fn my_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<NotificationInbox>> {
    let recipient = Some(claims.sub);

    Ok(Json(NotificationInbox {
        notifications: notifications::list(&state.db, recipient).await?,
        unread_count: notifications::unread_count(&state.db, recipient).await?,
    }))
}

/// Mark one of the caller's notifications read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<notification::Model>> {
    Ok(Json(
        notifications::mark_read(&state.db, Some(claims.sub), id).await?,
    ))
}
