use axum::{Extension, Json, extract::State};

use crate::error::AppResult;
use crate::services::support::{self, SupportOutcome, SupportRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

/// Submit a help center request; signed-in senders get a confirmation
pub async fn submit_request(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(payload): Json<SupportRequest>,
) -> AppResult<Json<SupportOutcome>> {
    let sender = claims.map(|Extension(claims)| claims.sub);
    let outcome = support::submit(&state.db, &state.notifications, sender, payload).await?;

    Ok(Json(outcome))
}
