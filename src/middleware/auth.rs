use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sea_orm::EntityTrait;

use crate::entities::revoked_token;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{Claims, verify_token};
use crate::AppState;

async fn session_claims(state: &AppState, token: &str) -> AppResult<Claims> {
    let claims = verify_token(token, &state.config.jwt_secret)?;

    let revoked = revoked_token::Entity::find_by_id(claims.jti)
        .one(&state.db)
        .await?;
    if revoked.is_some() {
        return Err(AppError::Unauthorized("Session has been signed out".to_string()));
    }

    Ok(claims)
}

/// Extract and validate the bearer token, rejecting signed-out sessions.
///
/// On success the [`Claims`] are available to handlers as an extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) =
        auth.ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = session_claims(&state, auth.token()).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Like [`auth_middleware`], but anonymous requests pass through without
/// [`Claims`]. A token that is present must still be valid.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(TypedHeader(auth)) = auth {
        let claims = session_claims(&state, auth.token()).await?;
        request.extensions_mut().insert(claims);
    }
    Ok(next.run(request).await)
}

/// Require admin role
pub async fn require_admin(
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if !claims.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}
