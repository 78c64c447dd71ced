use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::profile::{self, UserRole};
use crate::entities::revoked_token;
use crate::error::{AppError, AppResult};
use crate::handlers::profile::ProfileResponse;
use crate::utils::jwt::{Claims, create_token};
use crate::utils::validation::{validate_mobile, validate_national_id, validate_not_blank};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    pub date_of_birth: NaiveDate,
    #[validate(custom = "validate_national_id")]
    pub national_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: ProfileResponse,
    pub expires_at: DateTime<Utc>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn issue_token(state: &AppState, user: profile::Model) -> AppResult<AuthResponse> {
    let token = create_token(
        user.id,
        &user.email,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
    })
}

/// Register a new customer account with its KYC profile
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let email = normalize_email(&payload.email);

    // Check if email already exists
    let existing = profile::Entity::find()
        .filter(profile::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now().fixed_offset();

    let new_user = profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(UserRole::Customer),
        name: Set(payload.name.trim().to_string()),
        address: Set(payload.address.trim().to_string()),
        mobile: Set(payload.mobile),
        date_of_birth: Set(payload.date_of_birth),
        national_id: Set(payload.national_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // Unique index still guards against a concurrent registration
    let user = new_user
        .insert(&state.db)
        .await
        .map_err(|e| AppError::duplicate_as_conflict(e, "Email already registered"))?;
    tracing::info!(user_id = %user.id, "Customer registered");

    Ok(Json(issue_token(&state, user)?))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = profile::Entity::find()
        .filter(profile::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(issue_token(&state, user)?))
}

/// Sign out: the token's session id is revoked until the token expires
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<serde_json::Value>> {
    revoked_token::ActiveModel {
        jti: Set(claims.jti),
        expires_at: Set(claims.expires_at().fixed_offset()),
    }
    .insert(&state.db)
    .await?;

    // Expired tokens fail verification anyway
    let pruned = revoked_token::Entity::delete_many()
        .filter(revoked_token::Column::ExpiresAt.lt(Utc::now().fixed_offset()))
        .exec(&state.db)
        .await?;

    tracing::debug!(
        user_id = %claims.sub,
        pruned = pruned.rows_affected,
        "Session signed out"
    );

    Ok(Json(serde_json::json!({ "message": "Signed out" })))
}

/// Current session: the caller's profile and token expiry
pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<SessionResponse>> {
    let user = profile::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(SessionResponse {
        user: user.into(),
        expires_at: claims.expires_at(),
    }))
}
