use axum::{Extension, Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::profile::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::utils::validation::{validate_mobile, validate_not_blank};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub date_of_birth: NaiveDate,
    pub national_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        Self {
            id: p.id,
            email: p.email,
            role: p.role,
            name: p.name,
            address: p.address,
            mobile: p.mobile,
            date_of_birth: p.date_of_birth,
            national_id: p.national_id,
            created_at: p.created_at.with_timezone(&Utc),
            updated_at: p.updated_at.with_timezone(&Utc),
        }
    }
}

/// Editable profile fields. Email and national ID are fixed after registration.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub address: Option<String>,
    #[validate(custom = "validate_mobile")]
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ProfileResponse>> {
    let user = profile::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    payload.validate()?;

    let user = profile::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let mut active: profile::ActiveModel = user.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }

    if let Some(address) = payload.address {
        active.address = Set(address.trim().to_string());
    }

    if let Some(mobile) = payload.mobile {
        active.mobile = Set(mobile);
    }

    if let Some(date_of_birth) = payload.date_of_birth {
        active.date_of_birth = Set(date_of_birth);
    }

    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}
