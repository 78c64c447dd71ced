use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::vehicle::{self, CategoryTheme};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// A vehicle together with the display theme of its category
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: vehicle::Model,
    pub theme: CategoryTheme,
}

impl From<vehicle::Model> for VehicleResponse {
    fn from(vehicle: vehicle::Model) -> Self {
        let theme = vehicle.category.theme();
        Self { vehicle, theme }
    }
}

/// List vehicles that can be booked right now, newest first
pub async fn list_available(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::IsAvailable.eq(true))
        .order_by_desc(vehicle::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Get vehicle details
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<VehicleResponse>> {
    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    Ok(Json(vehicle.into()))
}
