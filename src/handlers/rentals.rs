use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::vehicle::{self, FuelType, VehicleCategory};
use crate::error::AppResult;
use crate::services::rental;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub duration_hours: i32,
}

#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RentedVehicle {
    pub id: Uuid,
    pub name: String,
    pub category: VehicleCategory,
    pub fuel_type: FuelType,
    pub image_url: String,
}

impl From<vehicle::Model> for RentedVehicle {
    fn from(v: vehicle::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            category: v.category,
            fuel_type: v.fuel_type,
            image_url: v.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub vehicle: Option<RentedVehicle>,
    pub duration_hours: i32,
    pub total_cost: f64,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub booking_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    fn new(b: booking::Model, vehicle: Option<vehicle::Model>) -> Self {
        Self {
            id: b.id,
            vehicle: vehicle.map(Into::into),
            duration_hours: b.duration_hours,
            total_cost: b.total_cost,
            status: b.status,
            cancellation_reason: b.cancellation_reason,
            booking_time: b.booking_time.with_timezone(&Utc),
            created_at: b.created_at.with_timezone(&Utc),
        }
    }
}

/// Book a vehicle for a number of hours
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let outcome = rental::create_booking(
        &state.db,
        &state.notifications,
        claims.sub,
        payload.vehicle_id,
        payload.duration_hours,
    )
    .await?;

    Ok(Json(BookingResponse::new(outcome.booking, Some(outcome.vehicle))))
}

/// List the caller's active bookings, newest first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = booking::Entity::find()
        .find_also_related(vehicle::Entity)
        .filter(booking::Column::UserId.eq(claims.sub))
        .filter(booking::Column::Status.eq(BookingStatus::Active))
        .order_by_desc(booking::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(
        bookings
            .into_iter()
            .map(|(b, v)| BookingResponse::new(b, v))
            .collect(),
    ))
}

/// Cancel one of the caller's active bookings
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CancelBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    let outcome = rental::cancel_booking(
        &state.db,
        &state.notifications,
        claims.sub,
        booking_id,
        &payload.reason,
    )
    .await?;

    Ok(Json(BookingResponse::new(outcome.booking, Some(outcome.vehicle))))
}
