use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Query,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::notification;
use crate::entities::profile;
use crate::entities::vehicle::{self, FuelType, VehicleCategory};
use crate::error::{AppError, AppResult};
use crate::handlers::catalog::VehicleResponse;
use crate::handlers::inbox::NotificationInbox;
use crate::services::images::{self, ResolvedImage};
use crate::services::notifications;
use crate::utils::validation::{validate_hourly_rate, validate_not_blank};
use crate::AppState;

// ============ Vehicle Management ============

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub category: VehicleCategory,
    pub fuel_type: FuelType,
    pub hourly_rate: f64,
    /// Filled from the curated image table when blank
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub category: Option<VehicleCategory>,
    pub fuel_type: Option<FuelType>,
    pub hourly_rate: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveImageRequest {
    pub name: String,
    pub category: VehicleCategory,
}

fn check_name(name: &str) -> AppResult<()> {
    validate_not_blank(name).map_err(|e| AppError::field("name", e))
}

fn check_rate(rate: f64) -> AppResult<()> {
    validate_hourly_rate(rate).map_err(|e| AppError::field("hourly_rate", e))
}

/// List every vehicle, booked or not (admin)
pub async fn list_vehicles(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = vehicle::Entity::find()
        .order_by_desc(vehicle::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Add a vehicle to the fleet (admin)
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    check_name(&payload.name)?;
    check_rate(payload.hourly_rate)?;

    let image_url = payload
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| {
            images::resolve(&payload.name, payload.category.as_str()).to_string()
        });

    let now = Utc::now().fixed_offset();
    let vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        category: Set(payload.category),
        fuel_type: Set(payload.fuel_type),
        hourly_rate: Set(payload.hourly_rate),
        image_url: Set(image_url),
        is_available: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = vehicle.insert(&state.db).await?;
    tracing::info!(vehicle_id = %result.id, name = %result.name, "Vehicle added");

    Ok(Json(result.into()))
}

/// Update a vehicle (admin)
///
/// Availability is owned by the booking workflows and cannot be set here.
/// Rate changes never touch the cost of existing bookings.
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    let vehicle = vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let mut active: vehicle::ActiveModel = vehicle.into();

    if let Some(name) = payload.name {
        check_name(&name)?;
        active.name = Set(name.trim().to_string());
    }

    if let Some(category) = payload.category {
        active.category = Set(category);
    }

    if let Some(fuel_type) = payload.fuel_type {
        active.fuel_type = Set(fuel_type);
    }

    if let Some(rate) = payload.hourly_rate {
        check_rate(rate)?;
        active.hourly_rate = Set(rate);
    }

    if let Some(url) = payload.image_url {
        if url.trim().is_empty() {
            return Err(AppError::BadRequest("Image URL is required".to_string()));
        }
        active.image_url = Set(url.trim().to_string());
    }

    active.updated_at = Set(Utc::now().fixed_offset());

    let result = active.update(&state.db).await?;
    Ok(Json(result.into()))
}

/// Delete a vehicle (admin). Refused while it is rented out.
///
/// The rental check is part of the DELETE itself, so a booking committed
/// concurrently cannot be cascaded away.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let active_bookings = Query::select()
        .column(booking::Column::VehicleId)
        .from(booking::Entity)
        .and_where(booking::Column::Status.eq(BookingStatus::Active))
        .to_owned();

    let result = vehicle::Entity::delete_many()
        .filter(vehicle::Column::Id.eq(id))
        .filter(vehicle::Column::IsAvailable.eq(true))
        .filter(vehicle::Column::Id.not_in_subquery(active_bookings))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        let exists = vehicle::Entity::find_by_id(id).one(&state.db).await?.is_some();
        return Err(if exists {
            AppError::Conflict("Vehicle has an active booking".to_string())
        } else {
            AppError::NotFound("Vehicle not found".to_string())
        });
    }

    tracing::info!(vehicle_id = %id, "Vehicle deleted");
    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}

/// Suggest a display image for a vehicle name (admin)
pub async fn resolve_image(
    State(state): State<AppState>,
    Json(payload): Json<ResolveImageRequest>,
) -> AppResult<Json<ResolvedImage>> {
    check_name(&payload.name)?;

    Ok(Json(
        state.images.auto_fetch(&payload.name, payload.category).await,
    ))
}

// ============ Bookings (Admin) ============

#[derive(Debug, Serialize)]
pub struct BookingInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub customer_address: Option<String>,
    pub vehicle_id: Uuid,
    pub vehicle_name: Option<String>,
    pub vehicle_category: Option<VehicleCategory>,
    pub duration_hours: i32,
    pub total_cost: f64,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub booking_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// List all bookings with customer and vehicle details, newest first (admin)
pub async fn list_bookings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingInfo>>> {
    let bookings = booking::Entity::find()
        .find_also_related(vehicle::Entity)
        .order_by_desc(booking::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let user_ids: HashSet<Uuid> = bookings.iter().map(|(b, _)| b.user_id).collect();
    let customers: HashMap<Uuid, profile::Model> = profile::Entity::find()
        .filter(profile::Column::Id.is_in(user_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let responses = bookings
        .into_iter()
        .map(|(b, v)| {
            let customer = customers.get(&b.user_id);
            BookingInfo {
                id: b.id,
                user_id: b.user_id,
                customer_name: customer.map(|c| c.name.clone()),
                customer_mobile: customer.map(|c| c.mobile.clone()),
                customer_address: customer.map(|c| c.address.clone()),
                vehicle_id: b.vehicle_id,
                vehicle_name: v.as_ref().map(|v| v.name.clone()),
                vehicle_category: v.as_ref().map(|v| v.category),
                duration_hours: b.duration_hours,
                total_cost: b.total_cost,
                status: b.status,
                cancellation_reason: b.cancellation_reason,
                booking_time: b.booking_time.with_timezone(&Utc),
                created_at: b.created_at.with_timezone(&Utc),
            }
        })
        .collect();

    Ok(Json(responses))
}

// ============ Notifications (Admin) ============

/// Administrator inbox, newest first (admin)
pub async fn list_notifications(
    State(state): State<AppState>,
) -> AppResult<Json<NotificationInbox>> {
    let notifications = notifications::list(&state.db, None).await?;
    let unread_count = notifications::unread_count(&state.db, None).await?;

    Ok(Json(NotificationInbox {
        unread_count,
        notifications,
    }))
}

/// Mark a notification read (admin). Repeating the call is harmless.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<notification::Model>> {
    Ok(Json(notifications::mark_read(&state.db, None, id).await?))
}

/// Live feed of new notifications as Server-Sent Events (admin)
pub async fn notification_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.notifications.subscribe()).filter_map(|message| {
        match message {
            Ok(notification) => match Event::default().event("notification").json_data(&notification) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode notification event");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification subscriber lagged, events dropped");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
