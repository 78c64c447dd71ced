//! Booking and cancellation workflows.
//!
//! Each workflow writes the booking row, the vehicle availability flag and the
//! administrator notification inside one transaction, so the three never
//! diverge. The availability flip is a conditional update: when two customers
//! race for the same vehicle, only one update matches and the other booking is
//! rolled back with a conflict.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::notification::{self, NotificationKind};
use crate::entities::{profile, vehicle};
use crate::error::{AppError, AppResult};
use crate::services::notifications::NotificationHub;
use crate::utils::time::format_ist;
use crate::utils::validation::field_error;

#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    pub booking: booking::Model,
    pub vehicle: vehicle::Model,
    pub notification: notification::Model,
}

/// Cost of renting at `hourly_rate` for `duration_hours`, fixed at booking time.
pub fn total_cost(hourly_rate: f64, duration_hours: i32) -> f64 {
    hourly_rate * f64::from(duration_hours)
}

/// Books `vehicle_id` for `user_id`.
///
/// Fails with a validation error for durations under one hour, `NotFound` for
/// an unknown vehicle and `Conflict` when the vehicle is already rented.
pub async fn create_booking(
    db: &DatabaseConnection,
    hub: &NotificationHub,
    user_id: Uuid,
    vehicle_id: Uuid,
    duration_hours: i32,
) -> AppResult<BookingOutcome> {
    if duration_hours < 1 {
        return Err(AppError::field(
            "duration_hours",
            field_error("duration_hours", "Duration must be at least 1 hour"),
        ));
    }

    let txn = db.begin().await?;

    let vehicle = vehicle::Entity::find_by_id(vehicle_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    if !vehicle.is_available {
        return Err(AppError::Conflict("Vehicle is not available".to_string()));
    }

    let outcome = reserve(&txn, user_id, vehicle, duration_hours).await?;
    txn.commit().await?;

    tracing::info!(
        booking_id = %outcome.booking.id,
        vehicle_id = %outcome.vehicle.id,
        user_id = %user_id,
        duration_hours,
        total_cost = outcome.booking.total_cost,
        "Booking created"
    );
    hub.publish(outcome.notification.clone());

    Ok(outcome)
}

/// Writes the booking, claims the vehicle and notifies administrators.
///
/// `vehicle` may be stale: the claim re-checks availability in the store and
/// fails with `Conflict` when another booking got there first.
async fn reserve(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    mut vehicle: vehicle::Model,
    duration_hours: i32,
) -> AppResult<BookingOutcome> {
    let now = Utc::now().fixed_offset();
    let cost = total_cost(vehicle.hourly_rate, duration_hours);

    let booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        vehicle_id: Set(vehicle.id),
        duration_hours: Set(duration_hours),
        total_cost: Set(cost),
        status: Set(BookingStatus::Active),
        cancellation_reason: Set(None),
        booking_time: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    claim_vehicle(txn, vehicle.id, now).await?;
    vehicle.is_available = false;
    vehicle.updated_at = now;

    let customer = load_customer(txn, user_id).await?;
    let notification = insert_admin_notification(
        txn,
        NotificationKind::Booking,
        "New Car Booking",
        booking_message(customer.as_ref(), &vehicle, &booking),
        booking.id,
        now,
    )
    .await?;

    Ok(BookingOutcome {
        booking,
        vehicle,
        notification,
    })
}

/// Cancels one of `user_id`'s active bookings and releases the vehicle.
///
/// The reason is stored verbatim; a blank reason is rejected before any
/// database access.
pub async fn cancel_booking(
    db: &DatabaseConnection,
    hub: &NotificationHub,
    user_id: Uuid,
    booking_id: Uuid,
    reason: &str,
) -> AppResult<BookingOutcome> {
    if reason.trim().is_empty() {
        return Err(AppError::field(
            "reason",
            field_error("reason", "Please provide a cancellation reason"),
        ));
    }

    let txn = db.begin().await?;

    let existing = booking::Entity::find_by_id(booking_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if existing.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }

    if existing.status != BookingStatus::Active {
        return Err(AppError::Conflict(
            "Only active bookings can be cancelled".to_string(),
        ));
    }

    let now = Utc::now().fixed_offset();

    let cancelled = booking::Entity::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::Cancelled.to_value()),
        )
        .col_expr(booking::Column::CancellationReason, Expr::value(reason))
        .col_expr(booking::Column::UpdatedAt, Expr::value(now))
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(BookingStatus::Active))
        .exec(&txn)
        .await?;

    if cancelled.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Only active bookings can be cancelled".to_string(),
        ));
    }

    let booking = booking::Model {
        status: BookingStatus::Cancelled,
        cancellation_reason: Some(reason.to_string()),
        updated_at: now,
        ..existing
    };

    vehicle::Entity::update_many()
        .col_expr(vehicle::Column::IsAvailable, Expr::value(true))
        .col_expr(vehicle::Column::UpdatedAt, Expr::value(now))
        .filter(vehicle::Column::Id.eq(booking.vehicle_id))
        .exec(&txn)
        .await?;

    let vehicle = vehicle::Entity::find_by_id(booking.vehicle_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Booked vehicle no longer exists".to_string()))?;

    let customer = load_customer(&txn, user_id).await?;
    let notification = insert_admin_notification(
        &txn,
        NotificationKind::Cancellation,
        "Booking Cancelled",
        cancellation_message(customer.as_ref(), &vehicle, reason),
        booking.id,
        now,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        vehicle_id = %vehicle.id,
        user_id = %user_id,
        "Booking cancelled"
    );
    hub.publish(notification.clone());

    Ok(BookingOutcome {
        booking,
        vehicle,
        notification,
    })
}

/// Marks the vehicle rented, only if it is still available.
async fn claim_vehicle(
    txn: &DatabaseTransaction,
    vehicle_id: Uuid,
    now: DateTime<FixedOffset>,
) -> AppResult<()> {
    let result = vehicle::Entity::update_many()
        .col_expr(vehicle::Column::IsAvailable, Expr::value(false))
        .col_expr(vehicle::Column::UpdatedAt, Expr::value(now))
        .filter(vehicle::Column::Id.eq(vehicle_id))
        .filter(vehicle::Column::IsAvailable.eq(true))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Vehicle is not available".to_string()));
    }

    Ok(())
}

async fn load_customer(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> AppResult<Option<profile::Model>> {
    let customer = profile::Entity::find_by_id(user_id).one(txn).await?;
    if customer.is_none() {
        tracing::warn!(user_id = %user_id, "No profile for booking customer");
    }
    Ok(customer)
}

async fn insert_admin_notification(
    txn: &DatabaseTransaction,
    kind: NotificationKind,
    title: &str,
    message: String,
    booking_id: Uuid,
    now: DateTime<FixedOffset>,
) -> AppResult<notification::Model> {
    let notification = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(kind),
        title: Set(title.to_string()),
        message: Set(message),
        user_id: Set(None),
        booking_id: Set(Some(booking_id)),
        is_read: Set(false),
        created_at: Set(now),
    };

    Ok(notification.insert(txn).await?)
}

fn booking_message(
    customer: Option<&profile::Model>,
    vehicle: &vehicle::Model,
    booking: &booking::Model,
) -> String {
    format!(
        "Booking Details:\n\n\
         Customer: {}\n\
         Mobile: {}\n\
         Address: {}\n\n\
         Car: {}\n\
         Category: {}\n\
         Duration: {} hours\n\
         Total Cost: \u{20b9}{}\n\n\
         Booked: {}",
        customer.map(|c| c.name.as_str()).unwrap_or("User"),
        customer.map(|c| c.mobile.as_str()).unwrap_or("N/A"),
        customer.map(|c| c.address.as_str()).unwrap_or("N/A"),
        vehicle.name,
        vehicle.category.as_str(),
        booking.duration_hours,
        booking.total_cost,
        format_ist(booking.booking_time),
    )
}

fn cancellation_message(
    customer: Option<&profile::Model>,
    vehicle: &vehicle::Model,
    reason: &str,
) -> String {
    format!(
        "Booking cancelled by {} ({}) for {}. Reason: {}",
        customer.map(|c| c.name.as_str()).unwrap_or("User"),
        customer.map(|c| c.mobile.as_str()).unwrap_or("N/A"),
        vehicle.name,
        reason,
    )
}
