mod common;

use axum::http::StatusCode;
use serde_json::json;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use uuid::Uuid;

use car_rental_backend::AppError;
use car_rental_backend::entities::{
    profile::{self, UserRole},
    revoked_token, vehicle,
};
use common::{
    TEST_PASSWORD, app, seed_admin, seed_customer, seed_profile, seed_vehicle, send, test_state,
    token_for,
};

fn registration() -> serde_json::Value {
    json!({
        "name": "Ravi Kumar",
        "email": "Ravi@Example.com",
        "password": "secret123",
        "confirm_password": "secret123",
        "address": "4 Park Street, Kolkata",
        "mobile": "9123456780",
        "date_of_birth": "1990-01-31",
        "national_id": "987698769876"
    })
}

#[tokio::test]
async fn test_register_then_login() {
    let app = app(test_state().await);

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(registration())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ravi@example.com");
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ravi@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ravi Kumar");
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = app(test_state().await);

    send(&app, "POST", "/api/auth/register", None, Some(registration())).await;
    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(registration())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_register_reports_field_errors() {
    let app = app(test_state().await);
    let mut request = registration();
    request["mobile"] = json!("912345678");
    request["confirm_password"] = json!("different");

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]["mobile"].is_array());
    assert!(body["details"]["confirm_password"].is_array());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let state = test_state().await;
    let user = seed_profile(&state.db, "meera@example.com", UserRole::Customer).await;
    let app = app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let state = test_state().await;
    let customer = seed_customer(&state.db).await;
    let token = token_for(&customer);
    let app = app(state);

    let (status, body) = send(&app, "GET", "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], customer.id.to_string());

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session has been signed out");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app(test_state().await);

    let (status, body) = send(&app, "GET", "/api/vehicles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/vehicles", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_books_and_cancels_over_http() {
    let state = test_state().await;
    let customer = seed_customer(&state.db).await;
    let car = seed_vehicle(&state.db, "Mahindra XUV700", 200.0).await;
    let token = token_for(&customer);
    let app = app(state);

    let (status, body) = send(&app, "GET", "/api/vehicles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["theme"]["name"], "Deep Forest");

    let (status, body) = send(&app, "GET", &format!("/api/vehicles/{}", car.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hourly_rate"], 200.0);
    assert_eq!(body["fuel_type"], "diesel");

    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&token),
        Some(json!({ "vehicle_id": car.id, "duration_hours": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_cost"], 1000.0);
    assert_eq!(body["status"], "active");
    let booking_id = body["id"].as_str().unwrap().to_string();

    // Rented vehicles leave the catalog
    let (_, body) = send(&app, "GET", "/api/vehicles", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["vehicle"]["name"], "Mahindra XUV700");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/bookings/{}/cancel", booking_id),
        Some(&token),
        Some(json!({ "reason": "Trip postponed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancellation_reason"], "Trip postponed");

    let (_, body) = send(&app, "GET", "/api/bookings", Some(&token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/bookings/{}/cancel", booking_id),
        Some(&token),
        Some(json!({ "reason": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_double_booking_over_http_is_conflict() {
    let state = test_state().await;
    let first = seed_customer(&state.db).await;
    let second = seed_customer(&state.db).await;
    let car = seed_vehicle(&state.db, "Tata Harrier", 175.0).await;
    let app = app(state);

    let body = json!({ "vehicle_id": car.id, "duration_hours": 2 });
    let (status, _) = send(&app, "POST", "/api/bookings", Some(&token_for(&first)), Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/bookings", Some(&token_for(&second)), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_profile_update() {
    let state = test_state().await;
    let customer = seed_customer(&state.db).await;
    let token = token_for(&customer);
    let app = app(state);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/profile",
        Some(&token),
        Some(json!({ "address": "22 Residency Road, Bengaluru" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "22 Residency Road, Bengaluru");
    assert_eq!(body["mobile"], "9876543210");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/profile",
        Some(&token),
        Some(json!({ "mobile": "12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let state = test_state().await;
    let customer = seed_customer(&state.db).await;
    let app = app(state);

    let (status, body) = send(&app, "GET", "/api/admin/vehicles", Some(&token_for(&customer)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_admin_adds_vehicle_with_catalog_image() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let token = token_for(&admin);
    let app = app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/vehicles",
        Some(&token),
        Some(json!({
            "name": "Tata Nexon EV",
            "category": "eco",
            "fuel_type": "electric",
            "hourly_rate": 140.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_available"], true);
    assert_eq!(body["theme"]["accent"], "#22c55e");
    assert_eq!(
        body["image_url"],
        car_rental_backend::services::images::resolve("Tata Nexon EV", "eco")
    );

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/vehicles",
        Some(&token),
        Some(json!({
            "name": "Free Car",
            "category": "eco",
            "fuel_type": "electric",
            "hourly_rate": 0.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_image_lookup_falls_back_offline() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let app = app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/vehicles/image",
        Some(&token_for(&admin)),
        Some(json!({ "name": "Unknown Car XYZ", "category": "sports" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(
        body["image_url"],
        car_rental_backend::services::images::fallback_for("sports")
    );
}

#[tokio::test]
async fn test_admin_cannot_delete_rented_vehicle() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let customer = seed_customer(&state.db).await;
    let car = seed_vehicle(&state.db, "Jeep Compass", 210.0).await;
    let app = app(state);

    send(
        &app,
        "POST",
        "/api/bookings",
        Some(&token_for(&customer)),
        Some(json!({ "vehicle_id": car.id, "duration_hours": 1 })),
    )
    .await;

    let uri = format!("/api/admin/vehicles/{}", car.id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token_for(&admin)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/api/bookings", Some(&token_for(&customer)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_cannot_delete_claimed_vehicle() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let car = seed_vehicle(&state.db, "Tata Punch", 80.0).await;

    // Claimed by a booking that has not been recorded yet
    vehicle::Entity::update_many()
        .col_expr(vehicle::Column::IsAvailable, Expr::value(false))
        .filter(vehicle::Column::Id.eq(car.id))
        .exec(&state.db)
        .await
        .unwrap();
    let db = state.db.clone();
    let app = app(state);

    let uri = format!("/api/admin/vehicles/{}", car.id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token_for(&admin)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(vehicle::Entity::find_by_id(car.id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_deletes_vehicle_after_cancellation() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let customer = seed_customer(&state.db).await;
    let car = seed_vehicle(&state.db, "Honda Amaze", 90.0).await;
    let token = token_for(&customer);
    let app = app(state);

    let (_, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&token),
        Some(json!({ "vehicle_id": car.id, "duration_hours": 1 })),
    )
    .await;
    let cancel = format!("/api/bookings/{}/cancel", body["id"].as_str().unwrap());
    send(&app, "POST", &cancel, Some(&token), Some(json!({ "reason": "Sold" }))).await;

    let uri = format!("/api/admin/vehicles/{}", car.id);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token_for(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_prunes_expired_revocations() {
    let state = test_state().await;
    let customer = seed_customer(&state.db).await;
    let stale_jti = Uuid::new_v4();
    revoked_token::ActiveModel {
        jti: Set(stale_jti),
        expires_at: Set((Utc::now() - Duration::hours(2)).fixed_offset()),
    }
    .insert(&state.db)
    .await
    .unwrap();
    let db = state.db.clone();
    let app = app(state);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token_for(&customer)), None).await;
    assert_eq!(status, StatusCode::OK);

    let remaining = revoked_token::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0].jti, stale_jti);
}

#[tokio::test]
async fn test_duplicate_email_insert_maps_to_conflict() {
    let state = test_state().await;
    let existing = seed_customer(&state.db).await;

    let err = profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(existing.email.clone()),
        password_hash: Set(existing.password_hash.clone()),
        role: Set(UserRole::Customer),
        name: Set("Second Signup".to_string()),
        address: Set(existing.address.clone()),
        mobile: Set(existing.mobile.clone()),
        date_of_birth: Set(existing.date_of_birth),
        national_id: Set(existing.national_id.clone()),
        created_at: Set(existing.created_at),
        updated_at: Set(existing.updated_at),
    }
    .insert(&state.db)
    .await
    .unwrap_err();

    assert!(matches!(
        AppError::duplicate_as_conflict(err, "Email already registered"),
        AppError::Conflict(_)
    ));
}

#[tokio::test]
async fn test_admin_updates_and_deletes_vehicle() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let car = seed_vehicle(&state.db, "Maruti Ertiga", 100.0).await;
    let token = token_for(&admin);
    let app = app(state);

    let uri = format!("/api/admin/vehicles/{}", car.id);
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "hourly_rate": 125.5, "category": "sedan" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hourly_rate"], 125.5);
    assert_eq!(body["category"], "sedan");
    assert_eq!(body["name"], "Maruti Ertiga");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_sees_bookings_and_notifications() {
    let state = test_state().await;
    let admin = seed_admin(&state.db).await;
    let customer = seed_customer(&state.db).await;
    let car = seed_vehicle(&state.db, "Toyota Fortuner", 300.0).await;
    let token = token_for(&admin);
    let app = app(state);

    send(
        &app,
        "POST",
        "/api/bookings",
        Some(&token_for(&customer)),
        Some(json!({ "vehicle_id": car.id, "duration_hours": 2 })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/admin/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["customer_name"], "Asha Rao");
    assert_eq!(body[0]["customer_mobile"], "9876543210");
    assert_eq!(body[0]["vehicle_name"], "Toyota Fortuner");
    assert_eq!(body[0]["total_cost"], 600.0);

    let (status, body) = send(&app, "GET", "/api/admin/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread_count"], 1);
    assert_eq!(body["notifications"][0]["title"], "New Car Booking");
    let id = body["notifications"][0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/notifications/{}/read", id);
    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_read"], true);
    }

    let (_, body) = send(&app, "GET", "/api/admin/notifications", Some(&token), None).await;
    assert_eq!(body["unread_count"], 0);
}
