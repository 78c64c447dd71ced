#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use car_rental_backend::{
    AppState, Config,
    entities::{
        profile::{self, UserRole},
        vehicle::{self, FuelType, VehicleCategory},
    },
    handlers::auth::hash_password,
    routes,
    utils::jwt::create_token,
};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "secret123";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_email: None,
        admin_password: None,
        pexels_api_key: None,
        unsplash_access_key: None,
        image_fetch_timeout_secs: 1,
    }
}

/// Fresh in-memory database with the full schema applied.
pub async fn setup_db() -> DatabaseConnection {
    // One connection: every pooled connection would get its own empty database
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn test_state() -> AppState {
    AppState::new(setup_db().await, test_config())
}

pub async fn seed_profile(db: &DatabaseConnection, email: &str, role: UserRole) -> profile::Model {
    let now = Utc::now().fixed_offset();
    profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(TEST_PASSWORD).unwrap()),
        role: Set(role),
        name: Set("Asha Rao".to_string()),
        address: Set("12 MG Road, Pune".to_string()),
        mobile: Set("9876543210".to_string()),
        date_of_birth: Set(NaiveDate::from_ymd_opt(1994, 5, 17).unwrap()),
        national_id: Set("123412341234".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_customer(db: &DatabaseConnection) -> profile::Model {
    seed_profile(db, &format!("{}@example.com", Uuid::new_v4()), UserRole::Customer).await
}

pub async fn seed_admin(db: &DatabaseConnection) -> profile::Model {
    seed_profile(db, &format!("admin-{}@example.com", Uuid::new_v4()), UserRole::Admin).await
}

pub async fn seed_vehicle(db: &DatabaseConnection, name: &str, hourly_rate: f64) -> vehicle::Model {
    let now = Utc::now().fixed_offset();
    vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        category: Set(VehicleCategory::Suv),
        fuel_type: Set(FuelType::Diesel),
        hourly_rate: Set(hourly_rate),
        image_url: Set("https://images.example.com/car.jpg".to_string()),
        is_available: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub fn token_for(user: &profile::Model) -> String {
    create_token(user.id, &user.email, user.role, TEST_SECRET, 1).unwrap()
}

/// Sends one request through the full router, as if from 127.0.0.1.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let mut request = builder.body(body).unwrap();
    // Governors key on the peer address
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

pub fn app(state: AppState) -> Router {
    routes::create_router(state)
}
