use std::net::SocketAddr;

use axum::middleware;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use car_rental_backend::{
    config::Config,
    db,
    entities::profile::{self, UserRole},
    handlers::auth::hash_password,
    middleware::rate_limit::{create_global_governor, log_request},
    routes, AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_rental_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        seed_admin(&db, email, password).await;
    }

    let state = AppState::new(db, config.clone());

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(create_global_governor());

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Create the administrator account on first start
async fn seed_admin(db: &DatabaseConnection, email: &str, password: &str) {
    let email = email.trim().to_lowercase();

    let existing = profile::Entity::find()
        .filter(profile::Column::Email.eq(&email))
        .one(db)
        .await
        .expect("Failed to check for admin");

    if existing.is_some() {
        return;
    }

    let password_hash = hash_password(password).expect("Failed to hash admin password");
    let now = Utc::now().fixed_offset();

    let admin = profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        role: Set(UserRole::Admin),
        name: Set("Admin".to_string()),
        address: Set(String::new()),
        mobile: Set(String::new()),
        date_of_birth: Set(NaiveDate::default()),
        national_id: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    admin.insert(db).await.expect("Failed to create admin");
    tracing::info!("Admin account created: {}", email);
}
