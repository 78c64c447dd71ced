pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::images::ImageResolver;
use services::notifications::NotificationHub;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub notifications: NotificationHub,
    pub images: ImageResolver,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let images = ImageResolver::new(&config);
        Self {
            db,
            config,
            notifications: NotificationHub::new(),
            images,
        }
    }
}
