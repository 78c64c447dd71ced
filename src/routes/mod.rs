use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, auth, catalog, inbox, profile, rentals, support};
use crate::middleware::auth::{auth_middleware, optional_auth_middleware, require_admin};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::user_rate_limit::create_user_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-keyed for anonymous sign-up / sign-in, user-keyed for bookings
    let public_governor = create_public_governor();
    let user_governor = create_user_governor();

    let public_auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor);

    let session_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Vehicle browsing (any signed-in user)
    let vehicle_routes = Router::new()
        .route("/", get(catalog::list_available))
        .route("/{id}", get(catalog::get_vehicle))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Customer bookings. The user governor keys on Claims, so auth must run first
    // (layers added later run earlier).
    let booking_routes = Router::new()
        .route("/", post(rentals::create_booking).get(rentals::my_bookings))
        .route("/{id}/cancel", post(rentals::cancel_booking))
        .layer(user_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Help center: anonymous visitors may file requests too
    let support_routes = Router::new()
        .route("/", post(support::submit_request))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth_middleware))
        .layer(create_public_governor());

    let inbox_routes = Router::new()
        .route("/", get(inbox::my_notifications))
        .route("/{id}/read", post(inbox::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let profile_routes = Router::new()
        .route("/", get(profile::get_profile).put(profile::update_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        // Fleet management
        .route("/vehicles", get(admin::list_vehicles).post(admin::create_vehicle))
        .route("/vehicles/image", post(admin::resolve_image))
        .route(
            "/vehicles/{id}",
            put(admin::update_vehicle).delete(admin::delete_vehicle),
        )
        // Bookings
        .route("/bookings", get(admin::list_bookings))
        // Notifications
        .route("/notifications", get(admin::list_notifications))
        .route("/notifications/stream", get(admin::notification_stream))
        .route("/notifications/{id}/read", post(admin::mark_notification_read))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", public_auth_routes.merge(session_routes))
        .nest("/api/vehicles", vehicle_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/support", support_routes)
        .nest("/api/notifications", inbox_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
