use crate::{
    AppState,
    handlers::{cities, dashboard, destinations, users},
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// Catalogue writes, user administration and dashboard statistics. The whole
/// router sits behind `RoleGate::admin_only`: no token answers 401, any other
/// role 403, and the handlers never run in either case.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Users ---
        // GET /user?name=
        .route("/user", get(users::list_users))
        .route("/user/{id}", delete(users::delete_user))
        // --- Catalogue ---
        .route("/city", post(cities::create_city))
        // POST /destination
        // Destination, images and videos are written in one transaction.
        .route("/destination", post(destinations::create_destination))
        .route(
            "/destination/{id}",
            put(destinations::update_destination).delete(destinations::delete_destination),
        )
        .route("/destination/{id}/images", post(destinations::add_image))
        .route("/images/{id}", delete(destinations::delete_image))
        .route("/destination/{id}/videos", post(destinations::add_video))
        .route("/video-content/{id}", delete(destinations::delete_video))
        // --- Dashboard ---
        .route("/dashboard/count-data", get(dashboard::count_data))
        .route("/dashboard/graphic", get(dashboard::registration_graphic))
}
