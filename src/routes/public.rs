use crate::{
    AppState,
    handlers::{cities, destinations, route_plans, users},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: account entry points and read-only
/// access to the catalogue.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Accounts ---
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        // Stateless: the token simply stays valid until it expires.
        .route("/logout", get(users::logout))
        // --- Catalogue ---
        .route("/city", get(cities::list_cities))
        // GET /destination?name=&city=&category=&sort=
        .route("/destination", get(destinations::list_destinations))
        // GET /destinations?city=<name>&category=<a>&category=<b>
        .route("/destinations", get(destinations::filter_destinations))
        .route("/destination/{id}", get(destinations::get_destination))
        .route("/video-content/most", get(destinations::most_viewed))
        // GET /route/plan?origin=&destination=
        // Haversine distance between two cities plus the destinations in both.
        .route("/route/plan", get(route_plans::plan_route))
}
