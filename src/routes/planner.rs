use crate::{AppState, handlers::route_plans};
use axum::{
    Router,
    routing::{delete, get},
};

/// Planner Router Module
///
/// Saved trips. Wrapped in a `RoleGate` admitting both `admin` and `user`;
/// ownership is checked per route inside the handlers.
pub fn planner_routes() -> Router<AppState> {
    Router::new()
        // GET /route?user_id=   POST /route
        .route(
            "/route",
            get(route_plans::list_routes).post(route_plans::create_route),
        )
        .route("/route/{id}", delete(route_plans::delete_route))
}
