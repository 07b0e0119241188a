use crate::{
    AppState,
    handlers::{chat, destinations, users},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes open to any caller holding a valid token, whatever the role. Handlers
/// read the caller through the `AuthUser` extractor, which picks up the claims
/// left in the request extensions by `require_auth`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/me", get(users::me))
        // POST /user/category
        // Stores the caller's preferred categories, upper-cased.
        .route("/user/category", post(users::set_categories))
        // GET/PUT /user/{id}
        // PUT is restricted to the account owner or an administrator inside the handler.
        .route("/user/{id}", get(users::get_user).put(users::update_user))
        .route(
            "/destination/personalized",
            get(destinations::personalized_destinations),
        )
        .route("/video-content/{id}/view", post(destinations::record_view))
        .route("/chat", post(chat::send_message))
}
