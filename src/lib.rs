use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core services.
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregated by access level (public, authenticated, planner, admin).
pub mod routes;
use routes::{admin, authenticated, planner, public};

use auth::{
    RoleGate, TokenService,
    gate::{require_auth, require_role},
};
use handlers::{chat as chat_handlers, cities, dashboard, destinations, route_plans, users};
use models::Role;

// --- Public Re-exports ---

pub use chat::{ChatState, GeminiClient, MockChatRelay};
pub use config::AppConfig;
pub use error::AppError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        users::register, users::login, users::logout, users::me, users::set_categories,
        users::list_users, users::get_user, users::update_user, users::delete_user,
        cities::list_cities, cities::create_city,
        destinations::list_destinations, destinations::filter_destinations,
        destinations::get_destination, destinations::personalized_destinations,
        destinations::create_destination, destinations::update_destination,
        destinations::delete_destination, destinations::add_image, destinations::delete_image,
        destinations::add_video, destinations::delete_video, destinations::record_view,
        destinations::most_viewed,
        route_plans::plan_route, route_plans::create_route, route_plans::list_routes,
        route_plans::delete_route,
        dashboard::count_data, dashboard::registration_graphic,
        chat_handlers::send_message
    ),
    components(
        schemas(
            models::Meta, models::Role, models::UserProfile, models::RegisterUserRequest,
            models::LoginRequest, models::AuthResponse, models::UserCategoryRequest,
            models::UpdateUserRequest, models::City, models::CreateCityRequest, models::CityRef,
            models::Destination, models::DestinationDetail, models::Image, models::VideoContent,
            models::VideoInput, models::CreateDestinationRequest, models::CreateImageRequest,
            models::MostViewedDestination, models::Route, models::RouteDetail,
            models::CreateRouteRequest, models::RoutePlan, models::DashboardCounts,
            models::MonthlyUserCount, models::ChatRequest, models::ChatReply,
        )
    ),
    tags(
        (name = "tripwise", description = "Travel destination catalogue and route planning API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into
/// every request. All members are cheap to clone (`Arc`-backed).
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Issues and verifies bearer tokens with the server secret.
    pub tokens: TokenService,
    /// LLM relay behind POST /chat.
    pub chat: ChatState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Handlers and extractors pull only the component they need from AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for ChatState {
    fn from_ref(app_state: &AppState) -> ChatState {
        app_state.chat.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, attaches the access gates per module and
/// wraps everything in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Access gates
    let planner_gate = RoleGate::new(state.tokens.clone(), [Role::Admin, Role::User]);
    let admin_gate = RoleGate::admin_only(state.tokens.clone());

    // 3. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no gate.
        .merge(public::public_routes())
        // Authenticated Routes: any valid token.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.tokens.clone(),
                require_auth,
            )),
        )
        // Planner Routes: roles {admin, user}.
        .merge(
            planner::planner_routes()
                .route_layer(middleware::from_fn_with_state(planner_gate, require_role)),
        )
        // Admin Routes: role {admin}.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(admin_gate, require_role)),
        )
        .with_state(state);

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. A UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. One span per request, carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span used by `TraceLayer`: method, URI and the
/// `x-request-id` set by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
