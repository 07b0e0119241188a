use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripwise_backend::{
    AppState, ChatState, GeminiClient, PostgresRepository, RepositoryState,
    auth::TokenService,
    config::{AppConfig, Env},
    create_router,
};

/// main
///
/// Entry point: configuration, logging, database, token service, chat relay
/// and the HTTP server, in that order. Any failure before the server is
/// listening aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    });

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and info for tower-http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tripwise_backend=debug,tower_http=info".into());

    // 3. Log format by environment: pretty locally, JSON lines in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Token service. Rejects an empty secret before anything listens.
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)
        .expect("FATAL: JWT_SECRET_KEY is unusable");

    // 5. Database Initialization (Postgres) and schema migrations.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to run database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 6. Chat relay. Without GEMINI_API_KEY, POST /chat answers 502.
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; the chat relay is disabled");
    }
    let chat = Arc::new(
        GeminiClient::new(&config.gemini_base_url, config.gemini_api_key.clone())
            .expect("FATAL: Failed to build the HTTP client for the chat relay."),
    ) as ChatState;

    // 7. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        tokens,
        chat,
        config,
    };

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
