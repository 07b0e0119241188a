#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tripwise_backend::{
    AppConfig, AppState, ChatState, MemoryRepository, MockChatRelay, RepositoryState,
    auth::TokenService,
    create_router,
    models::{
        City, CreateCityRequest, DestinationDetail, DestinationFields, NewDestination, NewUser,
        Role, User, VideoInput,
    },
    repository::Repository,
};

// Seeded users never log in through the API, so they skip the Argon2 work factor.
const PLACEHOLDER_HASH: &str = "$argon2id$seeded-user-without-password";

/// TestApp
///
/// The full router over an in-memory repository. `repo` and `tokens` are the
/// same instances the router uses, for seeding and for minting tokens.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub tokens: TokenService,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_chat(Arc::new(MockChatRelay::new()))
}

pub fn spawn_app_with_chat(chat: ChatState) -> TestApp {
    let config = AppConfig::default();
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl)
        .expect("default config carries a secret");
    let repo = Arc::new(MemoryRepository::new());

    let state = AppState {
        repo: repo.clone() as RepositoryState,
        tokens: tokens.clone(),
        chat,
        config,
    };

    TestApp {
        router: create_router(state),
        repo,
        tokens,
    }
}

impl TestApp {
    /// Sends one request through the router and returns the status and JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Creates a user directly in the repository and returns it with a valid token.
    pub async fn seed_user(&self, username: &str, role: Role) -> (User, String) {
        let user = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                first_name: format!("{username}-first"),
                last_name: format!("{username}-last"),
                email: format!("{username}@example.com"),
                city: "Jakarta".to_string(),
                password_hash: PLACEHOLDER_HASH.to_string(),
                role,
            })
            .await
            .expect("seed user");
        let token = self
            .tokens
            .issue(user.id, &user.username, user.role)
            .expect("sign token");
        (user, token)
    }

    pub async fn seed_city(&self, name: &str, coords: Option<(f64, f64)>) -> City {
        self.repo
            .create_city(CreateCityRequest {
                name: name.to_string(),
                lat: coords.map(|(lat, _)| lat),
                lon: coords.map(|(_, lon)| lon),
            })
            .await
            .expect("seed city")
    }

    pub async fn seed_destination(
        &self,
        city: &City,
        name: &str,
        category: &str,
    ) -> DestinationDetail {
        self.repo
            .create_destination(NewDestination {
                fields: DestinationFields {
                    name: name.to_string(),
                    city_id: city.id,
                    position: 0.0,
                    address: format!("{name} street 1"),
                    operational_hours: "08:00-17:00".to_string(),
                    ticket_price: 10_000.0,
                    category: category.to_string(),
                    description: format!("About {name}"),
                    facilities: vec!["Parking".to_string()],
                },
                images: vec![format!("https://img.example.com/{name}.jpg")],
                videos: vec![VideoInput {
                    title: format!("{name} tour"),
                    description: "Walkthrough".to_string(),
                    url: format!("https://video.example.com/{name}.mp4"),
                }],
            })
            .await
            .expect("seed destination")
    }
}

pub const JAKARTA: (f64, f64) = (-6.2088, 106.8456);
pub const YOGYAKARTA: (f64, f64) = (-7.7956, 110.3695);
