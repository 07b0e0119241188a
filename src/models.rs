use std::{collections::BTreeMap, fmt, str::FromStr};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Response Envelope ---

/// Meta
///
/// Status block carried by every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Meta {
    pub message: String,
    pub code: u16,
    /// "success" or "error".
    pub status: String,
}

/// ApiResponse
///
/// The uniform `{ meta, data }` envelope. Successful handlers wrap their payload
/// with `ApiResponse::success`, while `AppError` renders through `ApiResponse::error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub meta: Meta,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            meta: Meta {
                message: message.into(),
                code: StatusCode::OK.as_u16(),
                status: "success".to_string(),
            },
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>, code: StatusCode) -> Self {
        Self {
            meta: Meta {
                message: message.into(),
                code: code.as_u16(),
                status: "error".to_string(),
            },
            data: None,
        }
    }

    pub fn error_with(message: impl Into<String>, code: StatusCode, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::error(message, code)
        }
    }
}

// --- Identity ---

/// Role
///
/// The two RBAC roles. Serialized lower-case both in JSON and in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// User
///
/// Canonical row of the `users` table. The password hash never leaves the
/// server: it is skipped on serialization and responses use `UserProfile`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Free-text home city, not a reference to `cities`.
    pub city: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Preferred destination categories, stored upper-case.
    pub categories: Vec<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload produced by the registration handler after hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub password_hash: String,
    pub role: Role,
}

/// UserProfile
///
/// Public projection of a `User`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub role: Role,
    pub categories: Vec<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            city: user.city,
            role: user.role,
            categories: user.categories,
            phone_number: user.phone_number,
            gender: user.gender,
            created_at: user.created_at,
        }
    }
}

/// RegisterUserRequest
///
/// Input payload for POST /register. `role` defaults to `user` when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// AuthResponse
///
/// Returned by register, login and profile edit: the profile plus a freshly
/// issued token. An administrator editing someone else's profile gets no token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct UserCategoryRequest {
    pub category: Vec<String>,
}

/// UpdateUserRequest
///
/// Full profile edit for PUT /user/{id}. `password` and `role` are optional;
/// only administrators may change a role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct UpdateUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub phone_number: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

// --- Cities ---

/// City
///
/// A city with optional coordinates in decimal degrees. Route planning needs both.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateCityRequest {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// CityRef
///
/// The embedded `{id, name}` city shown inside destination responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct CityRef {
    pub id: Uuid,
    pub name: String,
}

// --- Destinations & Media ---

/// Destination
///
/// Flat row of the `destinations` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Destination {
    pub id: Uuid,
    pub name: String,
    pub city_id: Uuid,
    pub position: f64,
    pub address: String,
    pub operational_hours: String,
    pub ticket_price: f64,
    pub category: String,
    pub description: String,
    pub facilities: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct Image {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct VideoContent {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub title: String,
    pub url: String,
    pub description: String,
}

/// DestinationDetail
///
/// A destination with its city, images and video contents resolved.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DestinationDetail {
    pub id: Uuid,
    pub name: String,
    pub city: CityRef,
    pub position: f64,
    pub address: String,
    pub operational_hours: String,
    pub ticket_price: f64,
    pub category: String,
    pub description: String,
    pub facilities: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub images: Vec<Image>,
    pub video_contents: Vec<VideoContent>,
}

impl DestinationDetail {
    pub fn assemble(
        destination: Destination,
        city_name: String,
        images: Vec<Image>,
        video_contents: Vec<VideoContent>,
    ) -> Self {
        Self {
            id: destination.id,
            name: destination.name,
            city: CityRef {
                id: destination.city_id,
                name: city_name,
            },
            position: destination.position,
            address: destination.address,
            operational_hours: destination.operational_hours,
            ticket_price: destination.ticket_price,
            category: destination.category,
            description: destination.description,
            facilities: destination.facilities,
            created_at: destination.created_at,
            images,
            video_contents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct VideoInput {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// CreateDestinationRequest
///
/// Payload for POST and PUT /destination. The city is referenced by name and
/// resolved to its id by the handler. On update, `image` and `video_contents`
/// are ignored; media is managed through the dedicated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateDestinationRequest {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub position: f64,
    pub address: String,
    pub operational_hours: String,
    pub ticket_price: f64,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub video_contents: Vec<VideoInput>,
}

/// DestinationFields
///
/// The scalar columns of a destination after the city has been resolved.
#[derive(Debug, Clone)]
pub struct DestinationFields {
    pub name: String,
    pub city_id: Uuid,
    pub position: f64,
    pub address: String,
    pub operational_hours: String,
    pub ticket_price: f64,
    pub category: String,
    pub description: String,
    pub facilities: Vec<String>,
}

/// NewDestination
///
/// Insert payload: the destination plus its initial media, written in one transaction.
#[derive(Debug, Clone)]
pub struct NewDestination {
    pub fields: DestinationFields,
    pub images: Vec<String>,
    pub videos: Vec<VideoInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateImageRequest {
    pub url: String,
}

/// MostViewedDestination
///
/// Destination ranked by the total number of views over all of its videos.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MostViewedDestination {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub description: String,
    pub view_count: i64,
    pub videos: Vec<VideoContent>,
}

// --- Routes ---

/// Route
///
/// A saved trip between two cities. `distance` is in kilometres and is always
/// computed server-side from the cities' coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Route {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub origin_city_name: String,
    pub destination_city_name: String,
    pub distance: f64,
    pub time: Option<String>,
    pub cost: Option<i64>,
    #[serde(rename = "created_at")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub route: Route,
    pub destinations: Vec<Destination>,
}

/// CreateRouteRequest
///
/// Payload for POST /route. The owner is taken from the caller's token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
#[ts(export)]
pub struct CreateRouteRequest {
    pub origin_city_name: String,
    pub destination_city_name: String,
    #[serde(default)]
    pub destinations: Vec<Uuid>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub cost: Option<i64>,
}

/// NewRoute
///
/// Insert payload for a route and its ordered stops.
#[derive(Debug, Clone)]
pub struct NewRoute {
    pub user_id: Uuid,
    pub origin_city_name: String,
    pub destination_city_name: String,
    pub distance: f64,
    pub time: Option<String>,
    pub cost: Option<i64>,
    pub destination_ids: Vec<Uuid>,
}

/// RoutePlan
///
/// Result of GET /route/plan: great-circle distance between the two cities and
/// every destination located in either of them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoutePlan {
    pub origin: CityRef,
    pub destination: CityRef,
    pub distance: f64,
    pub destinations: Vec<Destination>,
}

// --- Dashboard ---

/// DashboardCounts
///
/// Output of GET /dashboard/count-data.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardCounts {
    pub user: i64,
    pub destination: i64,
    pub video_content: i64,
    pub destination_categories: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MonthlyUserCount {
    pub month: String,
    pub count: i64,
}

// --- Chat ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatReply {
    pub reply: String,
}
