use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        City, CreateCityRequest, Destination, DestinationDetail, DestinationFields, Image,
        MostViewedDestination, NewDestination, NewRoute, NewUser, Route, RouteDetail, User,
        VideoContent, VideoInput,
    },
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// SortOrder
///
/// Ordering of destination listings by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// DestinationFilter
///
/// Every listing query goes through this one filter. Empty fields do not
/// restrict; `categories` match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct DestinationFilter {
    /// Substring match on the destination name.
    pub name: Option<String>,
    pub city_id: Option<Uuid>,
    /// Exact city name, resolved through the `cities` table.
    pub city_name: Option<String>,
    pub categories: Vec<String>,
    pub sort: SortOrder,
}

/// CatalogCounts
///
/// Raw totals behind the dashboard. `per_category` holds only categories that occur.
#[derive(Debug, Clone, Default)]
pub struct CatalogCounts {
    pub users: i64,
    pub destinations: i64,
    pub video_contents: i64,
    pub per_category: Vec<(String, i64)>,
}

/// Repository Trait
///
/// The persistence contract used by every handler. Handlers only ever see
/// `Arc<dyn Repository>`, injected through the application state, so the
/// Postgres implementation can be swapped for the in-memory one in tests.
///
/// Conventions: lookups return `Option`, deletes return whether a row was
/// removed, and unique violations surface as `AppError::Conflict`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    // Substring match on first or last name.
    async fn list_users(&self, name: Option<String>) -> Result<Vec<User>, AppError>;
    // Saves every mutable column of `user` and bumps `updated_at`.
    async fn update_user(&self, user: User) -> Result<User, AppError>;
    async fn set_user_categories(
        &self,
        id: Uuid,
        categories: Vec<String>,
    ) -> Result<Option<User>, AppError>;
    // Also removes the user's routes.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Cities ---
    async fn list_cities(&self) -> Result<Vec<City>, AppError>;
    async fn find_city_by_name(&self, name: &str) -> Result<Option<City>, AppError>;
    async fn create_city(&self, city: CreateCityRequest) -> Result<City, AppError>;

    // --- Destinations ---
    async fn list_destinations(
        &self,
        filter: DestinationFilter,
    ) -> Result<Vec<DestinationDetail>, AppError>;
    async fn get_destination(&self, id: Uuid) -> Result<Option<DestinationDetail>, AppError>;
    // Destination, images and videos in one transaction.
    async fn create_destination(
        &self,
        destination: NewDestination,
    ) -> Result<DestinationDetail, AppError>;
    async fn update_destination(
        &self,
        id: Uuid,
        fields: DestinationFields,
    ) -> Result<Option<DestinationDetail>, AppError>;
    // Removes views, videos, images, route stops and the destination atomically.
    async fn delete_destination(&self, id: Uuid) -> Result<bool, AppError>;
    async fn destinations_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Destination>, AppError>;
    async fn destinations_in_cities(&self, city_ids: &[Uuid]) -> Result<Vec<Destination>, AppError>;

    // --- Media ---
    async fn add_image(&self, destination_id: Uuid, url: String) -> Result<Image, AppError>;
    async fn delete_image(&self, id: Uuid) -> Result<bool, AppError>;
    async fn add_video(
        &self,
        destination_id: Uuid,
        video: VideoInput,
    ) -> Result<VideoContent, AppError>;
    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError>;
    // Returns false when the video does not exist.
    async fn record_video_view(&self, video_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
    async fn most_viewed_destinations(&self) -> Result<Vec<MostViewedDestination>, AppError>;

    // --- Routes ---
    // Route and ordered stops in one transaction.
    async fn create_route(&self, route: NewRoute) -> Result<RouteDetail, AppError>;
    async fn list_routes_for_user(&self, user_id: Uuid) -> Result<Vec<RouteDetail>, AppError>;
    async fn get_route(&self, id: Uuid) -> Result<Option<Route>, AppError>;
    async fn delete_route(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Dashboard ---
    async fn catalog_counts(&self) -> Result<CatalogCounts, AppError>;
    // (month 1..=12, registrations), months without registrations may be absent.
    async fn registrations_by_month(&self) -> Result<Vec<(u32, i64)>, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
