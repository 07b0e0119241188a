use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogCounts, DestinationFilter, Repository, SortOrder};
use crate::{
    error::AppError,
    models::{
        City, CreateCityRequest, Destination, DestinationDetail, DestinationFields, Image,
        MostViewedDestination, NewDestination, NewRoute, NewUser, Route, RouteDetail, User,
        VideoContent, VideoInput,
    },
};

#[derive(Default)]
struct Store {
    users: Vec<User>,
    cities: Vec<City>,
    destinations: Vec<Destination>,
    images: Vec<Image>,
    videos: Vec<VideoContent>,
    // (video id, user id)
    views: Vec<(Uuid, Uuid)>,
    routes: Vec<Route>,
    // (route id, destination id), kept in stop order
    stops: Vec<(Uuid, Uuid)>,
}

impl Store {
    fn detail(&self, destination: &Destination) -> DestinationDetail {
        let city_name = self
            .cities
            .iter()
            .find(|c| c.id == destination.city_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        DestinationDetail::assemble(
            destination.clone(),
            city_name,
            self.images
                .iter()
                .filter(|i| i.destination_id == destination.id)
                .cloned()
                .collect(),
            self.videos
                .iter()
                .filter(|v| v.destination_id == destination.id)
                .cloned()
                .collect(),
        )
    }

    fn route_detail(&self, route: &Route) -> RouteDetail {
        let destinations = self
            .stops
            .iter()
            .filter(|(route_id, _)| *route_id == route.id)
            .filter_map(|(_, dest_id)| self.destinations.iter().find(|d| d.id == *dest_id))
            .cloned()
            .collect();

        RouteDetail {
            route: route.clone(),
            destinations,
        }
    }

    fn username_or_email_taken(&self, username: &str, email: &str, except: Option<Uuid>) -> bool {
        self.users.iter().any(|u| {
            Some(u.id) != except && (u.username == username || u.email == email)
        })
    }
}

/// MemoryRepository
///
/// In-process implementation of `Repository` for tests. Mirrors the Postgres
/// semantics closely enough (unique users and city names, filter rules,
/// cascading deletes) that handler tests do not need a database.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut store = self.store.write().await;
        if store.username_or_email_taken(&user.username, &user.email, None) {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            city: user.city,
            password_hash: user.password_hash,
            role: user.role,
            categories: Vec::new(),
            phone_number: None,
            gender: None,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, name: Option<String>) -> Result<Vec<User>, AppError> {
        let store = self.store.read().await;
        let needle = name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty());

        let mut users: Vec<User> = store
            .users
            .iter()
            .filter(|u| match &needle {
                Some(n) => {
                    u.first_name.to_lowercase().contains(n) || u.last_name.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_user(&self, user: User) -> Result<User, AppError> {
        let mut store = self.store.write().await;
        if store.username_or_email_taken(&user.username, &user.email, Some(user.id)) {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let slot = store
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AppError::NotFound("User"))?;
        *slot = User {
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..user
        };
        Ok(slot.clone())
    }

    async fn set_user_categories(
        &self,
        id: Uuid,
        categories: Vec<String>,
    ) -> Result<Option<User>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.categories = categories;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        if store.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<Uuid> = store
            .routes
            .iter()
            .filter(|r| r.user_id == id)
            .map(|r| r.id)
            .collect();
        store.stops.retain(|(route_id, _)| !owned.contains(route_id));
        store.routes.retain(|r| r.user_id != id);
        store.views.retain(|(_, user_id)| *user_id != id);
        Ok(true)
    }

    async fn list_cities(&self) -> Result<Vec<City>, AppError> {
        let store = self.store.read().await;
        let mut cities = store.cities.clone();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    async fn find_city_by_name(&self, name: &str) -> Result<Option<City>, AppError> {
        let store = self.store.read().await;
        Ok(store.cities.iter().find(|c| c.name == name).cloned())
    }

    async fn create_city(&self, city: CreateCityRequest) -> Result<City, AppError> {
        let mut store = self.store.write().await;
        if store.cities.iter().any(|c| c.name == city.name) {
            return Err(AppError::Conflict("City already exists".to_string()));
        }
        let city = City {
            id: Uuid::new_v4(),
            name: city.name,
            lat: city.lat,
            lon: city.lon,
        };
        store.cities.push(city.clone());
        Ok(city)
    }

    async fn list_destinations(
        &self,
        filter: DestinationFilter,
    ) -> Result<Vec<DestinationDetail>, AppError> {
        let store = self.store.read().await;

        let name = filter
            .name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty());
        let city_by_name = filter
            .city_name
            .as_deref()
            .map(|city| store.cities.iter().find(|c| c.name == city).map(|c| c.id));
        let categories: Vec<String> = filter
            .categories
            .iter()
            .map(|c| c.trim().to_uppercase())
            .collect();

        let mut matches: Vec<&Destination> = store
            .destinations
            .iter()
            .filter(|d| name.as_ref().is_none_or(|n| d.name.to_lowercase().contains(n)))
            .filter(|d| filter.city_id.is_none_or(|id| d.city_id == id))
            .filter(|d| match city_by_name {
                // An unknown city name matches nothing.
                Some(found) => found == Some(d.city_id),
                None => true,
            })
            .filter(|d| categories.is_empty() || categories.contains(&d.category.to_uppercase()))
            .collect();

        match filter.sort {
            SortOrder::Newest => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => matches.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        Ok(matches.into_iter().map(|d| store.detail(d)).collect())
    }

    async fn get_destination(&self, id: Uuid) -> Result<Option<DestinationDetail>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .destinations
            .iter()
            .find(|d| d.id == id)
            .map(|d| store.detail(d)))
    }

    async fn create_destination(
        &self,
        destination: NewDestination,
    ) -> Result<DestinationDetail, AppError> {
        let mut store = self.store.write().await;
        let fields = destination.fields;
        if !store.cities.iter().any(|c| c.id == fields.city_id) {
            return Err(AppError::NotFound("City"));
        }

        let created = Destination {
            id: Uuid::new_v4(),
            name: fields.name,
            city_id: fields.city_id,
            position: fields.position,
            address: fields.address,
            operational_hours: fields.operational_hours,
            ticket_price: fields.ticket_price,
            category: fields.category,
            description: fields.description,
            facilities: fields.facilities,
            created_at: Utc::now(),
        };

        for url in destination.images {
            store.images.push(Image {
                id: Uuid::new_v4(),
                destination_id: created.id,
                url,
            });
        }
        for video in destination.videos {
            store.videos.push(VideoContent {
                id: Uuid::new_v4(),
                destination_id: created.id,
                title: video.title,
                url: video.url,
                description: video.description,
            });
        }
        store.destinations.push(created.clone());

        Ok(store.detail(&created))
    }

    async fn update_destination(
        &self,
        id: Uuid,
        fields: DestinationFields,
    ) -> Result<Option<DestinationDetail>, AppError> {
        let mut store = self.store.write().await;
        let Some(slot) = store.destinations.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };

        slot.name = fields.name;
        slot.city_id = fields.city_id;
        slot.position = fields.position;
        slot.address = fields.address;
        slot.operational_hours = fields.operational_hours;
        slot.ticket_price = fields.ticket_price;
        slot.category = fields.category;
        slot.description = fields.description;
        slot.facilities = fields.facilities;

        let updated = slot.clone();
        Ok(Some(store.detail(&updated)))
    }

    async fn delete_destination(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.destinations.len();
        store.destinations.retain(|d| d.id != id);
        if store.destinations.len() == before {
            return Ok(false);
        }

        let videos: Vec<Uuid> = store
            .videos
            .iter()
            .filter(|v| v.destination_id == id)
            .map(|v| v.id)
            .collect();
        store.views.retain(|(video_id, _)| !videos.contains(video_id));
        store.videos.retain(|v| v.destination_id != id);
        store.images.retain(|i| i.destination_id != id);
        store.stops.retain(|(_, dest_id)| *dest_id != id);
        Ok(true)
    }

    async fn destinations_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Destination>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .destinations
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn destinations_in_cities(&self, city_ids: &[Uuid]) -> Result<Vec<Destination>, AppError> {
        let store = self.store.read().await;
        let mut found: Vec<Destination> = store
            .destinations
            .iter()
            .filter(|d| city_ids.contains(&d.city_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn add_image(&self, destination_id: Uuid, url: String) -> Result<Image, AppError> {
        let mut store = self.store.write().await;
        if !store.destinations.iter().any(|d| d.id == destination_id) {
            return Err(AppError::NotFound("Destination"));
        }
        let image = Image {
            id: Uuid::new_v4(),
            destination_id,
            url,
        };
        store.images.push(image.clone());
        Ok(image)
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.images.len();
        store.images.retain(|i| i.id != id);
        Ok(store.images.len() < before)
    }

    async fn add_video(
        &self,
        destination_id: Uuid,
        video: VideoInput,
    ) -> Result<VideoContent, AppError> {
        let mut store = self.store.write().await;
        if !store.destinations.iter().any(|d| d.id == destination_id) {
            return Err(AppError::NotFound("Destination"));
        }
        let video = VideoContent {
            id: Uuid::new_v4(),
            destination_id,
            title: video.title,
            url: video.url,
            description: video.description,
        };
        store.videos.push(video.clone());
        Ok(video)
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.videos.len();
        store.videos.retain(|v| v.id != id);
        store.views.retain(|(video_id, _)| *video_id != id);
        Ok(store.videos.len() < before)
    }

    async fn record_video_view(&self, video_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        if !store.videos.iter().any(|v| v.id == video_id) {
            return Ok(false);
        }
        store.views.push((video_id, user_id));
        Ok(true)
    }

    async fn most_viewed_destinations(&self) -> Result<Vec<MostViewedDestination>, AppError> {
        let store = self.store.read().await;

        let mut ranked: Vec<MostViewedDestination> = store
            .destinations
            .iter()
            .map(|d| {
                let videos: Vec<VideoContent> = store
                    .videos
                    .iter()
                    .filter(|v| v.destination_id == d.id)
                    .cloned()
                    .collect();
                let view_count = store
                    .views
                    .iter()
                    .filter(|(video_id, _)| videos.iter().any(|v| v.id == *video_id))
                    .count() as i64;

                MostViewedDestination {
                    id: d.id,
                    name: d.name.clone(),
                    address: d.address.clone(),
                    description: d.description.clone(),
                    view_count,
                    videos,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(a.name.cmp(&b.name)));
        Ok(ranked)
    }

    async fn create_route(&self, route: NewRoute) -> Result<RouteDetail, AppError> {
        let mut store = self.store.write().await;
        let saved = Route {
            id: Uuid::new_v4(),
            user_id: route.user_id,
            origin_city_name: route.origin_city_name,
            destination_city_name: route.destination_city_name,
            distance: route.distance,
            time: route.time,
            cost: route.cost,
            created_at: Utc::now(),
        };

        for destination_id in route.destination_ids {
            store.stops.push((saved.id, destination_id));
        }
        store.routes.push(saved.clone());

        Ok(store.route_detail(&saved))
    }

    async fn list_routes_for_user(&self, user_id: Uuid) -> Result<Vec<RouteDetail>, AppError> {
        let store = self.store.read().await;
        let mut routes: Vec<&Route> = store.routes.iter().filter(|r| r.user_id == user_id).collect();
        routes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(routes.into_iter().map(|r| store.route_detail(r)).collect())
    }

    async fn get_route(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        let store = self.store.read().await;
        Ok(store.routes.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_route(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let before = store.routes.len();
        store.routes.retain(|r| r.id != id);
        store.stops.retain(|(route_id, _)| *route_id != id);
        Ok(store.routes.len() < before)
    }

    async fn catalog_counts(&self) -> Result<CatalogCounts, AppError> {
        let store = self.store.read().await;

        let mut per_category: BTreeMap<String, i64> = BTreeMap::new();
        for destination in &store.destinations {
            *per_category.entry(destination.category.clone()).or_default() += 1;
        }

        Ok(CatalogCounts {
            users: store.users.len() as i64,
            destinations: store.destinations.len() as i64,
            video_contents: store.videos.len() as i64,
            per_category: per_category.into_iter().collect(),
        })
    }

    async fn registrations_by_month(&self) -> Result<Vec<(u32, i64)>, AppError> {
        let store = self.store.read().await;
        let mut months: BTreeMap<u32, i64> = BTreeMap::new();
        for user in &store.users {
            *months.entry(user.created_at.month()).or_default() += 1;
        }
        Ok(months.into_iter().collect())
    }
}
