use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{CatalogCounts, DestinationFilter, Repository, SortOrder};
use crate::{
    error::{AppError, conflict_on_unique},
    models::{
        City, CreateCityRequest, Destination, DestinationDetail, DestinationFields, Image,
        MostViewedDestination, NewDestination, NewRoute, NewUser, Route, RouteDetail, User,
        VideoContent, VideoInput,
    },
};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, city, password_hash, \
     role, categories, phone_number, gender, created_at, updated_at";

const DESTINATION_COLUMNS: &str = r#"d.id, d.name, d.city_id, d."position", d.address,
     d.operational_hours, d.ticket_price, d.category, d.description, d.facilities, d.created_at"#;

const ROUTE_COLUMNS: &str = r#"id, user_id, origin_city_name, destination_city_name, distance,
     travel_time AS "time", cost, created_at"#;

#[derive(FromRow)]
struct DestinationRow {
    #[sqlx(flatten)]
    destination: Destination,
    city_name: String,
}

#[derive(FromRow)]
struct RouteStopRow {
    route_id: Uuid,
    #[sqlx(flatten)]
    destination: Destination,
}

#[derive(FromRow)]
struct ViewCountRow {
    id: Uuid,
    name: String,
    address: String,
    description: String,
    view_count: i64,
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// hydrate
    ///
    /// Resolves images and videos for a batch of destination rows with two
    /// `= ANY($1)` queries instead of one query per destination.
    async fn hydrate(&self, rows: Vec<DestinationRow>) -> Result<Vec<DestinationDetail>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.destination.id).collect();

        let images: Vec<Image> = sqlx::query_as(
            "SELECT id, destination_id, url FROM images WHERE destination_id = ANY($1) ORDER BY url",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let videos = self.videos_for(&ids).await?;

        let mut images_by_destination: HashMap<Uuid, Vec<Image>> = HashMap::new();
        for image in images {
            images_by_destination
                .entry(image.destination_id)
                .or_default()
                .push(image);
        }
        let mut videos_by_destination = group_videos(videos);

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.destination.id;
                DestinationDetail::assemble(
                    row.destination,
                    row.city_name,
                    images_by_destination.remove(&id).unwrap_or_default(),
                    videos_by_destination.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    async fn videos_for(&self, destination_ids: &[Uuid]) -> Result<Vec<VideoContent>, AppError> {
        let videos = sqlx::query_as(
            r#"
            SELECT id, destination_id, title, url, description
            FROM video_contents
            WHERE destination_id = ANY($1)
            ORDER BY title
            "#,
        )
        .bind(destination_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }

    /// Stops of the given routes, in stop order.
    async fn stops_for(&self, route_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Destination>>, AppError> {
        let rows: Vec<RouteStopRow> = sqlx::query_as(&format!(
            r#"
            SELECT rd.route_id, {DESTINATION_COLUMNS}
            FROM route_destinations rd
            JOIN destinations d ON d.id = rd.destination_id
            WHERE rd.route_id = ANY($1)
            ORDER BY rd.route_id, rd.stop_order
            "#
        ))
        .bind(route_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut stops: HashMap<Uuid, Vec<Destination>> = HashMap::new();
        for row in rows {
            stops.entry(row.route_id).or_default().push(row.destination);
        }
        Ok(stops)
    }
}

fn group_videos(videos: Vec<VideoContent>) -> HashMap<Uuid, Vec<VideoContent>> {
    let mut grouped: HashMap<Uuid, Vec<VideoContent>> = HashMap::new();
    for video in videos {
        grouped.entry(video.destination_id).or_default().push(video);
    }
    grouped
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    /// create_user
    ///
    /// A taken username or email surfaces as `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, username, first_name, last_name, email, city, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.city)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already registered"))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// list_users
    ///
    /// Optional case-insensitive substring filter on first or last name.
    async fn list_users(&self, name: Option<String>) -> Result<Vec<User>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));

        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            let pattern = format!("%{}%", name.trim());
            builder.push(" WHERE first_name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR last_name ILIKE ");
            builder.push_bind(pattern);
        }
        builder.push(" ORDER BY created_at DESC");

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn update_user(&self, user: User) -> Result<User, AppError> {
        let updated: Option<User> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                username = $2, first_name = $3, last_name = $4, email = $5, city = $6,
                password_hash = $7, role = $8, categories = $9, phone_number = $10,
                gender = $11, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.city)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.categories)
        .bind(&user.phone_number)
        .bind(&user.gender)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already registered"))?;

        updated.ok_or(AppError::NotFound("User"))
    }

    async fn set_user_categories(
        &self,
        id: Uuid,
        categories: Vec<String>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(&format!(
            "UPDATE users SET categories = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&categories)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// delete_user
    ///
    /// Removes the user's views, routes and route stops before the user row,
    /// all in one transaction.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM video_content_views WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "DELETE FROM route_destinations WHERE route_id IN (SELECT id FROM routes WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM routes WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Cities ---

    async fn list_cities(&self) -> Result<Vec<City>, AppError> {
        let cities = sqlx::query_as("SELECT id, name, lat, lon FROM cities ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    async fn find_city_by_name(&self, name: &str) -> Result<Option<City>, AppError> {
        let city = sqlx::query_as("SELECT id, name, lat, lon FROM cities WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(city)
    }

    async fn create_city(&self, city: CreateCityRequest) -> Result<City, AppError> {
        sqlx::query_as(
            "INSERT INTO cities (id, name, lat, lon) VALUES ($1, $2, $3, $4) RETURNING id, name, lat, lon",
        )
        .bind(Uuid::new_v4())
        .bind(&city.name)
        .bind(city.lat)
        .bind(city.lon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "City already exists"))
    }

    // --- Destinations ---

    /// list_destinations
    ///
    /// Builds the listing query with QueryBuilder so every filter value is a bound
    /// parameter. Categories compare upper-cased on both sides.
    async fn list_destinations(
        &self,
        filter: DestinationFilter,
    ) -> Result<Vec<DestinationDetail>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT {DESTINATION_COLUMNS}, c.name AS city_name
            FROM destinations d
            JOIN cities c ON c.id = d.city_id
            WHERE TRUE
            "#
        ));

        if let Some(name) = filter.name.filter(|n| !n.trim().is_empty()) {
            builder.push(" AND d.name ILIKE ");
            builder.push_bind(format!("%{}%", name.trim()));
        }
        if let Some(city_id) = filter.city_id {
            builder.push(" AND d.city_id = ");
            builder.push_bind(city_id);
        }
        if let Some(city_name) = filter.city_name {
            builder.push(" AND c.name = ");
            builder.push_bind(city_name);
        }
        if !filter.categories.is_empty() {
            let categories: Vec<String> = filter
                .categories
                .iter()
                .map(|c| c.trim().to_uppercase())
                .collect();
            builder.push(" AND UPPER(d.category) = ANY(");
            builder.push_bind(categories);
            builder.push(")");
        }

        builder.push(match filter.sort {
            SortOrder::Newest => " ORDER BY d.created_at DESC",
            SortOrder::Oldest => " ORDER BY d.created_at ASC",
        });

        let rows = builder
            .build_query_as::<DestinationRow>()
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn get_destination(&self, id: Uuid) -> Result<Option<DestinationDetail>, AppError> {
        let row: Option<DestinationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {DESTINATION_COLUMNS}, c.name AS city_name
            FROM destinations d
            JOIN cities c ON c.id = d.city_id
            WHERE d.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// create_destination
    ///
    /// Inserts the destination, its images and its videos in one transaction;
    /// any failure rolls back every row.
    async fn create_destination(
        &self,
        destination: NewDestination,
    ) -> Result<DestinationDetail, AppError> {
        let id = Uuid::new_v4();
        let fields = destination.fields;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO destinations
                (id, name, city_id, "position", address, operational_hours,
                 ticket_price, category, description, facilities)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.city_id)
        .bind(fields.position)
        .bind(&fields.address)
        .bind(&fields.operational_hours)
        .bind(fields.ticket_price)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(&fields.facilities)
        .execute(&mut *tx)
        .await?;

        for url in &destination.images {
            sqlx::query("INSERT INTO images (id, destination_id, url) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        for video in &destination.videos {
            sqlx::query(
                "INSERT INTO video_contents (id, destination_id, title, url, description) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(&video.title)
            .bind(&video.url)
            .bind(&video.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_destination(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("destination {id} missing after insert")))
    }

    async fn update_destination(
        &self,
        id: Uuid,
        fields: DestinationFields,
    ) -> Result<Option<DestinationDetail>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE destinations SET
                name = $2, city_id = $3, "position" = $4, address = $5,
                operational_hours = $6, ticket_price = $7, category = $8,
                description = $9, facilities = $10
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.city_id)
        .bind(fields.position)
        .bind(&fields.address)
        .bind(&fields.operational_hours)
        .bind(fields.ticket_price)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(&fields.facilities)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_destination(id).await
    }

    async fn delete_destination(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM video_content_views WHERE video_content_id IN (SELECT id FROM video_contents WHERE destination_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM video_contents WHERE destination_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM images WHERE destination_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM route_destinations WHERE destination_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM destinations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn destinations_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Destination>, AppError> {
        let destinations = sqlx::query_as(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations d WHERE d.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(destinations)
    }

    async fn destinations_in_cities(&self, city_ids: &[Uuid]) -> Result<Vec<Destination>, AppError> {
        let destinations = sqlx::query_as(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations d WHERE d.city_id = ANY($1) ORDER BY d.created_at DESC"
        ))
        .bind(city_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(destinations)
    }

    // --- Media ---

    async fn add_image(&self, destination_id: Uuid, url: String) -> Result<Image, AppError> {
        let image = sqlx::query_as(
            "INSERT INTO images (id, destination_id, url) VALUES ($1, $2, $3) RETURNING id, destination_id, url",
        )
        .bind(Uuid::new_v4())
        .bind(destination_id)
        .bind(&url)
        .fetch_one(&self.pool)
        .await?;
        Ok(image)
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_video(
        &self,
        destination_id: Uuid,
        video: VideoInput,
    ) -> Result<VideoContent, AppError> {
        let video = sqlx::query_as(
            r#"
            INSERT INTO video_contents (id, destination_id, title, url, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, destination_id, title, url, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(destination_id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(video)
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM video_content_views WHERE video_content_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM video_contents WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// record_video_view
    ///
    /// Insert-select against `video_contents`, so an unknown video inserts nothing.
    async fn record_video_view(&self, video_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO video_content_views (id, video_content_id, user_id)
            SELECT $1, v.id, $3 FROM video_contents v WHERE v.id = $2
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// most_viewed_destinations
    ///
    /// Sums views over each destination's videos. Destinations without views
    /// are included with a zero count, after all viewed ones.
    async fn most_viewed_destinations(&self) -> Result<Vec<MostViewedDestination>, AppError> {
        let rows: Vec<ViewCountRow> = sqlx::query_as(
            r#"
            SELECT d.id, d.name, d.address, d.description, COUNT(w.id) AS view_count
            FROM destinations d
            LEFT JOIN video_contents v ON v.destination_id = d.id
            LEFT JOIN video_content_views w ON w.video_content_id = v.id
            GROUP BY d.id, d.name, d.address, d.description
            ORDER BY view_count DESC, d.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut videos = group_videos(self.videos_for(&ids).await?);

        Ok(rows
            .into_iter()
            .map(|row| MostViewedDestination {
                videos: videos.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                address: row.address,
                description: row.description,
                view_count: row.view_count,
            })
            .collect())
    }

    // --- Routes ---

    /// create_route
    ///
    /// The route row and its ordered stops are written in one transaction.
    async fn create_route(&self, route: NewRoute) -> Result<RouteDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let saved: Route = sqlx::query_as(&format!(
            r#"
            INSERT INTO routes
                (id, user_id, origin_city_name, destination_city_name, distance, travel_time, cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ROUTE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(route.user_id)
        .bind(&route.origin_city_name)
        .bind(&route.destination_city_name)
        .bind(route.distance)
        .bind(&route.time)
        .bind(route.cost)
        .fetch_one(&mut *tx)
        .await?;

        for (order, destination_id) in route.destination_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO route_destinations (id, route_id, destination_id, stop_order) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(saved.id)
            .bind(destination_id)
            .bind(order as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut stops = self.stops_for(&[saved.id]).await?;
        Ok(RouteDetail {
            destinations: stops.remove(&saved.id).unwrap_or_default(),
            route: saved,
        })
    }

    async fn list_routes_for_user(&self, user_id: Uuid) -> Result<Vec<RouteDetail>, AppError> {
        let routes: Vec<Route> = sqlx::query_as(&format!(
            "SELECT {ROUTE_COLUMNS} FROM routes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = routes.iter().map(|route| route.id).collect();
        let mut stops = self.stops_for(&ids).await?;

        Ok(routes
            .into_iter()
            .map(|route| RouteDetail {
                destinations: stops.remove(&route.id).unwrap_or_default(),
                route,
            })
            .collect())
    }

    async fn get_route(&self, id: Uuid) -> Result<Option<Route>, AppError> {
        let route = sqlx::query_as(&format!("SELECT {ROUTE_COLUMNS} FROM routes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(route)
    }

    async fn delete_route(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM route_destinations WHERE route_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Dashboard ---

    async fn catalog_counts(&self) -> Result<CatalogCounts, AppError> {
        let (users, destinations, video_contents): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM destinations),
                (SELECT COUNT(*) FROM video_contents)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let per_category: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM destinations GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogCounts {
            users,
            destinations,
            video_contents,
            per_category,
        })
    }

    async fn registrations_by_month(&self) -> Result<Vec<(u32, i64)>, AppError> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT EXTRACT(MONTH FROM created_at)::INT4 AS month, COUNT(*) AS count
            FROM users
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(month, count)| (month as u32, count))
            .collect())
    }
}
