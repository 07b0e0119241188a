use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, Validator, ok};
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    models::{
        CreateDestinationRequest, CreateImageRequest, DestinationDetail, DestinationFields, Image,
        MostViewedDestination, NewDestination, VideoContent, VideoInput,
    },
    repository::{DestinationFilter, SortOrder},
};

/// DestinationQuery
///
/// Query parameters of GET /destination.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DestinationQuery {
    /// Substring of the destination name.
    pub name: Option<String>,
    /// City id or exact city name.
    pub city: Option<String>,
    /// Comma-separated categories, matched case-insensitively.
    pub category: Option<String>,
    /// `newest` (default) or `oldest`.
    pub sort: Option<String>,
}

fn parse_sort(raw: Option<&str>) -> Result<SortOrder, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("newest") => Ok(SortOrder::Newest),
        Some("oldest") => Ok(SortOrder::Oldest),
        Some(other) => Err(AppError::BadRequest(format!(
            "sort must be 'newest' or 'oldest', got '{other}'"
        ))),
    }
}

fn split_categories(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// list_destinations
///
/// [Public Route] Destinations with city, images and videos, filtered by name,
/// city and category.
#[utoipa::path(
    get,
    path = "/destination",
    params(DestinationQuery),
    responses((status = 200, description = "Destinations", body = [DestinationDetail]))
)]
pub async fn list_destinations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DestinationQuery>,
) -> ApiResult<Vec<DestinationDetail>> {
    let mut filter = DestinationFilter {
        name: query.name,
        sort: parse_sort(query.sort.as_deref())?,
        categories: query
            .category
            .as_deref()
            .map(|raw| split_categories(raw).collect())
            .unwrap_or_default(),
        ..Default::default()
    };

    if let Some(city) = query.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        match city.parse::<Uuid>() {
            Ok(id) => filter.city_id = Some(id),
            Err(_) => filter.city_name = Some(city),
        }
    }

    ok("List of destinations", state.repo.list_destinations(filter).await?)
}

/// filter_destinations
///
/// [Public Route] GET /destinations?city=<name>&category=<a>&category=<b>.
/// The `category` key may repeat and each value may itself be comma-separated.
#[utoipa::path(
    get,
    path = "/destinations",
    params(
        ("city" = Option<String>, Query, description = "Exact city name"),
        ("category" = Option<Vec<String>>, Query, description = "Repeatable category filter")
    ),
    responses((status = 200, description = "Destinations", body = [DestinationDetail]))
)]
pub async fn filter_destinations(
    State(state): State<AppState>,
    AppQuery(pairs): AppQuery<Vec<(String, String)>>,
) -> ApiResult<Vec<DestinationDetail>> {
    let mut filter = DestinationFilter::default();

    for (key, value) in &pairs {
        match key.as_str() {
            "city" if !value.trim().is_empty() => filter.city_name = Some(value.trim().to_string()),
            "category" => filter.categories.extend(split_categories(value)),
            _ => {}
        }
    }

    ok("Filtered destinations", state.repo.list_destinations(filter).await?)
}

/// get_destination
///
/// [Public Route] One destination by id.
#[utoipa::path(
    get,
    path = "/destination/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Found", body = DestinationDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<DestinationDetail> {
    let destination = state
        .repo
        .get_destination(id)
        .await?
        .ok_or(AppError::NotFound("Destination"))?;
    ok("Destination detail", destination)
}

/// personalized_destinations
///
/// [Authenticated Route] Destinations in the caller's preferred categories.
/// A caller without preferences gets an empty list rather than everything.
#[utoipa::path(
    get,
    path = "/destination/personalized",
    responses((status = 200, description = "Destinations", body = [DestinationDetail]))
)]
pub async fn personalized_destinations(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<DestinationDetail>> {
    let profile = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if profile.categories.is_empty() {
        return ok("No preferred categories set", Vec::new());
    }

    let destinations = state
        .repo
        .list_destinations(DestinationFilter {
            categories: profile.categories,
            ..Default::default()
        })
        .await?;
    ok("Personalized destinations", destinations)
}

/// Validates the payload and resolves the city name into its id.
async fn resolve_fields(
    state: &AppState,
    payload: &CreateDestinationRequest,
) -> Result<DestinationFields, AppError> {
    Validator::new()
        .required("name", &payload.name)
        .required("city", &payload.city)
        .required("category", &payload.category)
        .check(
            payload.ticket_price.is_finite() && payload.ticket_price >= 0.0,
            "ticket_price must be zero or positive",
        )
        .check(payload.position.is_finite(), "position must be a number")
        .finish()?;

    let city = state
        .repo
        .find_city_by_name(payload.city.trim())
        .await?
        .ok_or(AppError::NotFound("City"))?;

    Ok(DestinationFields {
        name: payload.name.trim().to_string(),
        city_id: city.id,
        position: payload.position,
        address: payload.address.clone(),
        operational_hours: payload.operational_hours.clone(),
        ticket_price: payload.ticket_price,
        category: payload.category.trim().to_string(),
        description: payload.description.clone(),
        facilities: payload
            .facilities
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
    })
}

fn validate_video(video: &VideoInput, errors: &mut Validator) {
    errors
        .required("video_contents.title", &video.title)
        .required("video_contents.url", &video.url);
}

/// create_destination
///
/// [Admin Route] Creates a destination with its images and videos atomically.
#[utoipa::path(
    post,
    path = "/destination",
    request_body = CreateDestinationRequest,
    responses(
        (status = 200, description = "Created", body = DestinationDetail),
        (status = 400, description = "Validation error"),
        (status = 404, description = "City not found")
    )
)]
pub async fn create_destination(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDestinationRequest>,
) -> ApiResult<DestinationDetail> {
    let fields = resolve_fields(&state, &payload).await?;

    let mut validator = Validator::new();
    for url in &payload.image {
        validator.required("image", url);
    }
    for video in &payload.video_contents {
        validate_video(video, &mut validator);
    }
    validator.finish()?;

    let created = state
        .repo
        .create_destination(NewDestination {
            fields,
            images: payload.image,
            videos: payload.video_contents,
        })
        .await?;

    tracing::info!(destination_id = %created.id, "destination created");
    ok("Destination created", created)
}

/// update_destination
///
/// [Admin Route] Replaces the scalar fields of a destination. Media is left untouched.
#[utoipa::path(
    put,
    path = "/destination/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    request_body = CreateDestinationRequest,
    responses(
        (status = 200, description = "Updated", body = DestinationDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateDestinationRequest>,
) -> ApiResult<DestinationDetail> {
    let fields = resolve_fields(&state, &payload).await?;
    let updated = state
        .repo
        .update_destination(id, fields)
        .await?
        .ok_or(AppError::NotFound("Destination"))?;
    ok("Destination updated", updated)
}

/// delete_destination
///
/// [Admin Route] Deletes a destination with its media, views and route stops.
#[utoipa::path(
    delete,
    path = "/destination/{id}",
    params(("id" = Uuid, Path, description = "Destination ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_destination(id).await? {
        return Err(AppError::NotFound("Destination"));
    }
    tracing::info!(destination_id = %id, "destination deleted");
    ok("Destination deleted", ())
}

async fn ensure_destination(state: &AppState, id: Uuid) -> Result<(), AppError> {
    match state.repo.get_destination(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("Destination")),
    }
}

/// add_image
///
/// [Admin Route] Attaches an image URL to a destination.
#[utoipa::path(
    post,
    path = "/destination/{id}/images",
    params(("id" = Uuid, Path, description = "Destination ID")),
    request_body = CreateImageRequest,
    responses(
        (status = 200, description = "Created", body = Image),
        (status = 404, description = "Destination not found")
    )
)]
pub async fn add_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateImageRequest>,
) -> ApiResult<Image> {
    Validator::new().required("url", &payload.url).finish()?;
    ensure_destination(&state, id).await?;
    ok("Image added", state.repo.add_image(id, payload.url).await?)
}

/// delete_image
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/images/{id}",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_image(id).await? {
        return Err(AppError::NotFound("Image"));
    }
    ok("Image deleted", ())
}

/// add_video
///
/// [Admin Route] Attaches a video to a destination.
#[utoipa::path(
    post,
    path = "/destination/{id}/videos",
    params(("id" = Uuid, Path, description = "Destination ID")),
    request_body = VideoInput,
    responses(
        (status = 200, description = "Created", body = VideoContent),
        (status = 404, description = "Destination not found")
    )
)]
pub async fn add_video(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<VideoInput>,
) -> ApiResult<VideoContent> {
    let mut validator = Validator::new();
    validate_video(&payload, &mut validator);
    validator.finish()?;

    ensure_destination(&state, id).await?;
    ok("Video content added", state.repo.add_video(id, payload).await?)
}

/// delete_video
///
/// [Admin Route] Deletes a video and its view records.
#[utoipa::path(
    delete,
    path = "/video-content/{id}",
    params(("id" = Uuid, Path, description = "Video content ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_video(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    if !state.repo.delete_video(id).await? {
        return Err(AppError::NotFound("Video content"));
    }
    ok("Video content deleted", ())
}

/// record_view
///
/// [Authenticated Route] Counts one view of a video by the caller.
#[utoipa::path(
    post,
    path = "/video-content/{id}/view",
    params(("id" = Uuid, Path, description = "Video content ID")),
    responses(
        (status = 200, description = "View recorded"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn record_view(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    if !state.repo.record_video_view(id, user.id).await? {
        return Err(AppError::NotFound("Video content"));
    }
    ok("View recorded", ())
}

/// most_viewed
///
/// [Public Route] Destinations ranked by the total views of their videos.
#[utoipa::path(
    get,
    path = "/video-content/most",
    responses((status = 200, description = "Ranking", body = [MostViewedDestination]))
)]
pub async fn most_viewed(State(state): State<AppState>) -> ApiResult<Vec<MostViewedDestination>> {
    ok(
        "Most viewed destinations",
        state.repo.most_viewed_destinations().await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_newest() {
        assert_eq!(parse_sort(None).unwrap(), SortOrder::Newest);
        assert_eq!(parse_sort(Some("oldest")).unwrap(), SortOrder::Oldest);
        assert!(parse_sort(Some("random")).is_err());
    }

    #[test]
    fn categories_split_on_commas() {
        let split: Vec<String> = split_categories("Nature, culture,,").collect();
        assert_eq!(split, vec!["Nature", "culture"]);
    }
}
