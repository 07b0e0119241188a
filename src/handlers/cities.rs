use axum::extract::State;

use super::{ApiResult, Validator, ok};
use crate::{
    AppState,
    extract::AppJson,
    geo::Coordinate,
    models::{City, CreateCityRequest},
};

/// list_cities
///
/// [Public Route] All cities ordered by name.
#[utoipa::path(
    get,
    path = "/city",
    responses((status = 200, description = "Cities", body = [City]))
)]
pub async fn list_cities(State(state): State<AppState>) -> ApiResult<Vec<City>> {
    ok("List of cities", state.repo.list_cities().await?)
}

/// create_city
///
/// [Admin Route] Adds a city. Coordinates are optional, but when given both
/// must be present and in range; route planning needs them.
#[utoipa::path(
    post,
    path = "/city",
    request_body = CreateCityRequest,
    responses(
        (status = 200, description = "Created", body = City),
        (status = 400, description = "Invalid name or coordinates"),
        (status = 409, description = "City already exists")
    )
)]
pub async fn create_city(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CreateCityRequest>,
) -> ApiResult<City> {
    payload.name = payload.name.trim().to_string();
    Validator::new().required("name", &payload.name).finish()?;

    if payload.lat.is_some() || payload.lon.is_some() {
        Coordinate::from_parts(payload.lat, payload.lon)?;
    }

    let city = state.repo.create_city(payload).await?;
    tracing::info!(city_id = %city.id, name = %city.name, "city created");
    ok("City created", city)
}
