use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, Validator, ok};
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    geo::{Coordinate, haversine_km},
    models::{City, CityRef, CreateRouteRequest, NewRoute, RouteDetail, RoutePlan},
};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PlanQuery {
    /// Origin city name.
    pub origin: Option<String>,
    /// Destination city name.
    pub destination: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RouteOwnerQuery {
    /// Another user's id; administrators only.
    pub user_id: Option<Uuid>,
}

async fn find_city(state: &AppState, name: &str) -> Result<City, AppError> {
    state
        .repo
        .find_city_by_name(name.trim())
        .await?
        .ok_or(AppError::NotFound("City"))
}

fn coordinate_of(city: &City) -> Result<Coordinate, AppError> {
    Coordinate::from_parts(city.lat, city.lon).map_err(|_| {
        AppError::BadRequest(format!("City '{}' has no coordinates", city.name))
    })
}

/// Great-circle distance between two stored cities, rounded to metres.
fn distance_between(origin: &City, destination: &City) -> Result<f64, AppError> {
    let km = haversine_km(coordinate_of(origin)?, coordinate_of(destination)?);
    Ok((km * 1000.0).round() / 1000.0)
}

/// plan_route
///
/// [Public Route] Distance between two cities and every destination located in
/// either of them.
#[utoipa::path(
    get,
    path = "/route/plan",
    params(PlanQuery),
    responses(
        (status = 200, description = "Plan", body = RoutePlan),
        (status = 400, description = "Missing city or coordinates"),
        (status = 404, description = "City not found")
    )
)]
pub async fn plan_route(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PlanQuery>,
) -> ApiResult<RoutePlan> {
    let origin_name = query.origin.unwrap_or_default();
    let destination_name = query.destination.unwrap_or_default();
    Validator::new()
        .required("origin", &origin_name)
        .required("destination", &destination_name)
        .finish()?;

    let origin = find_city(&state, &origin_name).await?;
    let destination = find_city(&state, &destination_name).await?;
    let distance = distance_between(&origin, &destination)?;

    let mut city_ids = vec![origin.id];
    if destination.id != origin.id {
        city_ids.push(destination.id);
    }
    let destinations = state.repo.destinations_in_cities(&city_ids).await?;

    ok(
        "Route plan",
        RoutePlan {
            origin: CityRef {
                id: origin.id,
                name: origin.name,
            },
            destination: CityRef {
                id: destination.id,
                name: destination.name,
            },
            distance,
            destinations,
        },
    )
}

/// create_route
///
/// [User/Admin Route] Saves a trip for the caller. The distance is always
/// computed here from the two cities; stops must reference existing destinations.
#[utoipa::path(
    post,
    path = "/route",
    request_body = CreateRouteRequest,
    responses(
        (status = 200, description = "Created", body = RouteDetail),
        (status = 400, description = "Validation error"),
        (status = 404, description = "City not found")
    )
)]
pub async fn create_route(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRouteRequest>,
) -> ApiResult<RouteDetail> {
    Validator::new()
        .required("originCityName", &payload.origin_city_name)
        .required("destinationCityName", &payload.destination_city_name)
        .check(payload.cost.is_none_or(|c| c >= 0), "cost must not be negative")
        .finish()?;

    let origin = find_city(&state, &payload.origin_city_name).await?;
    let destination = find_city(&state, &payload.destination_city_name).await?;
    let distance = distance_between(&origin, &destination)?;

    let mut stops: Vec<Uuid> = Vec::with_capacity(payload.destinations.len());
    for id in payload.destinations {
        if !stops.contains(&id) {
            stops.push(id);
        }
    }
    if !stops.is_empty() {
        let known = state.repo.destinations_by_ids(&stops).await?;
        if known.len() != stops.len() {
            return Err(AppError::BadRequest(
                "destinations contains an unknown destination id".to_string(),
            ));
        }
    }

    let route = state
        .repo
        .create_route(NewRoute {
            user_id: user.id,
            origin_city_name: origin.name,
            destination_city_name: destination.name,
            distance,
            time: payload.time.filter(|t| !t.trim().is_empty()),
            cost: payload.cost,
            destination_ids: stops,
        })
        .await?;

    tracing::info!(route_id = %route.route.id, user_id = %user.id, distance, "route saved");
    ok("Route created", route)
}

/// list_routes
///
/// [User/Admin Route] The caller's saved routes, newest first. Administrators
/// may pass `user_id` to read someone else's.
#[utoipa::path(
    get,
    path = "/route",
    params(RouteOwnerQuery),
    responses(
        (status = 200, description = "Routes", body = [RouteDetail]),
        (status = 403, description = "Not allowed to read another user's routes")
    )
)]
pub async fn list_routes(
    user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RouteOwnerQuery>,
) -> ApiResult<Vec<RouteDetail>> {
    let owner = match query.user_id {
        Some(other) if other != user.id && !user.is_admin() => {
            return Err(AppError::Forbidden("You can only read your own routes"));
        }
        Some(other) => other,
        None => user.id,
    };

    ok("List of routes", state.repo.list_routes_for_user(owner).await?)
}

/// delete_route
///
/// [User/Admin Route] Owners delete their own routes; administrators any route.
#[utoipa::path(
    delete,
    path = "/route/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_route(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    let route = state
        .repo
        .get_route(id)
        .await?
        .ok_or(AppError::NotFound("Route"))?;

    if route.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("You can only delete your own routes"));
    }

    if !state.repo.delete_route(id).await? {
        return Err(AppError::NotFound("Route"));
    }
    ok("Route deleted", ())
}
