use axum::extract::State;
use std::collections::BTreeMap;

use super::{ApiResult, ok};
use crate::{
    AppState,
    models::{DashboardCounts, MonthlyUserCount},
};

/// Categories reported even when no destination uses them yet.
const CORE_CATEGORIES: [&str; 3] = ["Nature", "Culture", "Ecotourism"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Folds raw per-category counts onto the core names (case-insensitively),
/// keeping any other category under its stored spelling.
fn category_breakdown(raw: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut breakdown: BTreeMap<String, i64> = CORE_CATEGORIES
        .iter()
        .map(|name| (name.to_string(), 0))
        .collect();

    for (category, count) in raw {
        let key = CORE_CATEGORIES
            .iter()
            .find(|core| core.eq_ignore_ascii_case(category.trim()))
            .map(|core| core.to_string())
            .unwrap_or(category);
        *breakdown.entry(key).or_default() += count;
    }
    breakdown
}

fn monthly_series(raw: Vec<(u32, i64)>) -> Vec<MonthlyUserCount> {
    let mut counts = [0i64; 12];
    for (month, count) in raw {
        if let Some(slot) = month.checked_sub(1).and_then(|i| counts.get_mut(i as usize)) {
            *slot += count;
        }
    }

    MONTHS
        .iter()
        .zip(counts)
        .map(|(month, count)| MonthlyUserCount {
            month: month.to_string(),
            count,
        })
        .collect()
}

/// count_data
///
/// [Admin Route] Totals for the dashboard cards.
#[utoipa::path(
    get,
    path = "/dashboard/count-data",
    responses((status = 200, description = "Counts", body = DashboardCounts))
)]
pub async fn count_data(State(state): State<AppState>) -> ApiResult<DashboardCounts> {
    let counts = state.repo.catalog_counts().await?;
    ok(
        "Dashboard counts",
        DashboardCounts {
            user: counts.users,
            destination: counts.destinations,
            video_content: counts.video_contents,
            destination_categories: category_breakdown(counts.per_category),
        },
    )
}

/// registration_graphic
///
/// [Admin Route] User registrations per calendar month, Jan to Dec.
#[utoipa::path(
    get,
    path = "/dashboard/graphic",
    responses((status = 200, description = "Monthly registrations", body = [MonthlyUserCount]))
)]
pub async fn registration_graphic(
    State(state): State<AppState>,
) -> ApiResult<Vec<MonthlyUserCount>> {
    let raw = state.repo.registrations_by_month().await?;
    ok("Monthly user registrations", monthly_series(raw))
}
