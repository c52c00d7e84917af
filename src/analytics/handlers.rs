//! JSON endpoints for the derived analytics views.
//!
//! Each endpoint takes an optional `time_frame` query parameter (`all`,
//! `week`, `month`, `quarter`, `year`) that windows the expense snapshot
//! before aggregating. Unknown values fall back to `all`.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    analytics::{
        aggregate::{summarize, totals_by_bucket, totals_by_category},
        period::{Granularity, TimeFrame},
    },
    expense::{Expense, list_expenses},
    timezone::today,
};

/// The state needed for the analytics endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalyticsEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The windowing criteria for an analytics view, as raw query text.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// One of `all`, `week`, `month`, `quarter`, `year`.
    pub time_frame: Option<String>,
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The sum of amounts in the category.
    pub total: f64,
}

/// The total spent in one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotal {
    /// The bucket label, e.g. `2024-01-05` or `Jan 2024`.
    pub label: String,
    /// The sum of amounts in the bucket.
    pub total: f64,
}

/// Fetch all expenses and drop those older than the requested time frame.
fn windowed_snapshot(
    state: &AnalyticsEndpointState,
    params: &AnalyticsParams,
    today: Date,
) -> Result<Vec<Expense>, Error> {
    let expenses = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        list_expenses(&connection)?
    };

    let time_frame = params
        .time_frame
        .as_deref()
        .map(TimeFrame::from_query)
        .unwrap_or_default();

    Ok(match time_frame.cutoff(today) {
        Some(cutoff) => expenses
            .into_iter()
            .filter(|expense| expense.date >= cutoff)
            .collect(),
        None => expenses,
    })
}

/// Handle GET requests for the overall summary figures.
pub async fn get_summary_endpoint(
    State(state): State<AnalyticsEndpointState>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    match windowed_snapshot(&state, &params, today()) {
        Ok(expenses) => Json(summarize(&expenses)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle GET requests for per-category totals, largest first.
pub async fn get_category_totals_endpoint(
    State(state): State<AnalyticsEndpointState>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    let expenses = match windowed_snapshot(&state, &params, today()) {
        Ok(expenses) => expenses,
        Err(error) => return error.into_response(),
    };

    let mut totals: Vec<CategoryTotal> = totals_by_category(&expenses)
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    // Largest spend first, with the name as a tiebreak for a stable order.
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    Json(totals).into_response()
}

/// Handle GET requests for the chronological month-by-month totals.
pub async fn get_month_totals_endpoint(
    State(state): State<AnalyticsEndpointState>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    bucket_totals_response(&state, &params, Granularity::Month)
}

/// Handle GET requests for the chronological day-by-day totals.
pub async fn get_day_totals_endpoint(
    State(state): State<AnalyticsEndpointState>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    bucket_totals_response(&state, &params, Granularity::Day)
}

fn bucket_totals_response(
    state: &AnalyticsEndpointState,
    params: &AnalyticsParams,
    granularity: Granularity,
) -> Response {
    let expenses = match windowed_snapshot(state, params, today()) {
        Ok(expenses) => expenses,
        Err(error) => return error.into_response(),
    };

    let totals: Vec<BucketTotal> = totals_by_bucket(&expenses, granularity)
        .into_iter()
        .map(|(label, total)| BucketTotal { label, total })
        .collect();

    Json(totals).into_response()
}
