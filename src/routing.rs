//! Application router configuration mapping the JSON API onto its handlers.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState,
    analytics::{
        get_category_totals_endpoint, get_day_totals_endpoint, get_month_totals_endpoint,
        get_summary_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
        get_budget_status_endpoint, get_budgets_endpoint, update_budget_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        get_expenses_endpoint, update_expense_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(endpoints::BUDGET_STATUS, get(get_budget_status_endpoint))
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(endpoints::ANALYTICS_SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::ANALYTICS_CATEGORIES,
            get(get_category_totals_endpoint),
        )
        .route(endpoints::ANALYTICS_MONTHS, get(get_month_totals_endpoint))
        .route(endpoints::ANALYTICS_DAYS, get(get_day_totals_endpoint))
        .fallback(get_unknown_route)
        .with_state(state)
}

/// The JSON body returned for paths outside the API.
async fn get_unknown_route() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "the requested route does not exist"})),
    )
        .into_response()
}
