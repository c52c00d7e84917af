//! JSON endpoints for budgets and their derived status.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error,
    budget::{Budget, BudgetPatch, BudgetStatus, Period, core, evaluate_budget},
    database_id::BudgetId,
    expense::{CategoryName, list_expenses},
    timezone::today,
};

/// The state needed for the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The draft record for creating a budget.
///
/// The period is kept as raw text so that an unrecognized value is reported
/// as a validation error rather than rejected during deserialization.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBudget {
    /// The category the cap applies to. Must be non-empty.
    pub category: String,
    /// The spending cap. Must be greater than zero.
    pub amount: f64,
    /// The recurring cycle: `weekly` or `monthly`.
    pub period: String,
}

/// A budget together with how far through its cap it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetWithStatus {
    /// The budget record.
    #[serde(flatten)]
    pub budget: Budget,
    /// Derived spend figures for the current period.
    #[serde(flatten)]
    pub status: BudgetStatus,
}

/// Handle GET requests for the budget list.
pub async fn get_budgets_endpoint(State(state): State<BudgetEndpointState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::list_budgets(&connection) {
        Ok(budgets) => Json(budgets).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle POST requests that create a budget. Responds with 201 and the
/// created record.
pub async fn create_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Json(draft): Json<CreateBudget>,
) -> Response {
    let category = match CategoryName::new(&draft.category) {
        Ok(category) => category,
        Err(error) => return error.into_response(),
    };
    let period = match draft.period.parse::<Period>() {
        Ok(period) => period,
        Err(error) => return error.into_response(),
    };
    let builder = Budget::build(category, draft.amount, period);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::create_budget(builder, &connection) {
        Ok(budget) => (StatusCode::CREATED, Json(budget)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle GET requests for a single budget by its ID.
pub async fn get_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::get_budget(budget_id, &connection) {
        Ok(budget) => Json(budget).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle PUT requests that apply a partial update to a budget.
pub async fn update_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Path(budget_id): Path<BudgetId>,
    Json(patch): Json<BudgetPatch>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::update_budget(budget_id, patch, &connection) {
        Ok(budget) => Json(budget).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle DELETE requests for a budget. Responds with a confirmation body.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::delete_budget(budget_id, &connection) {
        Ok(()) => Json(json!({"message": "Budget deleted"})).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle GET requests for the status of every budget.
///
/// Each budget is evaluated against the same expense snapshot, so the figures
/// are mutually consistent even while writes are happening.
pub async fn get_budget_status_endpoint(State(state): State<BudgetEndpointState>) -> Response {
    let (budgets, expenses) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        let budgets = match core::list_budgets(&connection) {
            Ok(budgets) => budgets,
            Err(error) => return error.into_response(),
        };
        let expenses = match list_expenses(&connection) {
            Ok(expenses) => expenses,
            Err(error) => return error.into_response(),
        };

        (budgets, expenses)
    };

    let today = today();
    let statuses: Vec<BudgetWithStatus> = budgets
        .into_iter()
        .map(|budget| {
            let status = evaluate_budget(&budget, &expenses, today);
            BudgetWithStatus { budget, status }
        })
        .collect();

    Json(statuses).into_response()
}
