//! JSON endpoints for the expense collection.
//!
//! The list endpoint is where the filter and sort engines meet the wire:
//! query parameters are parsed leniently (malformed values degrade to "no
//! constraint" rather than an error) and applied to a single snapshot of the
//! expense table.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    analytics::{
        filter::{DateRange, ExpenseFilter, filter_expenses, parse_amount_bound},
        sort::{SortDirection, SortKey, sort_expenses},
    },
    database_id::ExpenseId,
    expense::{CategoryName, Expense, ExpensePatch, core},
    timezone::today,
};

/// The state needed for the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The draft record for creating an expense.
///
/// The description defaults to the empty string and the date defaults to
/// today.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExpense {
    /// The amount of money spent. Must be greater than zero.
    pub amount: f64,
    /// The category the expense belongs to. Must be non-empty.
    pub category: String,
    /// A text description of what the expense was for.
    #[serde(default)]
    pub description: String,
    /// The calendar date the money was spent.
    #[serde(default)]
    pub date: Option<Date>,
}

/// Filter and sort criteria for the expense list, as raw query text.
///
/// Numeric and enum parameters are kept as strings here so that malformed
/// values can be normalized to defaults instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListParams {
    /// Keep expenses in this category only.
    pub category: Option<String>,
    /// One of `all`, `week`, `month`, `year`.
    pub date_range: Option<String>,
    /// Inclusive lower bound on the amount.
    pub min_amount: Option<String>,
    /// Inclusive upper bound on the amount.
    pub max_amount: Option<String>,
    /// Case-insensitive substring to look for in descriptions and categories.
    pub search: Option<String>,
    /// The column to sort by: `date`, `amount`, `description` or `category`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub direction: Option<String>,
}

/// Handle GET requests for the (filtered, sorted) expense list.
pub async fn get_expenses_endpoint(
    State(state): State<ExpenseEndpointState>,
    Query(params): Query<ExpenseListParams>,
) -> Response {
    let expenses = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match core::list_expenses(&connection) {
            Ok(expenses) => expenses,
            Err(error) => return error.into_response(),
        }
    };

    let filter = ExpenseFilter {
        category: params.category,
        date_range: params
            .date_range
            .as_deref()
            .map(DateRange::from_query)
            .unwrap_or_default(),
        min_amount: params.min_amount.as_deref().and_then(parse_amount_bound),
        max_amount: params.max_amount.as_deref().and_then(parse_amount_bound),
        search_term: params.search,
    };
    let key = params
        .sort
        .as_deref()
        .map(SortKey::from_query)
        .unwrap_or_default();
    let direction = params
        .direction
        .as_deref()
        .map(SortDirection::from_query)
        .unwrap_or(SortDirection::Descending);

    let filtered = filter_expenses(&expenses, &filter, today());

    Json(sort_expenses(&filtered, key, direction)).into_response()
}

/// Handle POST requests that create an expense. Responds with 201 and the
/// created record.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Json(draft): Json<CreateExpense>,
) -> Response {
    let category = match CategoryName::new(&draft.category) {
        Ok(category) => category,
        Err(error) => return error.into_response(),
    };
    let date = draft.date.unwrap_or_else(today);
    let builder = Expense::build(draft.amount, category, date).description(&draft.description);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::create_expense(builder, &connection) {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle GET requests for a single expense by its ID.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::get_expense(expense_id, &connection) {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle PUT requests that apply a partial update to an expense.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Path(expense_id): Path<ExpenseId>,
    Json(patch): Json<ExpensePatch>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::update_expense(expense_id, patch, &connection) {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle DELETE requests for an expense. Responds with a confirmation body.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match core::delete_expense(expense_id, &connection) {
        Ok(()) => Json(json!({"message": "Expense deleted"})).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod expense_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{AppState, build_router, endpoints, expense::Expense};

    fn new_test_server() -> TestServer {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(db_connection).expect("Could not initialize database.");

        TestServer::new(build_router(state))
    }

    async fn create_expense(server: &TestServer, amount: f64, category: &str, date: &str) -> Expense {
        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "amount": amount,
                "category": category,
                "description": format!("{category} purchase"),
                "date": date,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        response.json::<Expense>()
    }

    #[tokio::test]
    async fn create_returns_created_record() {
        let server = new_test_server();

        let expense = create_expense(&server, 50.0, "Food", "2024-01-05").await;

        assert_eq!(expense.amount, 50.0);
        assert_eq!(expense.category.as_ref(), "Food");
        assert_eq!(expense.description, "Food purchase");
    }

    #[tokio::test]
    async fn create_rejects_non_positive_amount() {
        let server = new_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({"amount": 0.0, "category": "Food"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_empty_category() {
        let server = new_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({"amount": 10.0, "category": ""}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_returns_all_expenses() {
        let server = new_test_server();
        create_expense(&server, 50.0, "Food", "2024-01-05").await;
        create_expense(&server, 100.0, "Transport", "2024-01-10").await;

        let response = server.get(endpoints::EXPENSES).await;

        response.assert_status_ok();
        let expenses = response.json::<Vec<Expense>>();
        assert_eq!(expenses.len(), 2);
    }

    #[tokio::test]
    async fn list_applies_min_amount_filter() {
        let server = new_test_server();
        create_expense(&server, 50.0, "Food", "2024-01-05").await;
        create_expense(&server, 30.0, "Food", "2024-01-20").await;
        create_expense(&server, 100.0, "Transport", "2024-01-10").await;

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("min_amount", "40")
            .await;

        response.assert_status_ok();
        let expenses = response.json::<Vec<Expense>>();
        let amounts: Vec<f64> = expenses.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![100.0, 50.0]);
    }

    #[tokio::test]
    async fn list_ignores_malformed_amount_bound() {
        let server = new_test_server();
        create_expense(&server, 50.0, "Food", "2024-01-05").await;
        create_expense(&server, 30.0, "Food", "2024-01-20").await;

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("min_amount", "not-a-number")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Expense>>().len(), 2);
    }

    #[tokio::test]
    async fn list_sorts_by_amount_in_both_directions() {
        let server = new_test_server();
        create_expense(&server, 100.0, "Transport", "2024-01-10").await;
        create_expense(&server, 30.0, "Food", "2024-01-20").await;
        create_expense(&server, 50.0, "Food", "2024-01-05").await;

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("sort", "amount")
            .add_query_param("direction", "asc")
            .await;

        let amounts: Vec<f64> = response
            .json::<Vec<Expense>>()
            .iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![30.0, 50.0, 100.0]);

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("sort", "amount")
            .add_query_param("direction", "desc")
            .await;

        let amounts: Vec<f64> = response
            .json::<Vec<Expense>>()
            .iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![100.0, 50.0, 30.0]);
    }

    #[tokio::test]
    async fn list_applies_search_filter() {
        let server = new_test_server();
        create_expense(&server, 50.0, "Food", "2024-01-05").await;
        create_expense(&server, 100.0, "Transport", "2024-01-10").await;

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("search", "TRANSPORT")
            .await;

        let expenses = response.json::<Vec<Expense>>();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category.as_ref(), "Transport");
    }

    #[tokio::test]
    async fn get_by_id_round_trips() {
        let server = new_test_server();
        let created = create_expense(&server, 50.0, "Food", "2024-01-05").await;

        let response = server
            .get(&endpoints::format_endpoint(endpoints::EXPENSE, created.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Expense>(), created);
    }

    #[tokio::test]
    async fn get_missing_expense_is_not_found() {
        let server = new_test_server();

        let response = server
            .get(&endpoints::format_endpoint(endpoints::EXPENSE, 999))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_applies_partial_patch() {
        let server = new_test_server();
        let created = create_expense(&server, 50.0, "Food", "2024-01-05").await;

        let response = server
            .put(&endpoints::format_endpoint(endpoints::EXPENSE, created.id))
            .json(&json!({"amount": 75.0}))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Expense>();
        assert_eq!(updated.amount, 75.0);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.date, created.date);
    }

    #[tokio::test]
    async fn update_missing_expense_is_not_found() {
        let server = new_test_server();

        let response = server
            .put(&endpoints::format_endpoint(endpoints::EXPENSE, 999))
            .json(&json!({"amount": 75.0}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_confirms_and_removes() {
        let server = new_test_server();
        let created = create_expense(&server, 50.0, "Food", "2024-01-05").await;

        let response = server
            .delete(&endpoints::format_endpoint(endpoints::EXPENSE, created.id))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<serde_json::Value>()["message"],
            "Expense deleted"
        );

        let response = server
            .delete(&endpoints::format_endpoint(endpoints::EXPENSE, created.id))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
