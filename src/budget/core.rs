//! Defines the core data model and database queries for budgets.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::BudgetId, expense::CategoryName};

// ============================================================================
// MODELS
// ============================================================================

/// The recurring cycle a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The budget resets at the start of each week (Sunday).
    Weekly,
    /// The budget resets on the first day of each calendar month.
    Monthly,
}

impl Period {
    /// The period as it is stored in the database and sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::InvalidPeriod(other.to_string())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending cap for a category over a recurring period.
///
/// A budget does not own expenses; the amount spent against it is derived at
/// query time from the expense snapshot (see [crate::budget::evaluate_budget]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the cap applies to, matched against expense categories by
    /// exact string equality.
    pub category: CategoryName,
    /// The spending cap. Greater than zero for well-formed budgets; a zero
    /// cap is tolerated by the evaluator with an explicit policy.
    pub amount: f64,
    /// The recurring cycle the cap applies to.
    pub period: Period,
}

/// A builder for creating [Budget] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct BudgetBuilder {
    /// The category the cap applies to.
    pub category: CategoryName,
    /// The spending cap. Must be greater than zero.
    pub amount: f64,
    /// The recurring cycle the cap applies to.
    pub period: Period,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [BudgetBuilder] for discoverability.
    pub fn build(category: CategoryName, amount: f64, period: Period) -> BudgetBuilder {
        BudgetBuilder {
            category,
            amount,
            period,
        }
    }
}

/// A partial update to a budget.
///
/// Fields left as `None` retain their prior value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    /// The new category, if changing.
    pub category: Option<String>,
    /// The new cap, if changing.
    pub amount: Option<f64>,
    /// The new period, if changing.
    pub period: Option<Period>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new budget in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the cap is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(builder: BudgetBuilder, connection: &Connection) -> Result<Budget, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let budget = connection
        .prepare(
            "INSERT INTO budget (category, amount, period)
             VALUES (?1, ?2, ?3)
             RETURNING id, category, amount, period",
        )?
        .query_one(
            (
                builder.category.as_ref(),
                builder.amount,
                builder.period.as_str(),
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve a budget from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare("SELECT id, category, amount, period FROM budget WHERE id = :id")?
        .query_one(&[(":id", &id)], map_budget_row)?;

    Ok(budget)
}

/// Retrieve all budgets in insertion order.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare("SELECT id, category, amount, period FROM budget ORDER BY id ASC")?
        .query_map([], map_budget_row)?
        .map(|budget_result| budget_result.map_err(Error::SqlError))
        .collect()
}

/// Apply a partial update to a budget, returning the updated record.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if `id` does not refer to a valid budget,
/// - [Error::NonPositiveAmount] or [Error::EmptyCategory] if the patched
///   record would be invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    patch: BudgetPatch,
    connection: &Connection,
) -> Result<Budget, Error> {
    let existing = get_budget(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        other => other,
    })?;

    let amount = patch.amount.unwrap_or(existing.amount);
    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    let category = match patch.category {
        Some(ref name) => CategoryName::new(name)?,
        None => existing.category,
    };
    let period = patch.period.unwrap_or(existing.period);

    let budget = connection
        .prepare(
            "UPDATE budget SET category = ?1, amount = ?2, period = ?3
             WHERE id = ?4
             RETURNING id, category, amount, period",
        )?
        .query_one((category.as_ref(), amount, period.as_str(), id), map_budget_row)?;

    Ok(budget)
}

/// Delete a budget from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingBudget)
    } else {
        Ok(())
    }
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                period TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('budget', 0)",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Budget.
fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let category: String = row.get(1)?;
    let amount = row.get(2)?;
    let period_text: String = row.get(3)?;

    let period = period_text.parse::<Period>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            error.to_string().into(),
        )
    })?;

    Ok(Budget {
        id,
        category: CategoryName::new_unchecked(&category),
        amount,
        period,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        budget::{
            Budget, BudgetPatch, Period, create_budget, delete_budget, get_budget, list_budgets,
            update_budget,
        },
        db::initialize,
        expense::CategoryName,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn food() -> CategoryName {
        CategoryName::new_unchecked("Food")
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let result = create_budget(Budget::build(food(), 100.0, Period::Monthly), &conn);

        match result {
            Ok(budget) => {
                assert_eq!(budget.category.as_ref(), "Food");
                assert_eq!(budget.amount, 100.0);
                assert_eq!(budget.period, Period::Monthly);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_budget(Budget::build(food(), 0.0, Period::Weekly), &conn);

        assert_eq!(result, Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn get_returns_created_budget() {
        let conn = get_test_connection();
        let created = create_budget(Budget::build(food(), 100.0, Period::Weekly), &conn)
            .expect("Could not create budget");

        let got = get_budget(created.id, &conn).expect("Could not get budget");

        assert_eq!(created, got);
    }

    #[test]
    fn list_returns_budgets_in_insertion_order() {
        let conn = get_test_connection();
        let first = create_budget(Budget::build(food(), 100.0, Period::Monthly), &conn)
            .expect("Could not create budget");
        let second = create_budget(
            Budget::build(CategoryName::new_unchecked("Transport"), 50.0, Period::Weekly),
            &conn,
        )
        .expect("Could not create budget");

        let got = list_budgets(&conn).expect("Could not list budgets");

        assert_eq!(got, vec![first, second]);
    }

    #[test]
    fn update_applies_partial_patch() {
        let conn = get_test_connection();
        let created = create_budget(Budget::build(food(), 100.0, Period::Monthly), &conn)
            .expect("Could not create budget");

        let updated = update_budget(
            created.id,
            BudgetPatch {
                period: Some(Period::Weekly),
                ..Default::default()
            },
            &conn,
        )
        .expect("Could not update budget");

        assert_eq!(updated.period, Period::Weekly);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.amount, created.amount);
    }

    #[test]
    fn update_missing_budget_fails() {
        let conn = get_test_connection();

        let result = update_budget(999, BudgetPatch::default(), &conn);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn delete_removes_budget() {
        let conn = get_test_connection();
        let created = create_budget(Budget::build(food(), 100.0, Period::Monthly), &conn)
            .expect("Could not create budget");

        delete_budget(created.id, &conn).expect("Could not delete budget");

        assert_eq!(get_budget(created.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_budget_fails() {
        let conn = get_test_connection();

        assert_eq!(delete_budget(999, &conn), Err(Error::DeleteMissingBudget));
    }

    #[test]
    fn invalid_period_text_fails_to_parse() {
        let result = "fortnightly".parse::<Period>();

        assert_eq!(
            result,
            Err(Error::InvalidPeriod("fortnightly".to_string()))
        );
    }
}
