//! Defines the core data model and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::ExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-empty category label (e.g., 'Food', 'Transport').
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategory] if `name` is an
    /// empty string or consists only of whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single spending event.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent, a currency-agnostic magnitude greater than
    /// zero.
    pub amount: f64,
    /// The category the expense belongs to.
    pub category: CategoryName,
    /// A text description of what the expense was for. May be empty.
    pub description: String,
    /// The calendar date the money was spent. Time of day is not significant.
    pub date: Date,
    /// When the record was created. Set once, never mutated.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: f64, category: CategoryName, date: Date) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            category,
            date,
            description: String::new(),
        }
    }
}

/// A builder for creating [Expense] instances.
///
/// The description defaults to the empty string. Pass the builder to
/// [create_expense] to validate it and insert the record.
#[derive(Debug, PartialEq, Clone)]
pub struct ExpenseBuilder {
    /// The amount of money spent. Must be greater than zero.
    pub amount: f64,
    /// The category the expense belongs to.
    pub category: CategoryName,
    /// The calendar date the money was spent.
    pub date: Date,
    /// A text description of what the expense was for.
    pub description: String,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// A partial update to an expense.
///
/// Fields left as `None` retain their prior value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    /// The new amount, if changing.
    pub amount: Option<f64>,
    /// The new category, if changing.
    pub category: Option<String>,
    /// The new description, if changing.
    pub description: Option<String>,
    /// The new date, if changing.
    pub date: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense in the database from a builder.
///
/// The record-creation timestamp is set here and is never updated afterwards.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(builder: ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(builder.amount));
    }

    let created_at = OffsetDateTime::now_utc();

    let expense = connection
        .prepare(
            "INSERT INTO expense (amount, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, category, description, date, created_at",
        )?
        .query_one(
            (
                builder.amount,
                builder.category.as_ref(),
                builder.description,
                builder.date,
                created_at,
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, amount, category, description, date, created_at
             FROM expense WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve the full expense snapshot in insertion order.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, description, date, created_at
             FROM expense ORDER BY id ASC",
        )?
        .query_map([], map_expense_row)?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}

/// Apply a partial update to an expense, returning the updated record.
///
/// Fields left unset in `patch` retain their prior value. The creation
/// timestamp is never changed.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if `id` does not refer to a valid expense,
/// - [Error::NonPositiveAmount] or [Error::EmptyCategory] if the patched
///   record would be invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    patch: ExpensePatch,
    connection: &Connection,
) -> Result<Expense, Error> {
    let existing = get_expense(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingExpense,
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
    let description = patch.description.unwrap_or(existing.description);
    let date = patch.date.unwrap_or(existing.date);

    let expense = connection
        .prepare(
            "UPDATE expense
             SET amount = ?1, category = ?2, description = ?3, date = ?4
             WHERE id = ?5
             RETURNING id, amount, category, description, date, created_at",
        )?
        .query_one(
            (amount, category.as_ref(), description, date, id),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Delete an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        Err(Error::DeleteMissingExpense)
    } else {
        Ok(())
    }
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('expense', 0)",
        (),
    )?;

    // Composite index used by the analytics and budget status endpoints.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date_category ON expense(date, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Expense.
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let category: String = row.get(2)?;
    let description = row.get(3)?;
    let date = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Expense {
        id,
        amount,
        category: CategoryName::new_unchecked(&category),
        description,
        date,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn rejects_empty_and_whitespace_names() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategory));
        assert_eq!(CategoryName::new("   "), Err(Error::EmptyCategory));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let name = CategoryName::new("  Food  ").unwrap();

        assert_eq!(name.as_ref(), "Food");
    }
}
