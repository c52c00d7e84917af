//! Helpers for constructing in-memory expenses in engine tests.

use time::Date;

use crate::database_id::ExpenseId;

use super::{CategoryName, Expense};

/// Create an expense without touching the database.
///
/// The creation timestamp is derived from `date` so fixtures are
/// deterministic.
pub fn expense_fixture(
    id: ExpenseId,
    amount: f64,
    category: &str,
    description: &str,
    date: Date,
) -> Expense {
    Expense {
        id,
        amount,
        category: CategoryName::new_unchecked(category),
        description: description.to_string(),
        date,
        created_at: date.midnight().assume_utc(),
    }
}
