//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, budget::create_budget_table, expense::create_expense_table};

/// Create the tables for the domain models if they do not already exist.
///
/// All tables are created within a single exclusive transaction so that a
/// concurrent process cannot observe a partially initialized schema.
///
/// # Errors
/// Returns an error if a table cannot be created or there is some other SQL
/// error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
