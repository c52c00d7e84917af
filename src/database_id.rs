//! Integer identifiers assigned by the database.
//!
//! Identifiers are opaque to clients; the only guarantee is that the store
//! assigns them monotonically on creation and never reuses them.

/// A row ID assigned by SQLite on insertion.
pub type DatabaseId = i64;

/// The ID of an expense record.
pub type ExpenseId = DatabaseId;

/// The ID of a budget record.
pub type BudgetId = DatabaseId;
