//! Stable, type-aware ordering of expense snapshots.

use std::cmp::Ordering;

use crate::expense::Expense;

/// The expense field to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Order by calendar date.
    #[default]
    Date,
    /// Order numerically by amount.
    Amount,
    /// Order by description text.
    Description,
    /// Order by category text.
    Category,
}

impl SortKey {
    /// Parse a sort key from a query parameter value, defaulting to the date
    /// column for unrecognized values.
    pub fn from_query(value: &str) -> Self {
        match value {
            "amount" => Self::Amount,
            "description" => Self::Description,
            "category" => Self::Category,
            _ => Self::Date,
        }
    }
}

/// The direction to sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

impl SortDirection {
    /// Parse a sort direction from a query parameter value, defaulting to
    /// descending (newest/largest first) for unrecognized values.
    pub fn from_query(value: &str) -> Self {
        match value {
            "asc" => Self::Ascending,
            _ => Self::Descending,
        }
    }
}

/// The active sort column and direction of an expense table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    /// The column the table is ordered by.
    pub key: SortKey,
    /// The direction the column is ordered in.
    pub direction: SortDirection,
}

impl Default for SortConfig {
    /// Newest expenses first, matching the initial table view.
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortConfig {
    /// The configuration after the user selects `key`.
    ///
    /// Selecting the current key flips the direction; selecting a different
    /// key resets to ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        Self { key, direction }
    }
}

/// Return a stably ordered copy of a snapshot.
///
/// The comparator is total for every key: amounts compare via
/// [f64::total_cmp] and text compares case-insensitively with a byte-order
/// tiebreak. Records equal under the key keep their relative input order in
/// both directions.
pub fn sort_expenses(expenses: &[Expense], key: SortKey, direction: SortDirection) -> Vec<Expense> {
    let mut sorted = expenses.to_vec();

    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Amount => a.amount.total_cmp(&b.amount),
            SortKey::Description => compare_text(&a.description, &b.description),
            SortKey::Category => compare_text(a.category.as_ref(), b.category.as_ref()),
        };

        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    sorted
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
