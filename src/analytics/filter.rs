//! Filtering of expense snapshots.
//!
//! A filter is a set of optional criteria combined with logical AND. Applying
//! a filter preserves the order of the input snapshot and never mutates it.

use time::{Date, Duration};

use crate::expense::Expense;

use super::period::{months_before, years_before};

/// The date window criterion of an [ExpenseFilter].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// No constraint.
    #[default]
    All,
    /// Expenses dated within the last 7 days.
    Week,
    /// Expenses dated within the last calendar month.
    Month,
    /// Expenses dated within the last calendar year.
    Year,
    /// Expenses dated on or after a fixed date.
    ///
    /// Used by the budget evaluator to window a snapshot to the current
    /// budget period.
    Since(Date),
}

impl DateRange {
    /// Parse a date range from a query parameter value.
    ///
    /// Unrecognized values impose no constraint rather than failing.
    pub fn from_query(value: &str) -> Self {
        match value {
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    /// The earliest date (inclusive) kept by this range, or `None` when the
    /// range imposes no constraint.
    pub fn cutoff(self, today: Date) -> Option<Date> {
        match self {
            Self::All => None,
            Self::Week => Some(today - Duration::days(7)),
            Self::Month => Some(months_before(today, 1)),
            Self::Year => Some(years_before(today, 1)),
            Self::Since(date) => Some(date),
        }
    }
}

/// A composable set of criteria for narrowing an expense snapshot.
///
/// Every criterion is optional; the default filter keeps everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseFilter {
    /// Keep expenses whose category matches exactly. An empty string imposes
    /// no constraint.
    pub category: Option<String>,
    /// Keep expenses dated on or after the range's cutoff.
    pub date_range: DateRange,
    /// Keep expenses with `amount >= min_amount`.
    pub min_amount: Option<f64>,
    /// Keep expenses with `amount <= max_amount`.
    pub max_amount: Option<f64>,
    /// Keep expenses whose description or category contains this text,
    /// case-insensitively.
    pub search_term: Option<String>,
}

/// Parse a numeric filter bound from untrusted query text.
///
/// Malformed or non-finite values are treated as "no constraint" rather than
/// raised as an error.
pub fn parse_amount_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Apply `filter` to a snapshot, returning the matching subset in its
/// original order.
pub fn filter_expenses(expenses: &[Expense], filter: &ExpenseFilter, today: Date) -> Vec<Expense> {
    let cutoff = filter.date_range.cutoff(today);
    let search_lower = filter
        .search_term
        .as_deref()
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);
    let category = filter.category.as_deref().filter(|name| !name.is_empty());

    expenses
        .iter()
        .filter(|expense| {
            if let Some(category) = category
                && expense.category.as_ref() != category
            {
                return false;
            }

            if let Some(cutoff) = cutoff
                && expense.date < cutoff
            {
                return false;
            }

            if let Some(min_amount) = filter.min_amount
                && expense.amount < min_amount
            {
                return false;
            }

            if let Some(max_amount) = filter.max_amount
                && expense.amount > max_amount
            {
                return false;
            }

            if let Some(ref term) = search_lower {
                let matches = expense.description.to_lowercase().contains(term)
                    || expense.category.as_ref().to_lowercase().contains(term);

                if !matches {
                    return false;
                }
            }

            true
        })
        .cloned()
        .collect()
}
