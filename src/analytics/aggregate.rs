//! Pure reductions over expense snapshots for summary cards and charts.

use std::collections::HashMap;

use serde::Serialize;

use crate::expense::Expense;

use super::period::{Granularity, bucket_key};

/// Summary statistics over an expense snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all amounts.
    pub total: f64,
    /// The mean amount, or zero over an empty snapshot.
    pub average: f64,
    /// The largest single amount, or zero over an empty snapshot.
    pub max: f64,
}

/// Sum expense amounts per category.
pub fn totals_by_category(expenses: &[Expense]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for expense in expenses {
        *totals
            .entry(expense.category.as_ref().to_string())
            .or_insert(0.0) += expense.amount;
    }

    totals
}

/// Sum expense amounts per calendar bucket, in chronological order.
///
/// The snapshot is date-sorted ascending before bucketing, so the returned
/// series is suitable for a chart x-axis as-is.
pub fn totals_by_bucket(expenses: &[Expense], granularity: Granularity) -> Vec<(String, f64)> {
    let mut by_date: Vec<&Expense> = expenses.iter().collect();
    by_date.sort_by_key(|expense| expense.date);

    let mut series: Vec<(String, f64)> = Vec::new();

    for expense in by_date {
        let key = bucket_key(expense.date, granularity);

        // Chronological input makes equal buckets contiguous.
        match series.last_mut() {
            Some((last_key, total)) if *last_key == key => *total += expense.amount,
            _ => series.push((key, expense.amount)),
        }
    }

    series
}

/// Compute [Summary] statistics in a single pass.
///
/// An empty snapshot yields all zeroes rather than an error. No intermediate
/// rounding is performed; rounding for currency display is a presentation
/// concern.
pub fn summarize(expenses: &[Expense]) -> Summary {
    let mut total = 0.0;
    let mut max = 0.0f64;

    for expense in expenses {
        total += expense.amount;
        max = max.max(expense.amount);
    }

    let average = if expenses.is_empty() {
        0.0
    } else {
        total / expenses.len() as f64
    };

    Summary {
        total,
        average,
        max,
    }
}
