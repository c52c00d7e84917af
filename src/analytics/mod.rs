//! Derived views over the expense snapshot.
//!
//! Everything here is computed on demand from plain slices of expenses;
//! nothing is cached or persisted. Filtering, sorting, bucketing and
//! aggregation are pure functions so they compose freely (the budget
//! evaluator reuses the filter and the summary).

mod aggregate;
pub mod filter;
mod handlers;
pub mod period;
pub mod sort;

pub use aggregate::{Summary, summarize, totals_by_bucket, totals_by_category};
pub use handlers::{
    AnalyticsEndpointState, BucketTotal, CategoryTotal, get_category_totals_endpoint,
    get_day_totals_endpoint, get_month_totals_endpoint, get_summary_endpoint,
};
pub use period::{Granularity, TimeFrame, bucket_key, period_start};
