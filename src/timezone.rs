//! The single place where "now" enters the application.
//!
//! The analytics engine is pure and takes a date argument everywhere, so the
//! route handlers call [today] exactly once per request and pass the result
//! down.

use time::{Date, OffsetDateTime};

/// Today's date in the local calendar of the running process.
///
/// Falls back to the UTC calendar when the local offset cannot be determined,
/// which can happen in multi-threaded processes on some Unix platforms.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
