//! Calendar period helpers for budget windows and chart buckets.
//!
//! Every function here is a pure function of the date arguments it is given.
//! Callers obtain "today" once (see [crate::today]) and pass it down, so two
//! calls with the same inputs always agree on period boundaries.

use time::{Date, Duration, Month};

use crate::budget::Period;

/// The granularity used to bucket expenses for chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One bucket per calendar date.
    Day,
    /// One bucket per calendar month.
    Month,
}

/// The time window applied to the expense snapshot before charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFrame {
    /// No constraint.
    #[default]
    All,
    /// The last 7 days.
    Week,
    /// The last calendar month.
    Month,
    /// The last three calendar months.
    Quarter,
    /// The last calendar year.
    Year,
}

impl TimeFrame {
    /// Parse a time frame from a query parameter value.
    ///
    /// Unrecognized values impose no constraint rather than failing, so a
    /// client sending garbage sees the all-time view.
    pub fn from_query(value: &str) -> Self {
        match value {
            "week" => Self::Week,
            "month" => Self::Month,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::All,
        }
    }

    /// The earliest date (inclusive) inside this time frame, or `None` for
    /// the all-time frame.
    pub fn cutoff(self, today: Date) -> Option<Date> {
        match self {
            Self::All => None,
            Self::Week => Some(today - Duration::days(7)),
            Self::Month => Some(months_before(today, 1)),
            Self::Quarter => Some(months_before(today, 3)),
            Self::Year => Some(years_before(today, 1)),
        }
    }
}

/// The first day of the current weekly or monthly budget cycle.
///
/// Weeks start on Sunday. Monthly periods start on the first day of the
/// calendar month containing `today`.
pub fn period_start(today: Date, period: Period) -> Date {
    match period {
        Period::Weekly => {
            let days_since_sunday = today.weekday().number_days_from_sunday() as i64;
            today - Duration::days(days_since_sunday)
        }
        Period::Monthly => today.replace_day(1).unwrap(),
    }
}

/// The chart label that groups `date` with other dates in the same period.
///
/// Day buckets use the ISO calendar date. Month buckets are qualified with
/// the year ("Jan 2024") so that the same month of different years never
/// merges into one bucket.
pub fn bucket_key(date: Date, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => date.to_string(),
        Granularity::Month => format!("{} {}", month_abbrev(date.month()), date.year()),
    }
}

/// The date `count` calendar months before `date`, with the day clamped to
/// the length of the target month (e.g. 31 Mar minus one month is 28 Feb or
/// 29 Feb in leap years).
pub(crate) fn months_before(date: Date, count: i32) -> Date {
    let total_months = date.year() * 12 + month_number(date.month()) as i32 - 1 - count;
    let year = total_months.div_euclid(12);
    let month = month_from_number((total_months.rem_euclid(12) + 1) as u8);
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("invalid clamped calendar date")
}

/// The date `count` calendar years before `date`, clamping 29 Feb to 28 Feb
/// in non-leap years.
pub(crate) fn years_before(date: Date, count: i32) -> Date {
    let year = date.year() - count;
    let day = date.day().min(last_day_of_month(year, date.month()));

    Date::from_calendar_date(year, date.month(), day).expect("invalid clamped calendar date")
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn month_number(month: Month) -> u8 {
    match month {
        Month::January => 1,
        Month::February => 2,
        Month::March => 3,
        Month::April => 4,
        Month::May => 5,
        Month::June => 6,
        Month::July => 7,
        Month::August => 8,
        Month::September => 9,
        Month::October => 10,
        Month::November => 11,
        Month::December => 12,
    }
}

fn month_from_number(month: u8) -> Month {
    match month {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => panic!("invalid month number {month}"),
    }
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
