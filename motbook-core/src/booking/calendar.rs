//! Which calendar dates can be booked.

use std::collections::BTreeSet;

use time::{Date, OffsetDateTime, Weekday};

/// Today's date, used as the earliest bookable day.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// The test centre is closed on Sundays and Mondays.
pub fn is_open_day(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Sunday | Weekday::Monday)
}

/// A date is selectable when it is not in the past, falls on an open day
/// and has not been disabled.
pub fn is_selectable(date: Date, today: Date, disabled: &BTreeSet<Date>) -> bool {
    date >= today && is_open_day(date) && !disabled.contains(&date)
}

/// Every selectable date of the given month.
pub fn selectable_days(
    year: i32,
    month: time::Month,
    today: Date,
    disabled: &BTreeSet<Date>,
) -> Vec<Date> {
    let Ok(first) = Date::from_calendar_date(year, month, 1) else {
        return Vec::new();
    };
    std::iter::successors(Some(first), |d| d.next_day())
        .take_while(|d| d.month() == month)
        .filter(|d| is_selectable(*d, today, disabled))
        .collect()
}
