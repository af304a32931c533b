//! Display formatting for prices and dates.

use chrono::{DateTime, TimeZone, Utc};
use parfumerie_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

/// Format an amount in `currency`, e.g. `$89.50`.
#[must_use]
pub fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

/// Long-form date, e.g. `October 15, 2026`.
#[must_use]
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y").to_string()
}

/// Date and time, e.g. `October 15, 2026 at 14:05`.
#[must_use]
pub fn format_date_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y at %H:%M").to_string()
}

/// [`format_date`] for a millisecond Unix timestamp, as the backend sends.
///
/// Returns `None` for timestamps outside chrono's range.
#[must_use]
pub fn format_timestamp_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|date| format_date(&date))
}
