//! Daily ledger aggregation.
//!
//! Every tracked collection (food, exercise, weight, water) is a list of
//! timestamped entries. The functions here bucket those entries by calendar
//! day in the observer's zone and derive the totals, lookups and weekly series
//! the dashboard renders. Nothing here touches storage.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Number of buckets in a week-view chart.
pub const WEEK: usize = 7;

/// A record logged by the user at a point in time.
pub trait DatedEntry {
    type Id: Copy;

    fn id(&self) -> Self::Id;
    fn recorded_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: &'static str, min: f64 },
}

pub fn finite(field: &'static str, value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LedgerError::NotFinite { field })
    }
}

pub fn non_negative(field: &'static str, value: f64) -> Result<f64, LedgerError> {
    match finite(field, value)? {
        v if v < 0.0 => Err(LedgerError::Negative { field }),
        v => Ok(v),
    }
}

pub fn positive(field: &'static str, value: f64) -> Result<f64, LedgerError> {
    match finite(field, value)? {
        v if v <= 0.0 => Err(LedgerError::NotPositive { field }),
        v => Ok(v),
    }
}

pub fn at_least(field: &'static str, value: f64, min: f64) -> Result<f64, LedgerError> {
    match finite(field, value)? {
        v if v < min => Err(LedgerError::BelowMinimum { field, min }),
        v => Ok(v),
    }
}

/// Truncates a timestamp to the calendar day it falls on in `zone`.
pub fn calendar_day<Tz: TimeZone>(at: DateTime<Utc>, zone: &Tz) -> NaiveDate {
    at.with_timezone(zone).date_naive()
}

/// UTC instants `[start, end)` covering `day` in `zone`, or `None` at the
/// edge of the calendar.
pub fn day_bounds<Tz: TimeZone>(
    day: NaiveDate,
    zone: &Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_midnight(day, zone);
    let end = local_midnight(day.succ_opt()?, zone);
    Some((start, end))
}

/// Whether a week ending on `day` can be bucketed in any zone.
///
/// Keeps a day of slack on each side so that shifting a boundary by a UTC
/// offset stays inside chrono's calendar.
pub fn within_calendar(day: NaiveDate) -> bool {
    day.checked_sub_days(Days::new(WEEK as u64)).is_some()
        && day.checked_add_days(Days::new(2)).is_some()
}

fn local_midnight<Tz: TimeZone>(day: NaiveDate, zone: &Tz) -> DateTime<Utc> {
    let midnight = NaiveDateTime::new(day, NaiveTime::MIN);
    // A DST gap can swallow midnight; fall back to treating it as UTC.
    zone.from_local_datetime(&midnight)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Total of `field` across `entries`. Empty input yields 0.
pub fn sum<'a, E, I, F>(entries: I, field: F) -> f64
where
    E: 'a,
    I: IntoIterator<Item = &'a E>,
    F: Fn(&E) -> f64,
{
    entries.into_iter().fold(0.0, |acc, e| acc + field(e))
}

/// First entry recorded on `day`.
pub fn find_for_day<'a, E, Tz>(entries: &'a [E], day: NaiveDate, zone: &Tz) -> Option<&'a E>
where
    E: DatedEntry,
    Tz: TimeZone,
{
    entries
        .iter()
        .find(|e| calendar_day(e.recorded_at(), zone) == day)
}

/// All entries recorded on `day`, in input order.
pub fn entries_for_day<'a, E, Tz>(
    entries: &'a [E],
    day: NaiveDate,
    zone: &'a Tz,
) -> impl Iterator<Item = &'a E> + 'a
where
    E: DatedEntry,
    Tz: TimeZone,
{
    entries
        .iter()
        .filter(move |e| calendar_day(e.recorded_at(), zone) == day)
}

/// Most recently recorded entry. Ties go to the later position.
pub fn latest<E: DatedEntry>(entries: &[E]) -> Option<&E> {
    entries.iter().max_by_key(|e| e.recorded_at())
}

/// Most recent entry recorded strictly before `cutoff`.
pub fn latest_before<E: DatedEntry>(entries: &[E], cutoff: DateTime<Utc>) -> Option<&E> {
    entries
        .iter()
        .filter(|e| e.recorded_at() < cutoff)
        .max_by_key(|e| e.recorded_at())
}

/// The write a per-day collection needs after a submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Upsert<Id> {
    Create { value: f64 },
    Update { id: Id, value: f64 },
}

impl<Id> Upsert<Id> {
    pub fn value(&self) -> f64 {
        match self {
            Upsert::Create { value } | Upsert::Update { value, .. } => *value,
        }
    }
}

/// Decides whether `value` updates the entry already recorded on `day`
/// (merged through `combine(existing, value)`) or starts a new one.
pub fn upsert_for_day<E, Tz, F, C>(
    entries: &[E],
    day: NaiveDate,
    zone: &Tz,
    value: f64,
    field: F,
    combine: C,
) -> Upsert<E::Id>
where
    E: DatedEntry,
    Tz: TimeZone,
    F: Fn(&E) -> f64,
    C: FnOnce(f64, f64) -> f64,
{
    match find_for_day(entries, day, zone) {
        Some(existing) => Upsert::Update {
            id: existing.id(),
            value: combine(field(existing), value),
        },
        None => Upsert::Create { value },
    }
}

/// Running total that never drops below zero. Used for water.
pub fn accumulate_clamped(existing: f64, delta: f64) -> f64 {
    (existing + delta).max(0.0)
}

/// Latest submission wins. Used for weight.
pub fn replace(_existing: f64, incoming: f64) -> f64 {
    incoming
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub amount: f64,
}

/// One bucket per day for the `window_size` days ending at `reference_day`,
/// oldest first. Days without an entry read as 0. Days before the start of
/// the calendar are left out.
pub fn build_weekly_series<E, Tz, F>(
    entries: &[E],
    reference_day: NaiveDate,
    window_size: usize,
    zone: &Tz,
    field: F,
) -> Vec<DayBucket>
where
    E: DatedEntry,
    Tz: TimeZone,
    F: Fn(&E) -> f64,
{
    (0..window_size)
        .rev()
        .filter_map(|back| {
            let day = reference_day.checked_sub_days(Days::new(back as u64))?;
            let amount = find_for_day(entries, day, zone).map(&field).unwrap_or(0.0);
            Some(DayBucket { day, amount })
        })
        .collect()
}
