//! Time entries as logged, and their cumulative sum over time

use chrono::{DateTime, FixedOffset, Utc};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// A single logged interval, as returned by the report
///
/// The duration is not validated: negative values are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub start: DateTime<FixedOffset>,
    /// seconds
    pub duration: f64,
}

impl TimeEntry {
    pub fn hours(&self) -> f64 {
        self.duration / SECONDS_PER_HOUR
    }
}

/// Total hours used up to and including the entry that started at `at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsagePoint {
    pub at: DateTime<FixedOffset>,
    pub hours: f64,
}

/// Running total of `entries`, in chronological order
///
/// The series always begins with a zero point at `window_start`, which also
/// comes first among entries that share its timestamp. Entries with equal
/// timestamps otherwise keep the order in which they were given.
pub fn cumulative_usage(entries: &[TimeEntry], window_start: DateTime<Utc>) -> Vec<UsagePoint> {
    let mut items = Vec::with_capacity(entries.len() + 1);
    items.push((window_start.fixed_offset(), 0.0));
    items.extend(entries.iter().map(|e| (e.start, e.hours())));
    // stable
    items.sort_by_key(|(at, _)| *at);
    let mut total = 0.0;
    items
        .into_iter()
        .map(|(at, hours)| {
            total += hours;
            UsagePoint { at, hours: total }
        })
        .collect()
}
