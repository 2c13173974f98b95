//! Everything the report needs to know, loaded once at startup

use chrono::{DateTime, Utc};

use crate::lib::{budget::MonthBudget, date::Date};

pub const DEFAULT_WORKDAY: f64 = 8.0;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const DEFAULT_TITLE: &str = "Hours Used";

/// Inclusive range of days covered by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub first: Date,
    pub last: Date,
}

impl Window {
    /// Midnight UTC of the first day
    pub fn start(&self) -> DateTime<Utc> {
        self.first.midnight()
    }

    /// Last second of the last day
    pub fn end(&self) -> DateTime<Utc> {
        self.last.last_second()
    }
}

/// Contents of a plan file
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub workspace: String,
    pub project: String,
    pub title: String,
    pub window: Window,
    /// hours in a work day
    pub workday: f64,
    pub page_size: usize,
    /// in increasing order, at most one per month
    pub months: Vec<MonthBudget>,
}

impl Plan {
    /// Total hours purchased over the whole plan
    pub fn purchased_hours(&self) -> f64 {
        self.months.iter().map(|m| m.hours(self.workday)).sum()
    }
}
