//! Hours purchased and used, month by month

use std::ops;

use crate::lib::{
    budget::MonthBudget,
    date::Date,
    usage::TimeEntry,
};

/// Inclusive range of days
pub type Period = (Date, Date);

/// Hours purchased and used over one period
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    period: Period,
    purchased: f64,
    used: f64,
}

impl Summary {
    pub fn new_period(period: Period, purchased: f64) -> Self {
        Self {
            period,
            purchased,
            used: 0.0,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn purchased(&self) -> f64 {
        self.purchased
    }

    pub fn used(&self) -> f64 {
        self.used
    }

    fn contains(&self, date: Date) -> bool {
        self.period.0 <= date && date <= self.period.1
    }
}

impl ops::AddAssign<&TimeEntry> for Summary {
    fn add_assign(&mut self, entry: &TimeEntry) {
        if self.contains(Date::of(&entry.start)) {
            self.used += entry.hours();
        }
    }
}

/// Running totals at the end of a period
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub summary: Summary,
    pub total_purchased: f64,
    pub total_used: f64,
}

impl Balance {
    /// Purchased hours not used yet, negative when overspent
    pub fn remaining(&self) -> f64 {
        self.total_purchased - self.total_used
    }
}

/// A collection of disjoint ordered summaries, one per budgeted month
#[derive(Debug)]
pub struct Calendar {
    items: Vec<Summary>,
}

impl Calendar {
    pub fn from_budget(months: &[MonthBudget], workday: f64) -> Self {
        let items = months
            .iter()
            .map(|m| {
                Summary::new_period(
                    (m.month.start_of_month(), m.month.end_of_month()),
                    m.hours(workday),
                )
            })
            .collect();
        Self { items }
    }

    /// Add every entry to the month it started in (UTC)
    ///
    /// Entries outside of all budgeted months are not counted.
    pub fn register(&mut self, entries: &[TimeEntry]) {
        for entry in entries {
            let date = Date::of(&entry.start);
            if let Some(sum) = self.items.iter_mut().find(|s| s.contains(date)) {
                *sum += entry;
            }
        }
    }

    pub fn contents(&self) -> &[Summary] {
        &self.items
    }

    pub fn balances(&self) -> Vec<Balance> {
        let mut total_purchased = 0.0;
        let mut total_used = 0.0;
        self.items
            .iter()
            .map(|sum| {
                total_purchased += sum.purchased;
                total_used += sum.used;
                Balance {
                    summary: sum.clone(),
                    total_purchased,
                    total_used,
                }
            })
            .collect()
    }
}
