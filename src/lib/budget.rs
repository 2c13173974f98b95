//! Expected consumption of the purchased days

use crate::lib::date::Date;

/// Days purchased for one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthBudget {
    /// any day of the month, normalized to its first day by the loader
    pub month: Date,
    pub days: f64,
}

impl MonthBudget {
    pub fn hours(&self, hours_per_day: f64) -> f64 {
        self.days * hours_per_day
    }
}

/// Hours that should have been used by the end of `date`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetPoint {
    pub date: Date,
    pub hours: f64,
}

/// Cumulative expected hours, anchored at the last day of each month
///
/// `months` is assumed to be in increasing order. The series starts with a
/// zero point on the first day of the first month.
pub fn project_budget(months: &[MonthBudget], hours_per_day: f64) -> Vec<BudgetPoint> {
    let Some(first) = months.first() else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(months.len() + 1);
    points.push(BudgetPoint { date: first.month.start_of_month(), hours: 0.0 });
    let mut total = 0.0;
    for m in months {
        total += m.hours(hours_per_day);
        points.push(BudgetPoint { date: m.month.end_of_month(), hours: total });
    }
    points
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::date::Month::{self, *};
    use pretty_assertions::assert_eq;

    fn month(year: usize, month: Month, days: f64) -> MonthBudget {
        MonthBudget { month: Date::from(year, month, 1).unwrap(), days }
    }

    fn date(year: usize, month: Month, day: usize) -> Date {
        Date::from(year, month, day).unwrap()
    }

    #[test]
    fn two_months() {
        let points = project_budget(&[month(2023, Dec, 7.0), month(2024, Jan, 7.0)], 8.0);
        assert_eq!(
            points,
            vec![
                BudgetPoint { date: date(2023, Dec, 1), hours: 0.0 },
                BudgetPoint { date: date(2023, Dec, 31), hours: 56.0 },
                BudgetPoint { date: date(2024, Jan, 31), hours: 112.0 },
            ]
        );
    }

    #[test]
    fn february_anchor() {
        let leap = project_budget(&[month(2024, Feb, 1.0)], 8.0);
        assert_eq!(leap[1].date, date(2024, Feb, 29));
        let common = project_budget(&[month(2023, Feb, 1.0)], 8.0);
        assert_eq!(common[1].date, date(2023, Feb, 28));
        let century = project_budget(&[month(2100, Feb, 1.0)], 8.0);
        assert_eq!(century[1].date, date(2100, Feb, 28));
    }

    #[test]
    fn full_contract_year() {
        let table = [
            month(2023, Dec, 7.0),
            month(2024, Jan, 7.0),
            month(2024, Feb, 7.0),
            month(2024, Mar, 6.0),
            month(2024, Apr, 5.0),
            month(2024, May, 5.0),
            month(2024, Jun, 5.0),
            month(2024, Jul, 5.0),
            month(2024, Aug, 5.0),
            month(2024, Sep, 5.0),
            month(2024, Oct, 5.0),
            month(2024, Nov, 5.0),
        ];
        let points = project_budget(&table, 8.0);
        assert_eq!(points.len(), 13);
        let anchors = points[1..].iter().map(|p| p.date.day()).collect::<Vec<_>>();
        assert_eq!(anchors, vec![31, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30]);
        assert_eq!(points.last().unwrap().hours, 67.0 * 8.0);
        for w in points.windows(2) {
            assert!(w[0].date < w[1].date);
            assert!(w[0].hours <= w[1].hours);
        }
    }

    #[test]
    fn fractional_days() {
        let points = project_budget(&[month(2024, Apr, 2.5)], 7.5);
        assert_eq!(points[1].hours, 18.75);
    }

    #[test]
    fn empty_table() {
        assert_eq!(project_budget(&[], 8.0), vec![]);
    }
}
