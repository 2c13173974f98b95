//! Day-precise calendar arithmetic, with a focus on edge cases
//!
//! Dates are `YYYY-Mmm-DD`, not number of seconds. Budgets are expressed
//! per calendar month, so the interesting operations are month boundaries
//! (see `start_of_month` and `end_of_month`) and jumping from one month to
//! the next. Conversion to and from timestamps goes through UTC.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

/// A date with day-precision
///
/// Supports years in the range 1000..=9999.
///
/// All methods execute in constant time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:02}", self.year, self.month, self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, PartialOrd, Ord)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Parse a month from its stringified name (`"Jan"`, `"Feb"`, `"Mar"`, ...)
    ///
    /// # Panics
    ///
    /// This function will panic if the string is not a valid 3-character month name.
    ///
    /// It is meant to translate text matched by the grammar, not validate arbitrary
    /// user input.
    pub fn from(s: &str) -> Self {
        use Month::*;
        match s {
            "Jan" => Jan,
            "Feb" => Feb,
            "Mar" => Mar,
            "Apr" => Apr,
            "May" => May,
            "Jun" => Jun,
            "Jul" => Jul,
            "Aug" => Aug,
            "Sep" => Sep,
            "Oct" => Oct,
            "Nov" => Nov,
            "Dec" => Dec,
            _ => unreachable!(),
        }
    }

    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_isize((self as isize + 1) % 12).expect("index reduced modulo 12")
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => if is_leap(year) { 29 } else { 28 },
        }
    }

    /// 1-based number of the month (`Jan` is 1)
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(usize),
    /// Feb 29 of a non-leap year
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(usize, Month, usize),
    /// day outside of 1..=31
    InvalidDay(usize),
}

impl Date {
    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self { year: year as u16, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(year, month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// Calendar day (in UTC) on which the instant `dt` falls
    pub fn of<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let utc = dt.with_timezone(&Utc);
        Self {
            year: utc.year() as u16,
            month: Month::from_u32(utc.month0()).expect("chrono months are 0..12"),
            day: utc.day() as u8,
        }
    }

    /// `self.day` accessor
    pub fn day(&self) -> u8 {
        self.day
    }

    /// `self.month` accessor
    pub fn month(&self) -> Month {
        self.month
    }

    /// `self.year` accessor
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d`,
    ///
    ///     assert_eq!(d.index() + 1, d.next().index());
    pub fn index(self) -> usize {
        let leaps = {
            let years = if self.month <= Month::Feb {
                self.year as usize - 1
            } else {
                self.year as usize
            };
            // count leap years before current
            (years / 4) - (years / 100) + (years / 400)
        };
        let mut n = self.year as usize * 365 + self.day as usize;
        // partially elapsed current year
        n += [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334][self.month as usize];
        n += leaps; // each leap year adds one day
        n
    }

    /// Seconds since the Unix epoch at midnight UTC of this date
    pub fn timestamp(self) -> i64 {
        let epoch = Self { year: 1970, month: Month::Jan, day: 1 };
        (self.index() as i64 - epoch.index() as i64) * SECONDS_PER_DAY
    }

    /// Midnight UTC at the start of this date
    pub fn midnight(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp(), 0)
            .single()
            .expect("supported years are representable")
    }

    /// Last second (23:59:59 UTC) of this date
    pub fn last_second(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp() + SECONDS_PER_DAY - 1, 0)
            .single()
            .expect("supported years are representable")
    }

    pub fn next(self) -> Self {
        if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                Self { year: self.year + 1, month: Month::Jan, day: 1 }
            } else {
                Self { month: self.month.next(), day: 1, ..self }
            }
        } else {
            Self { day: self.day + 1, ..self }
        }
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-Jan-31` makes it `2000-Feb-29`
    pub fn jump_month(self, count: isize) -> Self {
        let (year, month) = {
            let mut year = self.year as isize;
            let mut month = self.month as isize + count;
            while month < 0 {
                month += 12;
                year -= 1;
            }
            while month >= 12 {
                month -= 12;
                year += 1;
            }
            (year as u16, Month::from_isize(month).expect("index reduced modulo 12"))
        };
        Self {
            year,
            month,
            day: self.day.min(month.count(year)),
        }
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        Self { day: 1, ..self }
    }

    /// Get date of the last day of the current month
    pub fn end_of_month(self) -> Self {
        Self { day: self.month.count(self.year), ..self }
    }

    /// First days of all months that start in `self..=end`
    pub fn month_starts(self, end: Date) -> impl Iterator<Item = Date> {
        let first = if self.day == 1 {
            self
        } else {
            self.start_of_month().jump_month(1)
        };
        std::iter::successors(Some(first), |d| Some(d.jump_month(1)))
            .take_while(move |d| *d <= end)
    }

    /// `DD/MM/YYYY`, as used on chart axes
    pub fn dmy(self) -> String {
        format!("{:02}/{:02}/{}", self.day, self.month.number(), self.year)
    }
}

const SECONDS_PER_DAY: i64 = 86_400;

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(_, m, d) => write!(
                f,
                "{} is a short month, it does not have a {}th day",
                m, d,
            ),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(self) -> String {
        use DateError::*;
        match self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            NotBissextile(y) => format!("did you mean {y}-Feb-28 or {y}-Mar-01 ?", y = y),
            MonthTooShort(y, m, _) => format!("{} {} is only {} days long", m, y, m.count(y as u16)),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
        }
    }
}
