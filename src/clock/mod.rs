//! Simulated time

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

use crate::error::{BacktestError, Result};

///The frequency at which dates are generated.
#[derive(Clone, Debug)]
pub enum Frequency {
    Second,
    Daily,
}

///[DateTime] is a wrapper around the epoch time as i64. The calendar accessors go through the
///time package, which stays hidden from clients.
//Rows in the portfolio are keyed by year/month/day so these are the only calendar fields exposed.
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Copy, Ord, Serialize, Deserialize)]
pub struct DateTime(i64);

impl DateTime {
    const SECS_IN_DAY: i64 = 86_400;

    fn as_offset(&self) -> OffsetDateTime {
        //Epoch seconds outside the range of time are clamped to the epoch rather than panicking,
        //values produced by the feed are always in range
        OffsetDateTime::from_unix_timestamp(self.0).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    pub fn year(&self) -> i32 {
        self.as_offset().year()
    }

    pub fn month(&self) -> u8 {
        self.as_offset().month().into()
    }

    pub fn day(&self) -> u8 {
        self.as_offset().day()
    }

    ///Builds a timestamp at 09:00 UTC on the given calendar day.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self> {
        let month = Month::try_from(month).map_err(|_| BacktestError::InvalidDate(year, month, day))?;
        let date = Date::from_calendar_date(year, month, day)
            .map_err(|_| BacktestError::InvalidDate(year, month.into(), day))?;
        let datetime = date.with_time(time::macros::time!(9:00));
        Ok(Self::from(datetime.assume_utc().unix_timestamp()))
    }

    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + days * Self::SECS_IN_DAY)
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl Deref for DateTime {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime> for i64 {
    fn from(v: DateTime) -> Self {
        v.0
    }
}

impl From<i64> for DateTime {
    fn from(v: i64) -> Self {
        DateTime(v)
    }
}

/// Generates the sequence of dates used to lay out a price history.
///
/// Runs for the length given + 1 period, so a length of three days produces four dates.
pub struct DateRangeBuilder {
    start: DateTime,
    end: DateTime,
}

impl DateRangeBuilder {
    pub fn with_length_in_days(start: impl Into<DateTime>, length_in_days: i64) -> Self {
        let start = start.into();
        Self {
            start,
            end: start.add_days(length_in_days),
        }
    }

    pub fn with_length_in_seconds(start: impl Into<DateTime>, length_in_seconds: i64) -> Self {
        let start = start.into();
        Self {
            start,
            end: DateTime::from(*start + length_in_seconds),
        }
    }

    pub fn build(&self, freq: &Frequency) -> Vec<DateTime> {
        let step = match freq {
            Frequency::Daily => DateTime::SECS_IN_DAY,
            Frequency::Second => 1,
        };
        (i64::from(self.start)..i64::from(self.end) + step)
            .step_by(step as usize)
            .map(DateTime::from)
            .collect()
    }
}
