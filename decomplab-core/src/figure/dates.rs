//! Date axis support: date numbers, an automatic locator/formatter and a
//! month locator for day-of-year plots.
//!
//! Date numbers are fractional days since 1970-01-01T00:00.
//!
//! The automatic locator never spaces ticks at non-integer multiples of a
//! unit: ticks sit on unit boundaries (Jan 1, the 1st of a month, midnight,
//! ...) starting at the first boundary inside the data range and stepping by
//! a whole interval. Tick positions are not snapped to multiples of the
//! interval.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::Tick;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// Safety cap on generated ticks.
const MAX_TICKS: usize = 1000;
/// Fewest ticks the automatic locator accepts before trying a finer unit.
const MIN_TICKS: f64 = 5.0;

fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

/// Timestamp → fractional days since the epoch.
pub fn date2num(dt: NaiveDateTime) -> f64 {
    (dt - epoch()).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Fractional days since the epoch → timestamp (millisecond precision).
pub fn num2date(x: f64) -> NaiveDateTime {
    epoch() + Duration::milliseconds((x * MILLIS_PER_DAY).round() as i64)
}

/// Tick unit chosen by the automatic locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl DateUnit {
    const ALL: [DateUnit; 5] = [
        DateUnit::Year,
        DateUnit::Month,
        DateUnit::Day,
        DateUnit::Hour,
        DateUnit::Minute,
    ];

    fn approx_days(&self) -> f64 {
        match self {
            DateUnit::Year => 365.25,
            DateUnit::Month => 30.4375,
            DateUnit::Day => 1.0,
            DateUnit::Hour => 1.0 / 24.0,
            DateUnit::Minute => 1.0 / 1440.0,
        }
    }

    fn intervals(&self) -> &'static [u32] {
        match self {
            DateUnit::Year => &[
                1, 2, 4, 5, 10, 20, 40, 50, 100, 200, 400, 500, 1000, 2000, 4000, 5000, 10000,
            ],
            DateUnit::Month => &[1, 2, 3, 4, 6],
            DateUnit::Day => &[1, 2, 3, 7, 14, 21],
            DateUnit::Hour => &[1, 2, 3, 4, 6, 12],
            DateUnit::Minute => &[1, 5, 10, 15, 30],
        }
    }

    fn max_ticks(&self) -> f64 {
        match self {
            DateUnit::Year => 11.0,
            DateUnit::Month => 12.0,
            DateUnit::Day => 11.0,
            DateUnit::Hour => 12.0,
            DateUnit::Minute => 11.0,
        }
    }

    /// `strftime` pattern used for tick labels at this unit.
    pub fn format(&self) -> &'static str {
        match self {
            DateUnit::Year => "%Y",
            DateUnit::Month => "%Y-%m",
            DateUnit::Day => "%Y-%m-%d",
            DateUnit::Hour | DateUnit::Minute => "%H:%M",
        }
    }

    /// First unit boundary at or after `dt`.
    fn ceil(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let floor = match self {
            DateUnit::Year => NaiveDate::from_ymd_opt(dt.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
            DateUnit::Month => {
                NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)?.and_hms_opt(0, 0, 0)?
            }
            DateUnit::Day => dt.date().and_hms_opt(0, 0, 0)?,
            DateUnit::Hour => dt.date().and_hms_opt(dt.hour(), 0, 0)?,
            DateUnit::Minute => dt.date().and_hms_opt(dt.hour(), dt.minute(), 0)?,
        };
        if floor == dt {
            Some(floor)
        } else {
            self.advance(floor, 1)
        }
    }

    fn advance(&self, dt: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        match self {
            DateUnit::Year => dt.checked_add_months(Months::new(12 * n)),
            DateUnit::Month => dt.checked_add_months(Months::new(n)),
            DateUnit::Day => dt.checked_add_signed(Duration::days(n as i64)),
            DateUnit::Hour => dt.checked_add_signed(Duration::hours(n as i64)),
            DateUnit::Minute => dt.checked_add_signed(Duration::minutes(n as i64)),
        }
    }
}

/// Pick the unit and interval for a date-number range.
///
/// The coarsest unit that yields at least five ticks wins; within it the
/// smallest allowed interval that keeps the count under the unit's maximum.
pub fn choose_unit(lo: f64, hi: f64) -> (DateUnit, u32) {
    let span = (hi - lo).abs();
    for unit in DateUnit::ALL {
        let num = span / unit.approx_days();
        if num >= MIN_TICKS {
            let interval = unit
                .intervals()
                .iter()
                .copied()
                .find(|&i| num <= i as f64 * (unit.max_ticks() - 1.0))
                .unwrap_or_else(|| unit.intervals().last().copied().unwrap_or(1));
            return (unit, interval);
        }
    }
    (DateUnit::Minute, 1)
}

/// Automatic date ticks for `[lo, hi]`, with labels.
pub fn auto_date_ticks(lo: f64, hi: f64) -> Vec<Tick> {
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let (unit, interval) = choose_unit(lo, hi);
    let mut ticks = Vec::new();
    let mut current = unit.ceil(num2date(lo));
    while let Some(dt) = current {
        let value = date2num(dt);
        if value > hi + 1e-9 || ticks.len() >= MAX_TICKS {
            break;
        }
        ticks.push(Tick {
            value,
            label: dt.format(unit.format()).to_string(),
        });
        current = unit.advance(dt, interval);
    }
    ticks
}

/// Ticks on the first day of every `every`-th month (January-based),
/// labelled `"<Month> <day>"`.
pub fn month_ticks(lo: f64, hi: f64, every: u32) -> Vec<Tick> {
    if !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let every = every.max(1);
    let mut ticks = Vec::new();
    let mut current = DateUnit::Month.ceil(num2date(lo));
    while let Some(dt) = current {
        let value = date2num(dt);
        if value > hi + 1e-9 || ticks.len() >= MAX_TICKS {
            break;
        }
        if (dt.month() - 1) % every == 0 {
            ticks.push(Tick {
                value,
                label: dt.format("%B %-d").to_string(),
            });
        }
        current = DateUnit::Month.advance(dt, 1);
    }
    ticks
}

/// Date tick strategy for an axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DateLocator {
    /// Unit picked from the range, formatted per unit.
    Auto,
    /// First of every n-th month, `"January 1"` style labels.
    Months { every: u32 },
}

impl DateLocator {
    pub fn ticks(&self, lo: f64, hi: f64) -> Vec<Tick> {
        match self {
            DateLocator::Auto => auto_date_ticks(lo, hi),
            DateLocator::Months { every } => month_ticks(lo, hi, *every),
        }
    }
}
