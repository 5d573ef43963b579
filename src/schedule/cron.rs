// Five-field cron expressions
// minute hour day-of-month month day-of-week, evaluated in the caller's time zone

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use std::fmt;
use std::str::FromStr;

use crate::error::{CleanupError, Result};

/// Give up when no fire time exists within this many years (e.g. `0 0 30 2 *`).
const SEARCH_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
}

const MINUTE: FieldSpec = FieldSpec { name: "minute", min: 0, max: 59 };
const HOUR: FieldSpec = FieldSpec { name: "hour", min: 0, max: 23 };
const DAY_OF_MONTH: FieldSpec = FieldSpec { name: "day of month", min: 1, max: 31 };
const MONTH: FieldSpec = FieldSpec { name: "month", min: 1, max: 12 };
const DAY_OF_WEEK: FieldSpec = FieldSpec { name: "day of week", min: 0, max: 7 };

/// Parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    // A field starting with `*` leaves its day rule unrestricted
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid(expression, format!("expected 5 fields, found {}", fields.len())));
        }

        let mut days_of_week = parse_field(expression, fields[4], DAY_OF_WEEK)?;
        // 7 is Sunday too
        if days_of_week & (1 << 7) != 0 {
            days_of_week = (days_of_week & !(1 << 7)) | 1;
        }

        Ok(Self {
            expression: fields.join(" "),
            minutes: parse_field(expression, fields[0], MINUTE)?,
            hours: parse_field(expression, fields[1], HOUR)?,
            days_of_month: parse_field(expression, fields[2], DAY_OF_MONTH)?,
            months: parse_field(expression, fields[3], MONTH)?,
            days_of_week,
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = bit(self.days_of_month, date.day());
        let dow = bit(self.days_of_week, date.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// Whether the wall-clock minute `at` is a fire time.
    pub fn matches(&self, at: &NaiveDateTime) -> bool {
        bit(self.months, at.month())
            && self.day_matches(at.date())
            && bit(self.hours, at.hour())
            && bit(self.minutes, at.minute())
    }

    /// Next fire time strictly after `after`, in the same time zone.
    /// Wall-clock times skipped by a DST jump are passed over.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let start = after.naive_local().with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);
        let limit_year = start.year() + SEARCH_YEARS;

        let mut candidate = start;
        while candidate.year() <= limit_year {
            if !bit(self.months, candidate.month()) {
                candidate = first_of_next_month(candidate.date())?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.day_matches(candidate.date()) {
                candidate = candidate.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !bit(self.hours, candidate.hour()) {
                candidate = candidate.date().and_hms_opt(candidate.hour(), 0, 0)? + Duration::hours(1);
                continue;
            }
            if !bit(self.minutes, candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }

            let resolved = match tz.from_local_datetime(&candidate) {
                LocalResult::Single(t) => Some(t),
                LocalResult::Ambiguous(earliest, _) => Some(earliest),
                LocalResult::None => None,
            };
            match resolved {
                Some(t) if t > *after => return Some(t),
                _ => candidate += Duration::minutes(1),
            }
        }
        None
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl FromStr for CronSchedule {
    type Err = CleanupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn bit(set: u64, value: u32) -> bool {
    set & (1u64 << value) != 0
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn invalid(expression: &str, reason: impl Into<String>) -> CleanupError {
    CleanupError::InvalidSchedule {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

/// Parse one field into a bitmask of allowed values.
fn parse_field(expression: &str, field: &str, spec: FieldSpec) -> Result<u64> {
    let mut set = 0u64;
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| invalid(expression, format!("bad step '{}' in {} field", step, spec.name)))?;
                if step == 0 {
                    return Err(invalid(expression, format!("step must be positive in {} field", spec.name)));
                }
                (range, step)
            }
            None => (part, 1),
        };

        let (lo, hi) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(expression, a, spec)?, parse_value(expression, b, spec)?)
        } else {
            let v = parse_value(expression, range, spec)?;
            // `5/15` means 5 through max in steps of 15
            if part.contains('/') {
                (v, spec.max)
            } else {
                (v, v)
            }
        };

        if lo > hi {
            return Err(invalid(expression, format!("range {}-{} is reversed in {} field", lo, hi, spec.name)));
        }
        for v in (lo..=hi).step_by(step as usize) {
            set |= 1 << v;
        }
    }
    Ok(set)
}

fn parse_value(expression: &str, text: &str, spec: FieldSpec) -> Result<u32> {
    let value: u32 = text
        .parse()
        .map_err(|_| invalid(expression, format!("'{}' is not a number in {} field", text, spec.name)))?;
    if value < spec.min || value > spec.max {
        return Err(invalid(
            expression,
            format!("{} is outside {}-{} in {} field", value, spec.min, spec.max, spec.name),
        ));
    }
    Ok(value)
}
