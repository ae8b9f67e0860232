//! The "TIME" Engine - calendar ⇄ nanosecond conversion
//!
//! Single source of truth for turning calendar dates into exact `i128`
//! nanosecond timestamps and back, and for building epochs, segments,
//! keyframes and windows from calendar-friendly arguments.
//!
//! Every value is computed as UTC milliseconds × 1,000,000, so two universes
//! declaring the same calendar instant always produce identical integers.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::TimeError;
use crate::model::{
    Nanos, Precision, RelativeFormat, TemporalEpoch, TemporalKeyframe, TemporalSegment,
    TemporalWindow, WindowAlias,
};

pub const NS_PER_MILLISECOND: Nanos = 1_000_000;
pub const NS_PER_SECOND: Nanos = 1_000_000_000;
pub const NS_PER_MINUTE: Nanos = 60 * NS_PER_SECOND;
pub const NS_PER_HOUR: Nanos = 60 * NS_PER_MINUTE;
pub const NS_PER_DAY: Nanos = 24 * NS_PER_HOUR;
/// Julian year (365.25 days)
pub const NS_PER_YEAR: Nanos = 36_525 * NS_PER_DAY / 100;

/// A calendar day (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay {
    pub year: i32,
    /// 1 - 12
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Midnight at the start of the day
    pub const fn start(self) -> CivilDateTime {
        self.at(0, 0, 0, 0)
    }

    /// Last representable millisecond of the day (23:59:59.999)
    pub const fn end(self) -> CivilDateTime {
        self.at(23, 59, 59, 999)
    }

    pub const fn at(self, hour: u32, minute: u32, second: u32, millisecond: u32) -> CivilDateTime {
        CivilDateTime {
            date: self,
            hour,
            minute,
            second,
            millisecond,
        }
    }
}

/// A calendar instant with millisecond resolution (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDateTime {
    pub date: CalendarDay,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl CivilDateTime {
    pub fn to_nanoseconds(self) -> Result<Nanos, TimeError> {
        datetime_to_nanoseconds(
            self.date.year,
            self.date.month,
            self.date.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
        )
    }
}

impl From<CalendarDay> for CivilDateTime {
    fn from(day: CalendarDay) -> Self {
        day.start()
    }
}

// ============================================================================
// CONVERSION
// ============================================================================

/// Midnight UTC of the given day, in nanoseconds
pub fn date_to_nanoseconds(year: i32, month: u32, day: u32) -> Result<Nanos, TimeError> {
    datetime_to_nanoseconds(year, month, day, 0, 0, 0, 0)
}

/// UTC calendar instant → nanoseconds (millisecond epoch × 1,000,000)
///
/// Fields are validated by the calendar backend; years beyond its range
/// (roughly ±262,000) are rejected rather than wrapped.
pub fn datetime_to_nanoseconds(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millisecond: u32,
) -> Result<Nanos, TimeError> {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millisecond))
        .ok_or_else(|| {
            TimeError::InvalidDate(format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
                year, month, day, hour, minute, second, millisecond
            ))
        })?;

    let millis = naive.and_utc().timestamp_millis();
    Ok(Nanos::from(millis) * NS_PER_MILLISECOND)
}

/// Nanoseconds → UTC instant
///
/// Sub-millisecond digits are dropped by truncating division (toward zero).
pub fn nanoseconds_to_date(ns: Nanos) -> Result<DateTime<Utc>, TimeError> {
    let millis = i64::try_from(ns / NS_PER_MILLISECOND).map_err(|_| TimeError::OutOfRange(ns))?;
    DateTime::from_timestamp_millis(millis).ok_or(TimeError::OutOfRange(ns))
}

// ============================================================================
// ENTITY CONSTRUCTORS
// ============================================================================

/// Epoch from `start` midnight to the last instant of `end`
pub fn create_epoch(
    start: CalendarDay,
    end: CalendarDay,
    precision: Precision,
    epoch_id: Option<&str>,
    description: Option<&str>,
) -> Result<TemporalEpoch, TimeError> {
    let mut epoch = TemporalEpoch::new(
        start.start().to_nanoseconds()?,
        end.end().to_nanoseconds()?,
        precision,
    );
    epoch.epoch_id = epoch_id.map(str::to_string);
    epoch.description = description.map(str::to_string);
    Ok(epoch)
}

/// Zero-based epoch for runtime-relative media (film minutes, episode length)
pub fn create_runtime_epoch(
    duration_minutes: u64,
    precision: Precision,
    epoch_id: Option<&str>,
    description: Option<&str>,
) -> TemporalEpoch {
    let mut epoch = TemporalEpoch::new(0, Nanos::from(duration_minutes) * NS_PER_MINUTE, precision);
    epoch.epoch_id = epoch_id.map(str::to_string);
    epoch.description = description.map(str::to_string);
    epoch
}

pub fn create_keyframe(
    keyframe_id: &str,
    at: impl Into<CivilDateTime>,
    significance: f64,
    tags: &[&str],
    certainty: Option<f64>,
) -> Result<TemporalKeyframe, TimeError> {
    Ok(TemporalKeyframe {
        keyframe_id: keyframe_id.to_string(),
        timestamp: at.into().to_nanoseconds()?,
        significance,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        certainty: certainty.unwrap_or(1.0),
    })
}

/// Segment from `start` midnight to 23:59:59.999 of `end`
pub fn create_segment(
    segment_id: &str,
    start: CalendarDay,
    end: CalendarDay,
    segment_type: &str,
) -> Result<TemporalSegment, TimeError> {
    Ok(TemporalSegment {
        segment_id: segment_id.to_string(),
        start_time: start.start().to_nanoseconds()?,
        end_time: end.end().to_nanoseconds()?,
        segment_type: segment_type.to_string(),
        status: None,
        jurisdiction: None,
    })
}

/// Window from `start` midnight to 23:59:59.999 of `end`
pub fn create_window(
    window_id: &str,
    start: CalendarDay,
    end: CalendarDay,
    precision: Precision,
    aliases: Vec<WindowAlias>,
) -> Result<TemporalWindow, TimeError> {
    Ok(TemporalWindow {
        window_id: window_id.to_string(),
        start_time: start.start().to_nanoseconds()?,
        end_time: end.end().to_nanoseconds()?,
        precision,
        aliases,
    })
}

/// Full UTC calendar year, addressed as `cal:YYYY`
pub fn calendar_year_window(year: i32) -> Result<TemporalWindow, TimeError> {
    create_window(
        &format!("cal:{:04}", year),
        CalendarDay::new(year, 1, 1),
        CalendarDay::new(year, 12, 31),
        Precision::Year,
        vec![WindowAlias::new("year", year.to_string())],
    )
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Renders the largest two non-zero units among days, hours, minutes, seconds
///
/// `90m → "1h 30m"`, `2h → "2h"`, `45s → "45s"`. Sub-second remainders are
/// dropped; anything under a second renders as `"0s"`.
pub fn format_duration(ns: Nanos) -> String {
    if ns < 0 {
        return format!("-{}", format_duration(-ns));
    }

    let total_seconds = ns / NS_PER_SECOND;
    let units = [
        (total_seconds / 86_400, "d"),
        ((total_seconds % 86_400) / 3_600, "h"),
        ((total_seconds % 3_600) / 60, "m"),
        (total_seconds % 60, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// ISO-8601 rendering with millisecond precision (`1969-07-20T20:17:40.000Z`)
///
/// Instants the calendar backend cannot represent fall back to `<ns>ns`.
pub fn format_timestamp(ns: Nanos) -> String {
    match nanoseconds_to_date(ns) {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        Err(_) => format!("{}ns", ns),
    }
}

/// T-minus/T-plus label of `t` relative to the epoch's zero point
///
/// Returns `None` when the epoch has no zero point.
pub fn format_relative(epoch: &TemporalEpoch, t: Nanos) -> Option<String> {
    let zero = epoch.zero_point?;
    let offset = t - zero;
    let prefix = if offset < 0 {
        epoch.before_prefix.as_deref().unwrap_or("T-")
    } else {
        epoch.after_prefix.as_deref().unwrap_or("T+")
    };
    let magnitude = offset.abs();

    let body = match epoch.relative_format.unwrap_or(RelativeFormat::Duration) {
        RelativeFormat::Duration => format_duration(magnitude),
        RelativeFormat::Clock => {
            let secs = magnitude / NS_PER_SECOND;
            format!("{:02}:{:02}:{:02}", secs / 3_600, (secs % 3_600) / 60, secs % 60)
        }
    };

    Some(format!("{}{}", prefix, body))
}

// ============================================================================
// UNIT HELPERS
// ============================================================================

pub fn years_to_nanoseconds(years: i64) -> Nanos {
    Nanos::from(years) * NS_PER_YEAR
}

pub fn days_to_nanoseconds(days: i64) -> Nanos {
    Nanos::from(days) * NS_PER_DAY
}

pub fn hours_to_nanoseconds(hours: i64) -> Nanos {
    Nanos::from(hours) * NS_PER_HOUR
}

pub fn minutes_to_nanoseconds(minutes: i64) -> Nanos {
    Nanos::from(minutes) * NS_PER_MINUTE
}

pub fn seconds_to_nanoseconds(seconds: i64) -> Nanos {
    Nanos::from(seconds) * NS_PER_SECOND
}

/// `start <= t <= end`
#[inline]
pub fn is_within_range(t: Nanos, start: Nanos, end: Nanos) -> bool {
    start <= t && t <= end
}
