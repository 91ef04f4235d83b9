use crate::domain::models::WorkingTime;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Portion of a working time falling within one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySegment {
    pub date: NaiveDate,
    pub duration_hours: f64,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("working time {id} ends before it starts: {start} > {end}")]
pub struct InvalidInterval {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Splits a working time into one segment per local day it touches.
///
/// Days are taken in `tz`, so a day containing a DST change is 23 or 25 hours
/// long. An empty interval still yields one zero-length segment.
pub fn split_interval<Tz: TimeZone>(
    interval: &WorkingTime,
    tz: &Tz,
) -> Result<Vec<DaySegment>, InvalidInterval> {
    if interval.end < interval.start {
        return Err(InvalidInterval {
            id: interval.id,
            start: interval.start,
            end: interval.end,
        });
    }

    let mut segments = Vec::new();
    let mut cursor = interval.start;
    loop {
        let date = cursor.with_timezone(tz).date_naive();
        let segment_end = next_local_midnight(date, tz).min(interval.end);

        segments.push(DaySegment {
            date,
            duration_hours: hours_between(cursor, segment_end),
            owner_id: interval.user_id,
        });

        cursor = segment_end;
        if cursor >= interval.end {
            break;
        }
    }
    Ok(segments)
}

/// Splits every working time, failing on the first malformed one.
pub fn split_all<Tz: TimeZone>(
    intervals: &[WorkingTime],
    tz: &Tz,
) -> Result<Vec<DaySegment>, InvalidInterval> {
    let mut segments = Vec::new();
    for interval in intervals {
        segments.extend(split_interval(interval, tz)?);
    }
    Ok(segments)
}

fn next_local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let next_day = date
        .succ_opt()
        .unwrap_or(NaiveDate::MAX)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();

    // Midnight can fall into a DST gap; the day then starts at the first
    // representable instant after it.
    let mut candidate = next_day;
    for _ in 0..4 {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return resolved.with_timezone(&Utc);
        }
        candidate += Duration::minutes(30);
    }
    tz.from_utc_datetime(&next_day).with_timezone(&Utc)
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds().max(0) as f64 / MILLIS_PER_HOUR
}
