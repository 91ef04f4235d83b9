use crate::domain::interval::DaySegment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    Ascending,
    Descending,
}

/// Summed hours per (owner, day).
#[derive(Debug, Clone, Default)]
pub struct OwnerBuckets {
    owners: Vec<i64>,
    dates: BTreeSet<NaiveDate>,
    hours: HashMap<(i64, NaiveDate), f64>,
}

impl OwnerBuckets {
    /// Owners in the order they first appeared in the input.
    pub fn owners(&self) -> &[i64] {
        &self.owners
    }

    pub fn hours(&self, owner_id: i64, date: NaiveDate) -> f64 {
        self.hours.get(&(owner_id, date)).copied().unwrap_or(0.0)
    }

    pub fn axis(&self, order: DateOrder) -> Vec<NaiveDate> {
        let mut axis: Vec<NaiveDate> = self.dates.iter().copied().collect();
        if order == DateOrder::Descending {
            axis.reverse();
        }
        axis
    }

    /// Hours of `owner_id` materialized against `axis`, zero where absent.
    pub fn row(&self, owner_id: i64, axis: &[NaiveDate]) -> Vec<f64> {
        axis.iter().map(|date| self.hours(owner_id, *date)).collect()
    }
}

pub fn bucket(segments: &[DaySegment]) -> OwnerBuckets {
    let mut buckets = OwnerBuckets::default();
    for segment in segments {
        if !buckets.owners.contains(&segment.owner_id) {
            buckets.owners.push(segment.owner_id);
        }
        buckets.dates.insert(segment.date);
        *buckets
            .hours
            .entry((segment.owner_id, segment.date))
            .or_insert(0.0) += segment.duration_hours;
    }
    buckets
}

/// Union of the days present in `segments`, sorted.
pub fn date_axis(segments: &[DaySegment], order: DateOrder) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = segments.iter().map(|segment| segment.date).collect();
    let mut axis: Vec<NaiveDate> = dates.into_iter().collect();
    if order == DateOrder::Descending {
        axis.reverse();
    }
    axis
}

/// Per-day average over the owners that actually recorded time that day.
///
/// An owner without recorded time on a day, including one whose only entries
/// that day are empty, is not counted in that day's denominator. The result carries `virtual_owner_id` and is sorted by day.
pub fn average(segments: &[DaySegment], virtual_owner_id: i64) -> Vec<DaySegment> {
    let mut per_day: BTreeMap<NaiveDate, (f64, HashSet<i64>)> = BTreeMap::new();
    for segment in segments {
        let (total, owners) = per_day
            .entry(segment.date)
            .or_insert_with(|| (0.0, HashSet::new()));
        *total += segment.duration_hours;
        if segment.duration_hours > 0.0 {
            owners.insert(segment.owner_id);
        }
    }

    per_day
        .into_iter()
        .map(|(date, (total, owners))| DaySegment {
            date,
            duration_hours: if owners.is_empty() {
                0.0
            } else {
                total / owners.len() as f64
            },
            owner_id: virtual_owner_id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn segment(owner_id: i64, day: &str, duration_hours: f64) -> DaySegment {
        DaySegment {
            date: date(day),
            duration_hours,
            owner_id,
        }
    }

    #[test]
    fn bucket_sums_per_owner_and_day() {
        let segments = vec![
            segment(2, "2026-02-17", 3.0),
            segment(1, "2026-02-16", 4.0),
            segment(1, "2026-02-16", 1.5),
            segment(1, "2026-02-17", 2.0),
        ];
        let buckets = bucket(&segments);
        assert_eq!(buckets.owners(), &[2, 1]);
        assert_eq!(buckets.hours(1, date("2026-02-16")), 5.5);
        assert_eq!(buckets.hours(2, date("2026-02-16")), 0.0);
        assert_eq!(
            buckets.axis(DateOrder::Ascending),
            vec![date("2026-02-16"), date("2026-02-17")]
        );
        assert_eq!(buckets.row(2, &buckets.axis(DateOrder::Descending)), vec![3.0, 0.0]);
    }

    #[test]
    fn axis_is_sorted_by_calendar_day() {
        let segments = vec![
            segment(1, "2026-10-02", 1.0),
            segment(1, "2026-09-30", 1.0),
            segment(2, "2026-10-02", 1.0),
        ];
        assert_eq!(
            date_axis(&segments, DateOrder::Ascending),
            vec![date("2026-09-30"), date("2026-10-02")]
        );
        assert_eq!(
            date_axis(&segments, DateOrder::Descending),
            vec![date("2026-10-02"), date("2026-09-30")]
        );
    }

    #[test]
    fn average_ignores_absent_owners() {
        // Only one of three team members worked on the 16th.
        let segments = vec![
            segment(1, "2026-02-16", 6.0),
            segment(1, "2026-02-17", 4.0),
            segment(2, "2026-02-17", 8.0),
            segment(3, "2026-02-17", 6.0),
        ];
        let averaged = average(&segments, 100);
        assert_eq!(
            averaged,
            vec![segment(100, "2026-02-16", 6.0), segment(100, "2026-02-17", 6.0)]
        );
    }

    #[test]
    fn average_counts_owner_once_per_day() {
        let segments = vec![
            segment(1, "2026-02-16", 2.0),
            segment(1, "2026-02-16", 2.0),
            segment(2, "2026-02-16", 2.0),
        ];
        let averaged = average(&segments, 100);
        assert_eq!(averaged, vec![segment(100, "2026-02-16", 3.0)]);
    }

    #[test]
    fn empty_entries_do_not_count_as_contributors() {
        let segments = vec![
            segment(1, "2026-02-16", 4.0),
            segment(2, "2026-02-16", 0.0),
            segment(3, "2026-02-18", 0.0),
        ];
        let averaged = average(&segments, 100);
        assert_eq!(
            averaged,
            vec![segment(100, "2026-02-16", 4.0), segment(100, "2026-02-18", 0.0)]
        );
    }

    #[test]
    fn average_of_nothing_is_empty() {
        assert!(average(&[], 100).is_empty());
    }

    fn arb_segments() -> impl Strategy<Value = Vec<DaySegment>> {
        prop::collection::vec((1i64..6i64, 0i64..20i64, 0.0f64..24.0f64), 0..40).prop_map(
            |items| {
                items
                    .into_iter()
                    .map(|(owner_id, day_offset, duration_hours)| DaySegment {
                        date: date("2026-01-01") + chrono::Duration::days(day_offset),
                        duration_hours,
                        owner_id,
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn average_times_contributors_equals_day_total(segments in arb_segments()) {
            let buckets = bucket(&segments);
            for averaged in average(&segments, 0) {
                let contributors: HashSet<i64> = segments
                    .iter()
                    .filter(|segment| segment.date == averaged.date && segment.duration_hours > 0.0)
                    .map(|segment| segment.owner_id)
                    .collect();
                let total: f64 = contributors
                    .iter()
                    .map(|owner| buckets.hours(*owner, averaged.date))
                    .sum();
                if contributors.is_empty() {
                    prop_assert_eq!(averaged.duration_hours, 0.0);
                } else {
                    prop_assert!((averaged.duration_hours * contributors.len() as f64 - total).abs() < 1e-6);
                }
                prop_assert_eq!(averaged.owner_id, 0);
            }
        }
    }
}
