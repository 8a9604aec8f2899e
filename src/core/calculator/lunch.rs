//! Lunch deduction: the entry's own lunch plus any lunch declared on the
//! engineer's other entries that falls inside this entry's worked span.

use super::elapsed::{elapsed_hours, hours_between, span};
use crate::errors::{AppError, AppResult};
use crate::models::{LunchWindow, TimeEntry};
use chrono::{NaiveDate, NaiveTime};

/// Hours shared by a worked interval and a lunch window. Each interval is
/// rolled over midnight on its own.
pub fn lunch_overlap(
    date: NaiveDate,
    work_start: NaiveTime,
    work_end: NaiveTime,
    lunch_start: NaiveTime,
    lunch_end: NaiveTime,
) -> f64 {
    let (ws, we) = span(date, work_start, work_end);
    let (ls, le) = span(date, lunch_start, lunch_end);

    let start = ws.max(ls);
    let end = we.min(le);
    if end > start {
        hours_between(start, end)
    } else {
        0.0
    }
}

/// Lunch taken on `others` (same engineer, same date, any work order) that
/// overlaps `work_start..work_end`.
///
/// The sum is additive: two other entries declaring the same lunch both
/// count.
pub fn cross_entry_lunch(
    others: &[TimeEntry],
    date: NaiveDate,
    work_start: NaiveTime,
    work_end: NaiveTime,
) -> f64 {
    others
        .iter()
        .filter_map(|e| e.lunch)
        .map(|l| lunch_overlap(date, work_start, work_end, l.start, l.end))
        .sum()
}

/// Reject a lunch that ends more than `limit_hours` after work starts.
pub fn validate_lunch_timing(
    date: NaiveDate,
    work_start: NaiveTime,
    lunch_end: NaiveTime,
    limit_hours: f64,
) -> AppResult<()> {
    let gap = elapsed_hours(date, work_start, lunch_end);
    if gap > limit_hours {
        return Err(AppError::LunchTimingInvalid {
            hours_after_start: gap,
            limit: limit_hours,
        });
    }
    Ok(())
}

/// Result of pricing one worked interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deduction {
    pub elapsed: f64,
    pub own: f64,
    pub cross: f64,
}

impl Deduction {
    pub fn total(&self) -> f64 {
        self.own + self.cross
    }

    pub fn hours_worked(&self) -> f64 {
        (self.elapsed - self.total()).max(0.0)
    }
}

pub fn compute_deduction(
    date: NaiveDate,
    time_in: NaiveTime,
    time_out: NaiveTime,
    lunch: Option<LunchWindow>,
    others: &[TimeEntry],
) -> Deduction {
    let own = lunch
        .map(|l| lunch_overlap(date, time_in, time_out, l.start, l.end))
        .unwrap_or(0.0);

    Deduction {
        elapsed: elapsed_hours(date, time_in, time_out),
        own,
        cross: cross_entry_lunch(others, date, time_in, time_out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn other(lunch: Option<(NaiveTime, NaiveTime)>) -> TimeEntry {
        NewEntry {
            work_order_id: 2,
            task_id: None,
            engineer: "A".into(),
            work_date: d(),
            time_in: t(12, 30),
            time_out: t(17, 0),
            lunch: lunch.map(|(s, e)| LunchWindow::new(s, e)),
            description: String::new(),
        }
        .into_entry(4.0, 0.5)
    }

    #[test]
    fn full_lunch_inside_shift() {
        assert_eq!(lunch_overlap(d(), t(8, 0), t(17, 0), t(12, 0), t(13, 0)), 1.0);
    }

    #[test]
    fn lunch_outside_shift_is_free() {
        assert_eq!(lunch_overlap(d(), t(8, 0), t(12, 0), t(13, 0), t(14, 0)), 0.0);
    }

    #[test]
    fn touching_lunch_deducts_nothing() {
        assert_eq!(lunch_overlap(d(), t(8, 0), t(12, 0), t(12, 0), t(12, 30)), 0.0);
    }

    #[test]
    fn partial_overlap_counts_the_shared_part() {
        assert_eq!(lunch_overlap(d(), t(11, 30), t(13, 30), t(13, 0), t(14, 0)), 0.5);
    }

    #[test]
    fn cross_entry_lunch_uses_other_entries_windows() {
        let others = vec![other(Some((t(13, 0), t(13, 30)))), other(None)];
        assert_eq!(cross_entry_lunch(&others, d(), t(11, 30), t(13, 30)), 0.5);
        assert_eq!(cross_entry_lunch(&others, d(), t(8, 0), t(12, 0)), 0.0);
    }

    #[test]
    fn cross_entry_lunch_does_not_deduplicate() {
        let lunch = Some((t(12, 0), t(13, 0)));
        let others = vec![other(lunch), other(lunch)];
        assert_eq!(cross_entry_lunch(&others, d(), t(8, 0), t(17, 0)), 2.0);
    }

    #[test]
    fn lunch_timing_limit() {
        assert!(validate_lunch_timing(d(), t(8, 0), t(14, 0), 6.0).is_ok());
        let err = validate_lunch_timing(d(), t(8, 0), t(14, 30), 6.0).unwrap_err();
        assert!(matches!(
            err,
            AppError::LunchTimingInvalid { hours_after_start, .. } if hours_after_start == 6.5
        ));
    }

    #[test]
    fn lunch_timing_is_midnight_aware() {
        assert!(validate_lunch_timing(d(), t(22, 0), t(2, 0), 6.0).is_ok());
    }

    #[test]
    fn hours_worked_never_negative() {
        let lunch = Some((t(8, 0), t(12, 0)));
        let others = vec![other(lunch)];
        let ded = compute_deduction(
            d(),
            t(9, 0),
            t(10, 0),
            Some(LunchWindow::new(t(9, 0), t(10, 0))),
            &others,
        );
        assert_eq!(ded.total(), 2.0);
        assert_eq!(ded.hours_worked(), 0.0);
    }
}
