use super::elapsed::span;
use crate::db::queries::load_entries_for_engineer_day;
use crate::db::work_orders::job_number_of;
use crate::errors::{AppError, AppResult, ConflictInfo};
use crate::models::TimeEntry;
use crate::utils::time::format_time;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

/// First entry in `existing` whose worked span intersects `start..end`.
/// Intervals that only touch do not conflict.
pub fn find_overlap<'a>(
    existing: &'a [TimeEntry],
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<&'a TimeEntry> {
    let (ns, ne) = span(date, start, end);
    existing.iter().find(|e| {
        let (es, ee) = span(e.work_date, e.time_in, e.time_out);
        ns < ee && ne > es
    })
}

/// Validate a worked interval against every other entry of the engineer on
/// that date, whatever the work order.
pub fn check_overlap(
    conn: &Connection,
    engineer: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<i64>,
) -> AppResult<()> {
    let existing = load_entries_for_engineer_day(conn, engineer, &date, exclude)?;
    ensure_no_overlap(conn, &existing, date, start, end)
}

/// Same as [`check_overlap`] when the day's entries are already loaded.
pub fn ensure_no_overlap(
    conn: &Connection,
    existing: &[TimeEntry],
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> AppResult<()> {
    match find_overlap(existing, date, start, end) {
        None => Ok(()),
        Some(hit) => Err(AppError::OverlapConflict {
            start: format_time(start),
            end: format_time(end),
            conflicting: ConflictInfo {
                entry_id: hit.id,
                work_order_id: hit.work_order_id,
                job_number: job_number_of(conn, hit.work_order_id)?,
                work_date: hit.work_date,
                time_in: hit.time_in,
                time_out: hit.time_out,
            },
        }),
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

    fn entry(id: i64, tin: NaiveTime, tout: NaiveTime) -> TimeEntry {
        let mut e = NewEntry {
            work_order_id: 1,
            task_id: None,
            engineer: "A".into(),
            work_date: d(),
            time_in: tin,
            time_out: tout,
            lunch: None,
            description: String::new(),
        }
        .into_entry(0.0, 0.0);
        e.id = id;
        e
    }

    #[test]
    fn touching_intervals_are_legal() {
        let existing = vec![entry(1, t(8, 0), t(12, 0))];
        assert!(find_overlap(&existing, d(), t(12, 0), t(16, 0)).is_none());
        assert!(find_overlap(&existing, d(), t(6, 0), t(8, 0)).is_none());
    }

    #[test]
    fn overlapping_interval_is_reported() {
        let existing = vec![entry(1, t(8, 0), t(12, 0))];
        let hit = find_overlap(&existing, d(), t(11, 0), t(13, 0)).unwrap();
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn first_conflict_in_storage_order_wins() {
        let existing = vec![entry(2, t(12, 30), t(17, 0)), entry(5, t(8, 0), t(12, 0))];
        let hit = find_overlap(&existing, d(), t(11, 30), t(13, 30)).unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn overnight_shift_collides_with_late_evening() {
        let existing = vec![entry(1, t(22, 0), t(6, 0))];
        assert!(find_overlap(&existing, d(), t(23, 0), t(23, 30)).is_some());
        assert!(find_overlap(&existing, d(), t(8, 0), t(12, 0)).is_none());
    }

    #[test]
    fn stored_entries_conflict_unless_excluded() {
        use crate::core::add::AddLogic;
        use crate::core::context::testing::{ctx, new_entry, pool, work_order};
        use crate::notify::testing::MemoryNotifier;

        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-7", 10.0);
        let first = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(12, 0))).unwrap();

        let err = check_overlap(&pool.conn, "A", d(), t(9, 0), t(10, 0), None).unwrap_err();
        match err {
            AppError::OverlapConflict { conflicting, .. } => {
                assert_eq!(conflicting.entry_id, first.entry.id);
                assert_eq!(conflicting.job_number.as_deref(), Some("WO-7"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(check_overlap(&pool.conn, "A", d(), t(9, 0), t(10, 0), Some(first.entry.id)).is_ok());
        assert!(check_overlap(&pool.conn, "B", d(), t(9, 0), t(10, 0), None).is_ok());
    }
}
