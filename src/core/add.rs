use crate::core::calculator::lunch::{Deduction, compute_deduction, validate_lunch_timing};
use crate::core::calculator::overlap::ensure_no_overlap;
use crate::core::calculator::threshold::{HoursSummary, ThresholdLevel, crossed_threshold};
use crate::core::context::Context;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{insert_entry, load_entries_for_engineer_day, logged_hours};
use crate::db::tasks::{adjust_actual_hours, work_order_of_task};
use crate::db::work_orders::load_work_order;
use crate::errors::{AppError, AppResult};
use crate::models::{NewEntry, TimeEntry, WorkOrder};
use crate::notify::{Notice, deliver, recipients_for};
use crate::utils::time::format_time;
use rusqlite::Connection;
use tracing::{debug, info};

/// What a successful create produced.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub entry: TimeEntry,
    pub work_order: WorkOrder,
    pub deduction: Deduction,
    pub summary: HoursSummary,
    pub threshold: Option<ThresholdLevel>,
}

/// High-level business logic for logging time.
pub struct AddLogic;

impl AddLogic {
    /// Create one entry in its own transaction, then send any threshold
    /// notice once committed.
    pub fn apply(pool: &mut DbPool, ctx: &Context, input: NewEntry) -> AppResult<EntryOutcome> {
        let tx = pool.conn.transaction()?;
        let outcome = create_entry(&tx, ctx, input)?;
        tx.commit()?;

        info!(
            entry = outcome.entry.id,
            work_order = outcome.work_order.id,
            hours = outcome.entry.hours_worked,
            "time entry created"
        );

        notify_threshold(&pool.conn, ctx, &outcome);
        Ok(outcome)
    }
}

/// Validate, price and persist a new entry on `conn`.
///
/// The caller owns the transaction: nothing here commits.
pub fn create_entry(conn: &Connection, ctx: &Context, input: NewEntry) -> AppResult<EntryOutcome> {
    let wo = load_work_order(conn, input.work_order_id)?;
    if !wo.status.accepts_time() {
        return Err(AppError::WorkOrderClosed(
            wo.job_number.clone(),
            wo.status.to_db_str().to_string(),
        ));
    }

    if let Some(task_id) = input.task_id
        && work_order_of_task(conn, task_id)? != wo.id
    {
        return Err(AppError::TaskWorkOrderMismatch { entry_id: 0, task_id });
    }

    let others = load_entries_for_engineer_day(conn, &input.engineer, &input.work_date, None)?;
    ensure_no_overlap(conn, &others, input.work_date, input.time_in, input.time_out)?;

    if let Some(lunch) = input.lunch {
        validate_lunch_timing(input.work_date, input.time_in, lunch.end, ctx.lunch_limit_hours)?;
    }

    let deduction = compute_deduction(
        input.work_date,
        input.time_in,
        input.time_out,
        input.lunch,
        &others,
    );
    debug!(?deduction, engineer = %input.engineer, "lunch deduction computed");

    let mut entry = input.into_entry(deduction.hours_worked(), deduction.total());
    entry.id = insert_entry(conn, &entry)?;

    if let Some(task_id) = entry.task_id
        && adjust_actual_hours(conn, task_id, entry.hours_worked)? == 0
    {
        return Err(AppError::AggregateInconsistency(format!(
            "task #{} was not updated for new entry",
            task_id
        )));
    }

    audit(
        conn,
        ctx.actor(),
        "create",
        object::TIME_ENTRY,
        Some(entry.id),
        &format!(
            "{} {} {}-{} on {}: {:.2}h (lunch {:.2}h)",
            entry.engineer,
            entry.work_date,
            format_time(entry.time_in),
            format_time(entry.time_out),
            wo.job_number,
            entry.hours_worked,
            entry.lunch_deduction
        ),
    )?;

    let summary = HoursSummary::new(wo.estimated_hours, logged_hours(conn, wo.id)?);
    let threshold = ctx.settings().hours_threshold().and_then(|(_, opts)| {
        crossed_threshold(
            &summary,
            entry.hours_worked,
            opts.warning_threshold,
            opts.exceeded_alert,
        )
    });

    Ok(EntryOutcome {
        entry,
        work_order: wo,
        deduction,
        summary,
        threshold,
    })
}

/// Send the hours-threshold notice an outcome calls for, if any.
pub fn notify_threshold(conn: &Connection, ctx: &Context, outcome: &EntryOutcome) {
    let Some(level) = outcome.threshold else {
        return;
    };
    let Some((configured, opts)) = ctx.settings().hours_threshold() else {
        return;
    };

    let notice = Notice::HoursThreshold {
        work_order_id: outcome.work_order.id,
        job_number: outcome.work_order.job_number.clone(),
        level,
        summary: outcome.summary,
        recipients: recipients_for(configured, &outcome.work_order, opts.include_work_order_owner),
    };
    deliver(conn, ctx.notifier, ctx.actor(), &notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::testing::*;
    use crate::db::log::{load_change_log, load_for_object};
    use crate::db::queries::load_all_entries;
    use crate::db::tasks::load_task;
    use crate::db::work_orders::set_status;
    use crate::models::{LunchWindow, WorkOrderStatus};
    use crate::notify::settings::{HoursThresholdOptions, NotificationSetting};
    use crate::notify::testing::MemoryNotifier;

    #[test]
    fn engineer_a_scenario() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo1 = work_order(&pool, "WO-1", 40.0);
        let wo2 = work_order(&pool, "WO-2", 40.0);
        let wo3 = work_order(&pool, "WO-3", 40.0);

        let mut e2 = new_entry(wo2, "A", t(12, 30), t(17, 0));
        e2.lunch = Some(LunchWindow::new(t(13, 0), t(13, 30)));
        let second = AddLogic::apply(&mut pool, &ctx, e2).unwrap();
        assert_eq!(second.entry.lunch_deduction, 0.5);
        assert_eq!(second.entry.hours_worked, 4.0);

        let first = AddLogic::apply(&mut pool, &ctx, new_entry(wo1, "A", t(8, 0), t(12, 0))).unwrap();
        assert_eq!(first.entry.lunch_deduction, 0.0);
        assert_eq!(first.entry.hours_worked, 4.0);

        let others = load_entries_for_engineer_day(&pool.conn, "A", &d(), None).unwrap();
        let priced = compute_deduction(d(), t(11, 30), t(13, 30), None, &others);
        assert_eq!(priced.cross, 0.5);

        let err = AddLogic::apply(&mut pool, &ctx, new_entry(wo3, "A", t(11, 30), t(13, 30)))
            .unwrap_err();
        match err {
            AppError::OverlapConflict { conflicting, .. } => {
                assert_eq!(conflicting.entry_id, second.entry.id);
                assert_eq!(conflicting.job_number.as_deref(), Some("WO-2"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(load_all_entries(&pool.conn).unwrap().len(), 2);
    }

    #[test]
    fn other_engineers_do_not_conflict() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(12, 0))).unwrap();
        assert!(AddLogic::apply(&mut pool, &ctx, new_entry(wo, "B", t(8, 0), t(12, 0))).is_ok());
    }

    #[test]
    fn late_lunch_is_rejected_and_nothing_persists() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);

        let mut e = new_entry(wo, "A", t(7, 0), t(16, 0));
        e.lunch = Some(LunchWindow::new(t(13, 0), t(13, 30)));
        assert!(matches!(
            AddLogic::apply(&mut pool, &ctx, e),
            Err(AppError::LunchTimingInvalid { .. })
        ));
        assert!(load_all_entries(&pool.conn).unwrap().is_empty());
    }

    #[test]
    fn closed_work_order_takes_no_time() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);
        set_status(&pool.conn, wo, WorkOrderStatus::Closed).unwrap();

        assert!(matches!(
            AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(9, 0))),
            Err(AppError::WorkOrderClosed(_, _))
        ));
    }

    #[test]
    fn task_total_moves_with_new_entry() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);
        let task = task(&pool, wo, 8.0);

        let mut e = new_entry(wo, "A", t(8, 0), t(11, 0));
        e.task_id = Some(task);
        AddLogic::apply(&mut pool, &ctx, e).unwrap();
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 3.0);
    }

    #[test]
    fn task_from_other_work_order_is_rejected() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);
        let other = work_order(&pool, "WO-2", 10.0);
        let task = task(&pool, other, 8.0);

        let mut e = new_entry(wo, "A", t(8, 0), t(11, 0));
        e.task_id = Some(task);
        assert!(matches!(
            AddLogic::apply(&mut pool, &ctx, e),
            Err(AppError::TaskWorkOrderMismatch { .. })
        ));
    }

    #[test]
    fn threshold_notifies_once_when_crossed() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let settings = vec![NotificationSetting::HoursThreshold {
            enabled: true,
            recipients: vec!["pm@example.com".into()],
            options: HoursThresholdOptions::default(),
        }];
        let ctx = ctx(&n, &settings);
        let wo = work_order(&pool, "WO-1", 10.0);

        // 7.5h: 75%, below the line
        let a = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(15, 30))).unwrap();
        assert_eq!(a.threshold, None);

        // +1h: 85%, crosses 80
        let b = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "B", t(8, 0), t(9, 0))).unwrap();
        assert_eq!(b.threshold, Some(ThresholdLevel::Warning));

        // +0.5h: 90%, already past 80
        let c = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "C", t(8, 0), t(8, 30))).unwrap();
        assert_eq!(c.threshold, None);

        let sent = n.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].recipients(),
            ["pm@example.com".to_string(), "owner@example.com".to_string()]
        );
    }

    #[test]
    fn failed_notification_does_not_fail_the_write() {
        let mut pool = pool();
        let n = MemoryNotifier::failing();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 1.0);

        let out = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0))).unwrap();
        assert_eq!(out.threshold, Some(ThresholdLevel::Exceeded));

        let rows = load_for_object(&pool.conn, object::NOTIFICATION, wo).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "notification_failed");
    }

    #[test]
    fn create_is_audited() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let out = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(9, 0))).unwrap();

        let rows = load_for_object(&pool.conn, object::TIME_ENTRY, out.entry.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "create");
        assert_eq!(rows[0].actor.as_deref(), Some("tester"));
    }

    #[test]
    fn small_entry_right_after_the_line_does_not_notify_again() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);

        let first = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(16, 0))).unwrap();
        assert_eq!(first.threshold, Some(ThresholdLevel::Warning));

        let second = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "B", t(8, 0), t(8, 4))).unwrap();
        assert_eq!(second.threshold, None);
        assert_eq!(n.sent.borrow().len(), 1);
    }

    #[test]
    fn overlap_is_reported_before_late_lunch() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0))).unwrap();

        let mut e = new_entry(wo, "A", t(7, 0), t(16, 0));
        e.lunch = Some(LunchWindow::new(t(13, 0), t(13, 30)));
        assert!(matches!(
            AddLogic::apply(&mut pool, &ctx, e),
            Err(AppError::OverlapConflict { .. })
        ));
    }

    #[test]
    fn untouched_task_total_rolls_the_entry_back() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 10.0);
        let task = task(&pool, wo, 8.0);
        pool.conn
            .execute_batch(
                "CREATE TRIGGER freeze_tasks BEFORE UPDATE ON project_tasks
                 BEGIN SELECT RAISE(IGNORE); END;",
            )
            .unwrap();

        let mut e = new_entry(wo, "A", t(8, 0), t(11, 0));
        e.task_id = Some(task);
        assert!(matches!(
            AddLogic::apply(&mut pool, &ctx, e),
            Err(AppError::AggregateInconsistency(_))
        ));

        assert!(load_all_entries(&pool.conn).unwrap().is_empty());
        let audited = load_change_log(&pool.conn, None)
            .unwrap()
            .into_iter()
            .filter(|r| r.object_type == object::TIME_ENTRY)
            .count();
        assert_eq!(audited, 0);
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 0.0);
    }
}
