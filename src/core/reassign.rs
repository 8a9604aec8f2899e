use crate::core::context::Context;
use crate::core::del::BulkReport;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{find_entry, load_entries_by_work_order, load_entry, set_entry_task, set_entry_work_order};
use crate::db::tasks::{adjust_actual_hours, work_order_of_task};
use crate::db::work_orders::load_work_order;
use crate::errors::{AppError, AppResult};
use crate::models::{TimeEntry, WorkOrder};
use rusqlite::Connection;
use tracing::info;

pub struct ReassignLogic;

impl ReassignLogic {
    /// Move an open entry to another work order. The worked interval is
    /// unchanged so overlap is not checked again.
    pub fn apply(pool: &mut DbPool, ctx: &Context, id: i64, target: i64) -> AppResult<TimeEntry> {
        let tx = pool.conn.transaction()?;
        let target_wo = open_target(&tx, target)?;

        let entry = load_entry(&tx, id)?;
        entry.ensure_unlocked()?;
        let moved = move_entry(&tx, ctx, entry, &target_wo)?;

        tx.commit()?;
        info!(entry = id, work_order = target, "time entry reassigned");
        Ok(moved)
    }

    /// Reassign a selection in one transaction, skipping locked rows.
    pub fn bulk(pool: &mut DbPool, ctx: &Context, ids: &[i64], target: i64) -> AppResult<BulkReport> {
        let tx = pool.conn.transaction()?;
        let target_wo = open_target(&tx, target)?;
        let mut report = BulkReport::default();

        for &id in ids {
            match find_entry(&tx, id)? {
                None => report.missing.push(id),
                Some(e) if e.is_locked() => report.skipped_locked.push(id),
                Some(e) => {
                    move_entry(&tx, ctx, e, &target_wo)?;
                    report.processed.push(id);
                }
            }
        }

        audit(
            &tx,
            ctx.actor(),
            "bulk_reassign",
            object::WORK_ORDER,
            Some(target),
            &format!(
                "moved {} to {}, skipped {} locked, {} missing",
                report.processed.len(),
                target_wo.job_number,
                report.skipped_locked.len(),
                report.missing.len()
            ),
        )?;

        tx.commit()?;
        Ok(report)
    }

    /// Move every entry of `source` to `target`.
    pub fn from_work_order(
        pool: &mut DbPool,
        ctx: &Context,
        source: i64,
        target: i64,
    ) -> AppResult<BulkReport> {
        load_work_order(&pool.conn, source)?;
        let ids: Vec<i64> = load_entries_by_work_order(&pool.conn, source)?
            .iter()
            .map(|e| e.id)
            .collect();
        Self::bulk(pool, ctx, &ids, target)
    }
}

fn open_target(conn: &Connection, target: i64) -> AppResult<WorkOrder> {
    let wo = load_work_order(conn, target)?;
    if !wo.status.accepts_time() {
        return Err(AppError::WorkOrderClosed(
            wo.job_number,
            wo.status.to_db_str().to_string(),
        ));
    }
    Ok(wo)
}

/// Repoint an entry; a task belonging to another work order is dropped and
/// its total decremented.
fn move_entry(
    conn: &Connection,
    ctx: &Context,
    mut entry: TimeEntry,
    target: &WorkOrder,
) -> AppResult<TimeEntry> {
    let from = entry.work_order_id;

    if let Some(task_id) = entry.task_id
        && work_order_of_task(conn, task_id)? != target.id
    {
        if adjust_actual_hours(conn, task_id, -entry.hours_worked)? == 0 {
            return Err(AppError::AggregateInconsistency(format!(
                "task #{} was not updated for reassigned entry #{}",
                task_id, entry.id
            )));
        }
        set_entry_task(conn, entry.id, None)?;
        entry.task_id = None;
    }

    set_entry_work_order(conn, entry.id, target.id)?;
    entry.work_order_id = target.id;

    audit(
        conn,
        ctx.actor(),
        "reassign",
        object::TIME_ENTRY,
        Some(entry.id),
        &format!("work order #{} -> {}", from, target.job_number),
    )?;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add::AddLogic;
    use crate::core::context::testing::*;
    use crate::core::edit::EditLogic;
    use crate::db::queries::{load_entry, logged_hours};
    use crate::db::tasks::load_task;
    use crate::notify::testing::MemoryNotifier;

    #[test]
    fn reassign_moves_hours_between_work_orders() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo1 = work_order(&pool, "WO-1", 0.0);
        let wo2 = work_order(&pool, "WO-2", 0.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo1, "A", t(8, 0), t(12, 0)))
            .unwrap()
            .entry
            .id;

        ReassignLogic::apply(&mut pool, &ctx, id, wo2).unwrap();
        assert_eq!(logged_hours(&pool.conn, wo1).unwrap(), 0.0);
        assert_eq!(logged_hours(&pool.conn, wo2).unwrap(), 4.0);
    }

    #[test]
    fn locked_reassign_keeps_work_order() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo1 = work_order(&pool, "WO-1", 0.0);
        let wo2 = work_order(&pool, "WO-2", 0.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo1, "A", t(8, 0), t(12, 0)))
            .unwrap()
            .entry
            .id;
        EditLogic::flags(&mut pool, &ctx, id, Some(true), None).unwrap();

        assert!(matches!(
            ReassignLogic::apply(&mut pool, &ctx, id, wo2),
            Err(AppError::EntryLocked { .. })
        ));
        assert_eq!(load_entry(&pool.conn, id).unwrap().work_order_id, wo1);
    }

    #[test]
    fn foreign_task_is_detached_on_reassign() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo1 = work_order(&pool, "WO-1", 0.0);
        let wo2 = work_order(&pool, "WO-2", 0.0);
        let task = task(&pool, wo1, 8.0);
        let mut e = new_entry(wo1, "A", t(8, 0), t(12, 0));
        e.task_id = Some(task);
        let id = AddLogic::apply(&mut pool, &ctx, e).unwrap().entry.id;

        let moved = ReassignLogic::apply(&mut pool, &ctx, id, wo2).unwrap();
        assert_eq!(moved.task_id, None);
        assert_eq!(load_entry(&pool.conn, id).unwrap().task_id, None);
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 0.0);
    }

    #[test]
    fn bulk_from_work_order_skips_locked() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo1 = work_order(&pool, "WO-1", 0.0);
        let wo2 = work_order(&pool, "WO-2", 0.0);
        let a = AddLogic::apply(&mut pool, &ctx, new_entry(wo1, "A", t(8, 0), t(9, 0)))
            .unwrap()
            .entry
            .id;
        let b = AddLogic::apply(&mut pool, &ctx, new_entry(wo1, "A", t(9, 0), t(10, 0)))
            .unwrap()
            .entry
            .id;
        EditLogic::flags(&mut pool, &ctx, a, None, Some(true)).unwrap();

        let report = ReassignLogic::from_work_order(&mut pool, &ctx, wo1, wo2).unwrap();
        assert_eq!(report.processed, vec![b]);
        assert_eq!(report.skipped_locked, vec![a]);
        assert_eq!(logged_hours(&pool.conn, wo1).unwrap(), 1.0);
    }
}
