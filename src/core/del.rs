use crate::core::context::Context;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{delete_entry, find_entry, load_entry};
use crate::db::tasks::adjust_actual_hours;
use crate::errors::{AppError, AppResult};
use crate::models::TimeEntry;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

/// Counts returned by bulk operations.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    pub processed: Vec<i64>,
    pub skipped_locked: Vec<i64>,
    pub missing: Vec<i64>,
}

pub struct DeleteLogic;

impl DeleteLogic {
    pub fn apply(pool: &mut DbPool, ctx: &Context, id: i64) -> AppResult<TimeEntry> {
        let tx = pool.conn.transaction()?;
        let entry = load_entry(&tx, id)?;
        entry.ensure_unlocked()?;
        remove(&tx, ctx, &entry)?;
        tx.commit()?;

        info!(entry = id, "time entry deleted");
        Ok(entry)
    }

    /// Delete many entries in one transaction. Locked and unknown ids are
    /// skipped and reported, not treated as failures.
    pub fn bulk(pool: &mut DbPool, ctx: &Context, ids: &[i64]) -> AppResult<BulkReport> {
        let tx = pool.conn.transaction()?;
        let mut report = BulkReport::default();

        for &id in ids {
            match find_entry(&tx, id)? {
                None => report.missing.push(id),
                Some(e) if e.is_locked() => report.skipped_locked.push(id),
                Some(e) => {
                    remove(&tx, ctx, &e)?;
                    report.processed.push(id);
                }
            }
        }

        audit(
            &tx,
            ctx.actor(),
            "bulk_delete",
            object::TIME_ENTRY,
            None,
            &format!(
                "deleted {}, skipped {} locked, {} missing",
                report.processed.len(),
                report.skipped_locked.len(),
                report.missing.len()
            ),
        )?;

        tx.commit()?;
        info!(deleted = report.processed.len(), "bulk delete committed");
        Ok(report)
    }
}

fn remove(conn: &Connection, ctx: &Context, entry: &TimeEntry) -> AppResult<()> {
    if let Some(task_id) = entry.task_id
        && adjust_actual_hours(conn, task_id, -entry.hours_worked)? == 0
    {
        return Err(AppError::AggregateInconsistency(format!(
            "task #{} was not updated for deleted entry #{}",
            task_id, entry.id
        )));
    }

    delete_entry(conn, entry.id)?;

    audit(
        conn,
        ctx.actor(),
        "delete",
        object::TIME_ENTRY,
        Some(entry.id),
        &format!("{} {} {:.2}h", entry.engineer, entry.work_date, entry.hours_worked),
    )
}
