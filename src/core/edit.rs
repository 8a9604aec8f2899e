use crate::core::calculator::lunch::{compute_deduction, validate_lunch_timing};
use crate::core::calculator::overlap::ensure_no_overlap;
use crate::core::context::Context;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{load_entries_for_engineer_day, load_entry, update_entry_fields, update_flags};
use crate::db::tasks::adjust_actual_hours;
use crate::errors::{AppError, AppResult};
use crate::models::{EntryEdit, TimeEntry};
use crate::utils::time::format_time;
use tracing::info;

pub struct EditLogic;

impl EditLogic {
    /// Apply field edits to an open entry and re-price it from scratch.
    pub fn apply(pool: &mut DbPool, ctx: &Context, id: i64, edit: EntryEdit) -> AppResult<TimeEntry> {
        if edit.is_empty() {
            return Err(AppError::InvalidValue("nothing to edit".into()));
        }

        let tx = pool.conn.transaction()?;

        let before = load_entry(&tx, id)?;
        before.ensure_unlocked()?;

        let mut entry = before.clone();
        if let Some(e) = edit.engineer {
            entry.engineer = e;
        }
        if let Some(d) = edit.work_date {
            entry.work_date = d;
        }
        if let Some(t) = edit.time_in {
            entry.time_in = t;
        }
        if let Some(t) = edit.time_out {
            entry.time_out = t;
        }
        if let Some(l) = edit.lunch {
            entry.lunch = l;
        }
        if let Some(desc) = edit.description {
            entry.description = desc;
        }

        let others = load_entries_for_engineer_day(&tx, &entry.engineer, &entry.work_date, Some(id))?;
        ensure_no_overlap(&tx, &others, entry.work_date, entry.time_in, entry.time_out)?;

        if let Some(lunch) = entry.lunch {
            validate_lunch_timing(entry.work_date, entry.time_in, lunch.end, ctx.lunch_limit_hours)?;
        }

        let deduction = compute_deduction(
            entry.work_date,
            entry.time_in,
            entry.time_out,
            entry.lunch,
            &others,
        );
        entry.hours_worked = deduction.hours_worked();
        entry.lunch_deduction = deduction.total();

        update_entry_fields(&tx, &entry)?;

        let delta = entry.hours_worked - before.hours_worked;
        if let Some(task_id) = entry.task_id
            && delta != 0.0
            && adjust_actual_hours(&tx, task_id, delta)? == 0
        {
            return Err(AppError::AggregateInconsistency(format!(
                "task #{} was not updated for edited entry #{}",
                task_id, id
            )));
        }

        audit(
            &tx,
            ctx.actor(),
            "update",
            object::TIME_ENTRY,
            Some(id),
            &format!(
                "{} {}-{} ({:.2}h -> {:.2}h)",
                entry.work_date,
                format_time(entry.time_in),
                format_time(entry.time_out),
                before.hours_worked,
                entry.hours_worked
            ),
        )?;

        tx.commit()?;
        info!(entry = id, delta, "time entry updated");
        Ok(entry)
    }

    /// Set the accounting export flags. Once either flag is on the entry is
    /// locked and this call is refused like any other mutation.
    pub fn flags(
        pool: &mut DbPool,
        ctx: &Context,
        id: i64,
        jl: Option<bool>,
        jt: Option<bool>,
    ) -> AppResult<TimeEntry> {
        ctx.limiter.check(ctx.limiter_key())?;

        let tx = pool.conn.transaction()?;

        let mut entry = load_entry(&tx, id)?;
        entry.ensure_unlocked()?;

        entry.entered_on_jl = jl.unwrap_or(entry.entered_on_jl);
        entry.entered_on_jt = jt.unwrap_or(entry.entered_on_jt);
        update_flags(&tx, id, entry.entered_on_jl, entry.entered_on_jt)?;

        audit(
            &tx,
            ctx.actor(),
            "flags",
            object::TIME_ENTRY,
            Some(id),
            &format!("JL={} JT={}", entry.entered_on_jl, entry.entered_on_jt),
        )?;

        tx.commit()?;
        info!(entry = id, locked = entry.is_locked(), "export flags updated");
        Ok(entry)
    }
}
