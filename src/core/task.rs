//! Projects, tasks and the entry ↔ task link.

use crate::core::context::Context;
use crate::db::log::{audit, object};
use crate::db::pool::DbPool;
use crate::db::queries::{detach_task_entries, load_entry, set_entry_task, task_entry_hours};
use crate::db::tasks::{
    NewTask, adjust_actual_hours, delete_project, delete_task, insert_project, insert_task,
    list_tasks, load_project, load_task, set_actual_hours, set_task_status, work_order_of_task,
};
use crate::db::work_orders::load_work_order;
use crate::errors::{AppError, AppResult};
use crate::models::{ProjectTask, TaskStatus, TimeEntry};
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

pub struct TaskLogic;

fn must_touch(rows: usize, task_id: i64, what: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::AggregateInconsistency(format!(
            "task #{} was not updated while {}",
            task_id, what
        )));
    }
    Ok(())
}

impl TaskLogic {
    pub fn create_project(
        pool: &mut DbPool,
        ctx: &Context,
        work_order_id: i64,
        name: &str,
        description: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<i64> {
        let tx = pool.conn.transaction()?;
        let wo = load_work_order(&tx, work_order_id)?;
        let id = insert_project(&tx, work_order_id, name, description, start, end)?;
        audit(
            &tx,
            ctx.actor(),
            "create",
            object::PROJECT,
            Some(id),
            &format!("{} for {}", name, wo.job_number),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn delete_project(pool: &mut DbPool, ctx: &Context, id: i64) -> AppResult<()> {
        let tx = pool.conn.transaction()?;
        let project = load_project(&tx, id)?;
        let tasks = list_tasks(&tx, id)?;
        let mut detached = 0;
        for t in &tasks {
            detached += detach_task_entries(&tx, t.id)?;
        }
        delete_project(&tx, id)?;
        audit(
            &tx,
            ctx.actor(),
            "delete",
            object::PROJECT,
            Some(id),
            &format!(
                "{} ({} tasks, {} entries detached)",
                project.name,
                tasks.len(),
                detached
            ),
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn create_task(pool: &mut DbPool, ctx: &Context, task: NewTask) -> AppResult<i64> {
        let tx = pool.conn.transaction()?;
        let project = load_project(&tx, task.project_id)?;
        let id = insert_task(&tx, &task)?;
        audit(
            &tx,
            ctx.actor(),
            "create",
            object::TASK,
            Some(id),
            &format!("{} in project {}", task.name, project.name),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn set_status(
        pool: &mut DbPool,
        ctx: &Context,
        id: i64,
        status: TaskStatus,
        progress: Option<u8>,
    ) -> AppResult<ProjectTask> {
        if let Some(p) = progress
            && p > 100
        {
            return Err(AppError::InvalidValue(format!("progress {} is above 100", p)));
        }
        let tx = pool.conn.transaction()?;
        set_task_status(&tx, id, status, progress)?;
        audit(
            &tx,
            ctx.actor(),
            "status",
            object::TASK,
            Some(id),
            status.to_db_str(),
        )?;
        let task = load_task(&tx, id)?;
        tx.commit()?;
        Ok(task)
    }

    /// Attach an entry to a task of its own work order. An entry already on
    /// another task moves its hours across.
    pub fn assign(pool: &mut DbPool, ctx: &Context, entry_id: i64, task_id: i64) -> AppResult<TimeEntry> {
        let tx = pool.conn.transaction()?;

        let mut entry = load_entry(&tx, entry_id)?;
        entry.ensure_unlocked()?;
        load_task(&tx, task_id)?;

        if work_order_of_task(&tx, task_id)? != entry.work_order_id {
            return Err(AppError::TaskWorkOrderMismatch { entry_id, task_id });
        }

        if entry.task_id == Some(task_id) {
            return Ok(entry);
        }

        if let Some(previous) = entry.task_id {
            must_touch(
                adjust_actual_hours(&tx, previous, -entry.hours_worked)?,
                previous,
                "moving an entry off it",
            )?;
        }
        must_touch(
            adjust_actual_hours(&tx, task_id, entry.hours_worked)?,
            task_id,
            "assigning an entry",
        )?;
        set_entry_task(&tx, entry_id, Some(task_id))?;

        audit(
            &tx,
            ctx.actor(),
            "assign",
            object::TIME_ENTRY,
            Some(entry_id),
            &format!("task #{} (+{:.2}h)", task_id, entry.hours_worked),
        )?;

        tx.commit()?;
        entry.task_id = Some(task_id);
        info!(entry = entry_id, task = task_id, "entry assigned to task");
        Ok(entry)
    }

    pub fn unassign(pool: &mut DbPool, ctx: &Context, entry_id: i64, task_id: i64) -> AppResult<TimeEntry> {
        let tx = pool.conn.transaction()?;

        let mut entry = load_entry(&tx, entry_id)?;
        entry.ensure_unlocked()?;
        if entry.task_id != Some(task_id) {
            return Err(AppError::EntryNotOnTask { entry_id, task_id });
        }

        must_touch(
            adjust_actual_hours(&tx, task_id, -entry.hours_worked)?,
            task_id,
            "unassigning an entry",
        )?;
        set_entry_task(&tx, entry_id, None)?;

        audit(
            &tx,
            ctx.actor(),
            "unassign",
            object::TIME_ENTRY,
            Some(entry_id),
            &format!("task #{} (-{:.2}h)", task_id, entry.hours_worked),
        )?;

        tx.commit()?;
        entry.task_id = None;
        Ok(entry)
    }

    /// Delete a task. Its entries stay, detached, with their hours intact.
    pub fn delete_task(pool: &mut DbPool, ctx: &Context, task_id: i64) -> AppResult<usize> {
        let tx = pool.conn.transaction()?;
        let task = load_task(&tx, task_id)?;
        let detached = detach_task_entries(&tx, task_id)?;
        delete_task(&tx, task_id)?;
        audit(
            &tx,
            ctx.actor(),
            "delete",
            object::TASK,
            Some(task_id),
            &format!("{} ({} entries detached)", task.name, detached),
        )?;
        tx.commit()?;
        Ok(detached)
    }

    /// Overwrite the running total with the sum of linked entries.
    pub fn reconcile(pool: &mut DbPool, ctx: &Context, task_id: i64) -> AppResult<(f64, f64)> {
        let tx = pool.conn.transaction()?;
        let (before, after) = reconcile_in(&tx, ctx, task_id)?;
        tx.commit()?;
        Ok((before, after))
    }
}

fn reconcile_in(conn: &Connection, ctx: &Context, task_id: i64) -> AppResult<(f64, f64)> {
    let before = load_task(conn, task_id)?.actual_hours;
    let after = task_entry_hours(conn, task_id)?;
    must_touch(set_actual_hours(conn, task_id, after)?, task_id, "reconciling")?;
    audit(
        conn,
        ctx.actor(),
        "reconcile",
        object::TASK,
        Some(task_id),
        &format!("{:.2}h -> {:.2}h", before, after),
    )?;
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add::AddLogic;
    use crate::core::context::testing::*;
    use crate::core::edit::EditLogic;
    use crate::db::queries::{load_entry, logged_hours};
    use crate::notify::testing::MemoryNotifier;

    #[test]
    fn assign_and_unassign_move_hours() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let task = task(&pool, wo, 8.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(11, 0)))
            .unwrap()
            .entry
            .id;

        TaskLogic::assign(&mut pool, &ctx, id, task).unwrap();
        // assigning twice does not double count
        TaskLogic::assign(&mut pool, &ctx, id, task).unwrap();
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 3.0);

        TaskLogic::unassign(&mut pool, &ctx, id, task).unwrap();
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 0.0);
        assert!(matches!(
            TaskLogic::unassign(&mut pool, &ctx, id, task),
            Err(AppError::EntryNotOnTask { .. })
        ));
    }

    #[test]
    fn reassigning_between_tasks_moves_hours() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let first = task(&pool, wo, 8.0);
        let second = task(&pool, wo, 8.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0)))
            .unwrap()
            .entry
            .id;

        TaskLogic::assign(&mut pool, &ctx, id, first).unwrap();
        TaskLogic::assign(&mut pool, &ctx, id, second).unwrap();
        assert_eq!(load_task(&pool.conn, first).unwrap().actual_hours, 0.0);
        assert_eq!(load_task(&pool.conn, second).unwrap().actual_hours, 2.0);
    }

    #[test]
    fn task_of_other_work_order_is_a_mismatch() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let other = work_order(&pool, "WO-2", 0.0);
        let task = task(&pool, other, 8.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0)))
            .unwrap()
            .entry
            .id;

        assert!(matches!(
            TaskLogic::assign(&mut pool, &ctx, id, task),
            Err(AppError::TaskWorkOrderMismatch { entry_id, task_id }) if entry_id == id && task_id == task
        ));
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 0.0);
    }

    #[test]
    fn locked_entry_cannot_change_task() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let task = task(&pool, wo, 8.0);
        let id = AddLogic::apply(&mut pool, &ctx, new_entry(wo, "A", t(8, 0), t(10, 0)))
            .unwrap()
            .entry
            .id;
        EditLogic::flags(&mut pool, &ctx, id, Some(true), None).unwrap();

        assert!(matches!(
            TaskLogic::assign(&mut pool, &ctx, id, task),
            Err(AppError::EntryLocked { .. })
        ));
    }

    #[test]
    fn deleting_task_detaches_entries_and_keeps_hours() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let task = task(&pool, wo, 8.0);
        let mut e = new_entry(wo, "A", t(8, 0), t(12, 0));
        e.task_id = Some(task);
        let id = AddLogic::apply(&mut pool, &ctx, e).unwrap().entry.id;

        assert_eq!(TaskLogic::delete_task(&mut pool, &ctx, task).unwrap(), 1);
        let entry = load_entry(&pool.conn, id).unwrap();
        assert_eq!(entry.task_id, None);
        assert_eq!(entry.hours_worked, 4.0);
        assert_eq!(logged_hours(&pool.conn, wo).unwrap(), 4.0);
    }

    #[test]
    fn reconcile_rebuilds_total_from_entries() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let task = task(&pool, wo, 8.0);
        let mut e = new_entry(wo, "A", t(8, 0), t(12, 0));
        e.task_id = Some(task);
        AddLogic::apply(&mut pool, &ctx, e).unwrap();
        set_actual_hours(&pool.conn, task, 42.0).unwrap();

        let (before, after) = TaskLogic::reconcile(&mut pool, &ctx, task).unwrap();
        assert_eq!((before, after), (42.0, 4.0));
        assert_eq!(load_task(&pool.conn, task).unwrap().actual_hours, 4.0);
    }

    #[test]
    fn deleting_project_detaches_entries() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);
        let task = task(&pool, wo, 8.0);
        let project = load_task(&pool.conn, task).unwrap().project_id;
        let mut e = new_entry(wo, "A", t(8, 0), t(12, 0));
        e.task_id = Some(task);
        let id = AddLogic::apply(&mut pool, &ctx, e).unwrap().entry.id;

        TaskLogic::delete_project(&mut pool, &ctx, project).unwrap();
        assert!(load_task(&pool.conn, task).is_err());
        assert_eq!(load_entry(&pool.conn, id).unwrap().task_id, None);
    }
}
