//! Projects and their tasks.
//!
//! `actual_hours` on a task is a running total: entry writes move it with
//! [`adjust_actual_hours`], and only an explicit reconcile overwrites it.

use crate::db::queries::{date_from_db, date_to_db};
use crate::errors::{AppError, AppResult};
use crate::models::{Project, ProjectTask, TaskStatus};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "id, project_id, name, description, status, priority, estimated_hours, \
     actual_hours, progress_percent, dependencies, assigned_to, position";

fn map_project(row: &Row) -> rusqlite::Result<Project> {
    let start: Option<String> = row.get("start_date")?;
    let end: Option<String> = row.get("end_date")?;
    Ok(Project {
        id: row.get("id")?,
        work_order_id: row.get("work_order_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: row.get("status")?,
        start_date: start.map(|s| date_from_db(5, &s)).transpose()?,
        end_date: end.map(|s| date_from_db(6, &s)).transpose()?,
    })
}

fn map_task(row: &Row) -> rusqlite::Result<ProjectTask> {
    let status: String = row.get("status")?;
    let progress: Option<i64> = row.get("progress_percent")?;
    Ok(ProjectTask {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: TaskStatus::from_db_str(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                Box::new(AppError::InvalidValue(format!("task status: {}", status))),
            )
        })?,
        priority: row.get("priority")?,
        estimated_hours: row.get("estimated_hours")?,
        actual_hours: row.get("actual_hours")?,
        progress_percent: progress.map(|p| p.clamp(0, 100) as u8),
        dependencies: row.get("dependencies")?,
        assigned_to: row.get("assigned_to")?,
        position: row.get("position")?,
    })
}

// ---------------------------
// Projects
// ---------------------------

pub fn insert_project(
    conn: &Connection,
    work_order_id: i64,
    name: &str,
    description: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO projects (work_order_id, name, description, start_date, end_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            work_order_id,
            name,
            description,
            start_date.as_ref().map(date_to_db),
            end_date.as_ref().map(date_to_db),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_project(conn: &Connection, id: i64) -> AppResult<Project> {
    conn.query_row(
        "SELECT id, work_order_id, name, description, status, start_date, end_date
         FROM projects WHERE id = ?1",
        [id],
        map_project,
    )
    .optional()?
    .ok_or_else(|| AppError::not_found("project", id))
}

pub fn list_projects(conn: &Connection, work_order_id: i64) -> AppResult<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT id, work_order_id, name, description, status, start_date, end_date
         FROM projects WHERE work_order_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([work_order_id], map_project)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Removes the project; its tasks go with it and their entries are detached.
pub fn delete_project(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::not_found("project", id));
    }
    Ok(())
}

// ---------------------------
// Tasks
// ---------------------------

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub priority: String,
    pub estimated_hours: f64,
    pub dependencies: String,
    pub assigned_to: Option<String>,
}

pub fn insert_task(conn: &Connection, t: &NewTask) -> AppResult<i64> {
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM project_tasks WHERE project_id = ?1",
        [t.project_id],
        |r| r.get(0),
    )?;

    conn.execute(
        "INSERT INTO project_tasks (project_id, name, description, priority, estimated_hours,
             dependencies, assigned_to, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            t.project_id,
            t.name,
            t.description,
            t.priority,
            t.estimated_hours,
            t.dependencies,
            t.assigned_to,
            position,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_task(conn: &Connection, id: i64) -> AppResult<Option<ProjectTask>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM project_tasks WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_task).optional()?)
}

pub fn load_task(conn: &Connection, id: i64) -> AppResult<ProjectTask> {
    find_task(conn, id)?.ok_or_else(|| AppError::not_found("task", id))
}

pub fn list_tasks(conn: &Connection, project_id: i64) -> AppResult<Vec<ProjectTask>> {
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM project_tasks WHERE project_id = ?1 ORDER BY position ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([project_id], map_task)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_task_status(
    conn: &Connection,
    id: i64,
    status: TaskStatus,
    progress: Option<u8>,
) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE project_tasks SET status = ?1, progress_percent = COALESCE(?2, progress_percent)
         WHERE id = ?3",
        params![status.to_db_str(), progress.map(i64::from), id],
    )?;
    if n == 0 {
        return Err(AppError::not_found("task", id));
    }
    Ok(())
}

/// Move a task's running total by `delta` hours, never below zero.
///
/// Returns the number of rows touched so callers can tell a vanished task
/// apart from a successful update.
pub fn adjust_actual_hours(conn: &Connection, task_id: i64, delta: f64) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE project_tasks SET actual_hours = MAX(0.0, actual_hours + ?1) WHERE id = ?2",
        params![delta, task_id],
    )?)
}

pub fn set_actual_hours(conn: &Connection, task_id: i64, hours: f64) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE project_tasks SET actual_hours = ?1 WHERE id = ?2",
        params![hours, task_id],
    )?)
}

pub fn delete_task(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute("DELETE FROM project_tasks WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::not_found("task", id));
    }
    Ok(())
}

/// Work order that owns the task's project.
pub fn work_order_of_task(conn: &Connection, task_id: i64) -> AppResult<i64> {
    conn.query_row(
        "SELECT p.work_order_id FROM project_tasks t
         JOIN projects p ON p.id = t.project_id
         WHERE t.id = ?1",
        [task_id],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::not_found("task", task_id))
}
