//! Storage contract for time entries.
//!
//! Every function takes a plain `&Connection`; callers pass a
//! `rusqlite::Transaction` (it derefs to one) when the call is part of a
//! multi-step mutation.

use crate::errors::{AppError, AppResult};
use crate::models::{LunchWindow, TimeEntry};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const ENTRY_COLUMNS: &str = "id, work_order_id, task_id, engineer, work_date, time_in, time_out, \
     hours_worked, lunch_deduction, lunch_start, lunch_end, description, created_at, \
     entered_on_jl, entered_on_jt";

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M:%S";

pub fn date_to_db(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub fn time_to_db(t: &NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

fn conversion_error(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(AppError::InvalidTimeRange(format!("invalid {}: {}", what, value))),
    )
}

pub(crate) fn date_from_db(idx: usize, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|_| conversion_error(idx, "date", s))
}

fn time_from_db(idx: usize, s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| conversion_error(idx, "time", s))
}

pub fn map_entry(row: &Row) -> Result<TimeEntry> {
    let date_str: String = row.get("work_date")?;
    let in_str: String = row.get("time_in")?;
    let out_str: String = row.get("time_out")?;
    let lunch_start: Option<String> = row.get("lunch_start")?;
    let lunch_end: Option<String> = row.get("lunch_end")?;

    let lunch = match (lunch_start, lunch_end) {
        (Some(s), Some(e)) => Some(LunchWindow::new(time_from_db(9, &s)?, time_from_db(10, &e)?)),
        _ => None,
    };

    Ok(TimeEntry {
        id: row.get("id")?,
        work_order_id: row.get("work_order_id")?,
        task_id: row.get("task_id")?,
        engineer: row.get("engineer")?,
        work_date: date_from_db(4, &date_str)?,
        time_in: time_from_db(5, &in_str)?,
        time_out: time_from_db(6, &out_str)?,
        hours_worked: row.get("hours_worked")?,
        lunch_deduction: row.get("lunch_deduction")?,
        lunch,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        entered_on_jl: row.get::<_, i64>("entered_on_jl")? != 0,
        entered_on_jt: row.get::<_, i64>("entered_on_jt")? != 0,
    })
}

fn collect(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> AppResult<Vec<TimeEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_entry(conn: &Connection, id: i64) -> AppResult<Option<TimeEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_entry).optional()?)
}

pub fn load_entry(conn: &Connection, id: i64) -> AppResult<TimeEntry> {
    find_entry(conn, id)?.ok_or_else(|| AppError::not_found("time entry", id))
}

/// Every entry of `engineer` on `date`, across all work orders, in storage
/// order. `exclude` drops the entry being edited.
pub fn load_entries_for_engineer_day(
    conn: &Connection,
    engineer: &str,
    date: &NaiveDate,
    exclude: Option<i64>,
) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE engineer = ?1 AND work_date = ?2 AND (?3 IS NULL OR id != ?3)
         ORDER BY id ASC"
    );
    collect(conn, &sql, &[&engineer, &date_to_db(date), &exclude])
}

pub fn load_entries_by_work_order(conn: &Connection, work_order_id: i64) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE work_order_id = ?1 ORDER BY work_date ASC, time_in ASC, id ASC"
    );
    collect(conn, &sql, &[&work_order_id])
}

pub fn load_entries_by_task(conn: &Connection, task_id: i64) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE task_id = ?1 ORDER BY work_date DESC, id ASC"
    );
    collect(conn, &sql, &[&task_id])
}

/// One engineer's entries between two dates inclusive, oldest first.
pub fn load_entries_for_engineer_range(
    conn: &Connection,
    engineer: &str,
    start: &NaiveDate,
    end: &NaiveDate,
) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE engineer = ?1 AND work_date BETWEEN ?2 AND ?3
         ORDER BY work_date ASC, time_in ASC"
    );
    collect(conn, &sql, &[&engineer, &date_to_db(start), &date_to_db(end)])
}

pub fn load_all_entries(conn: &Connection) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries ORDER BY work_date ASC, time_in ASC, id ASC"
    );
    collect(conn, &sql, &[])
}

pub fn insert_entry(conn: &Connection, e: &TimeEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_entries (work_order_id, task_id, engineer, work_date, time_in, time_out,
             hours_worked, lunch_deduction, lunch_start, lunch_end, description, created_at,
             entered_on_jl, entered_on_jt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            e.work_order_id,
            e.task_id,
            e.engineer,
            date_to_db(&e.work_date),
            time_to_db(&e.time_in),
            time_to_db(&e.time_out),
            e.hours_worked,
            e.lunch_deduction,
            e.lunch.map(|l| time_to_db(&l.start)),
            e.lunch.map(|l| time_to_db(&l.end)),
            e.description,
            e.created_at,
            e.entered_on_jl as i64,
            e.entered_on_jt as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrite the editable fields of an entry (flags, owner and task untouched).
pub fn update_entry_fields(conn: &Connection, e: &TimeEntry) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE time_entries
         SET engineer = ?1, work_date = ?2, time_in = ?3, time_out = ?4,
             hours_worked = ?5, lunch_deduction = ?6, lunch_start = ?7, lunch_end = ?8,
             description = ?9
         WHERE id = ?10",
        params![
            e.engineer,
            date_to_db(&e.work_date),
            time_to_db(&e.time_in),
            time_to_db(&e.time_out),
            e.hours_worked,
            e.lunch_deduction,
            e.lunch.map(|l| time_to_db(&l.start)),
            e.lunch.map(|l| time_to_db(&l.end)),
            e.description,
            e.id,
        ],
    )?;
    expect_one(n, "time entry", e.id)
}

pub fn update_flags(conn: &Connection, id: i64, jl: bool, jt: bool) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE time_entries SET entered_on_jl = ?1, entered_on_jt = ?2 WHERE id = ?3",
        params![jl as i64, jt as i64, id],
    )?;
    expect_one(n, "time entry", id)
}

pub fn set_entry_work_order(conn: &Connection, id: i64, work_order_id: i64) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE time_entries SET work_order_id = ?1 WHERE id = ?2",
        params![work_order_id, id],
    )?;
    expect_one(n, "time entry", id)
}

pub fn set_entry_task(conn: &Connection, id: i64, task_id: Option<i64>) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE time_entries SET task_id = ?1 WHERE id = ?2",
        params![task_id, id],
    )?;
    expect_one(n, "time entry", id)
}

/// Detach every entry from a task; returns how many were attached.
pub fn detach_task_entries(conn: &Connection, task_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE time_entries SET task_id = NULL WHERE task_id = ?1",
        [task_id],
    )?)
}

pub fn delete_entry(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute("DELETE FROM time_entries WHERE id = ?1", [id])?;
    expect_one(n, "time entry", id)
}

/// Sum of `hours_worked` over the current full set of a work order's
/// entries. Never a cached counter.
pub fn logged_hours(conn: &Connection, work_order_id: i64) -> AppResult<f64> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(hours_worked), 0.0) FROM time_entries WHERE work_order_id = ?1",
        [work_order_id],
        |row| row.get(0),
    )?)
}

pub fn task_entry_hours(conn: &Connection, task_id: i64) -> AppResult<f64> {
    Ok(conn.query_row(
        "SELECT COALESCE(SUM(hours_worked), 0.0) FROM time_entries WHERE task_id = ?1",
        [task_id],
        |row| row.get(0),
    )?)
}

fn expect_one(n: usize, kind: &str, id: i64) -> AppResult<()> {
    if n == 0 {
        return Err(AppError::not_found(kind, id));
    }
    Ok(())
}
