use crate::db::queries::{date_from_db, date_to_db};
use crate::errors::{AppError, AppResult};
use crate::models::{NewWorkOrder, Priority, WorkOrder, WorkOrderStatus};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const WO_COLUMNS: &str = "id, customer_work_order_number, job_number, description, status, owner, \
     estimated_hours, priority, location, scheduled_date, classification, approved_for_work, created_at";

fn enum_error(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(AppError::InvalidValue(format!("{}: {}", what, value))),
    )
}

pub fn map_work_order(row: &Row) -> rusqlite::Result<WorkOrder> {
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;
    let scheduled: Option<String> = row.get("scheduled_date")?;

    Ok(WorkOrder {
        id: row.get("id")?,
        customer_work_order_number: row.get("customer_work_order_number")?,
        job_number: row.get("job_number")?,
        description: row.get("description")?,
        status: WorkOrderStatus::from_db_str(&status)
            .ok_or_else(|| enum_error(4, "status", &status))?,
        owner: row.get("owner")?,
        estimated_hours: row.get("estimated_hours")?,
        priority: Priority::from_db_str(&priority)
            .ok_or_else(|| enum_error(7, "priority", &priority))?,
        location: row.get("location")?,
        scheduled_date: scheduled.map(|s| date_from_db(9, &s)).transpose()?,
        classification: row.get("classification")?,
        approved_for_work: row.get::<_, i64>("approved_for_work")? != 0,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_work_order(conn: &Connection, wo: &NewWorkOrder) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO work_orders (customer_work_order_number, job_number, description, status,
             owner, estimated_hours, priority, location, scheduled_date, classification, created_at)
         VALUES (?1, ?2, ?3, 'Open', ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            wo.customer_work_order_number,
            wo.job_number,
            wo.description,
            wo.owner,
            wo.estimated_hours,
            wo.priority.to_db_str(),
            wo.location,
            wo.scheduled_date.as_ref().map(date_to_db),
            wo.classification,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_work_order(conn: &Connection, id: i64) -> AppResult<Option<WorkOrder>> {
    let sql = format!("SELECT {WO_COLUMNS} FROM work_orders WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_work_order).optional()?)
}

pub fn load_work_order(conn: &Connection, id: i64) -> AppResult<WorkOrder> {
    find_work_order(conn, id)?.ok_or_else(|| AppError::not_found("work order", id))
}

pub fn find_by_job_number(conn: &Connection, job_number: &str) -> AppResult<Option<WorkOrder>> {
    let sql = format!("SELECT {WO_COLUMNS} FROM work_orders WHERE job_number = ?1");
    Ok(conn.query_row(&sql, [job_number], map_work_order).optional()?)
}

pub fn list_work_orders(
    conn: &Connection,
    status: Option<WorkOrderStatus>,
) -> AppResult<Vec<WorkOrder>> {
    let sql = format!(
        "SELECT {WO_COLUMNS} FROM work_orders
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([status.map(|s| s.to_db_str())], map_work_order)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Work orders scheduled exactly on `date`, excluding closed ones.
pub fn scheduled_on(conn: &Connection, date: &NaiveDate) -> AppResult<Vec<WorkOrder>> {
    let sql = format!(
        "SELECT {WO_COLUMNS} FROM work_orders
         WHERE scheduled_date = ?1 AND status != 'Closed'
         ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([date_to_db(date)], map_work_order)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_status(conn: &Connection, id: i64, status: WorkOrderStatus) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE work_orders SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    if n == 0 {
        return Err(AppError::not_found("work order", id));
    }
    Ok(())
}

pub fn set_approved(conn: &Connection, id: i64, approved: bool) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE work_orders SET approved_for_work = ?1 WHERE id = ?2",
        params![approved as i64, id],
    )?;
    if n == 0 {
        return Err(AppError::not_found("work order", id));
    }
    Ok(())
}

/// Removes the work order; entries and projects go with it.
pub fn delete_work_order(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute("DELETE FROM work_orders WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::not_found("work order", id));
    }
    Ok(())
}

pub fn job_number_of(conn: &Connection, id: i64) -> AppResult<Option<String>> {
    Ok(conn
        .query_row("SELECT job_number FROM work_orders WHERE id = ?1", [id], |r| r.get(0))
        .optional()?)
}
