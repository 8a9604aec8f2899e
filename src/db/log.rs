use crate::errors::AppResult;
use crate::models::ChangeLogRow;
use chrono::Utc;
use rusqlite::{Connection, params};

/// Kinds of objects recorded in the audit trail.
pub mod object {
    pub const TIME_ENTRY: &str = "TimeEntry";
    pub const WORK_ORDER: &str = "WorkOrder";
    pub const PROJECT: &str = "Project";
    pub const TASK: &str = "ProjectTask";
    pub const NOTIFICATION: &str = "Notification";
    pub const SCHEMA: &str = "Schema";
}

/// Write one audit record into `change_log`.
///
/// Pass the open transaction as `conn` so the record commits or rolls back
/// together with the mutation it describes.
pub fn audit(
    conn: &Connection,
    actor: Option<&str>,
    action: &str,
    object_type: &str,
    object_id: Option<i64>,
    description: &str,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO change_log (timestamp, actor, action, object_type, object_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    stmt.execute(params![now, actor, action, object_type, object_id, description])?;

    Ok(())
}

pub fn load_change_log(conn: &Connection, limit: Option<usize>) -> AppResult<Vec<ChangeLogRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, actor, action, object_type, object_id, description
         FROM change_log ORDER BY id DESC LIMIT ?1",
    )?;

    // SQLite treats a negative LIMIT as "no limit"
    let lim: i64 = limit.map(|l| l as i64).unwrap_or(-1);

    let rows = stmt.query_map([lim], |row| {
        Ok(ChangeLogRow {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            actor: row.get(2)?,
            action: row.get(3)?,
            object_type: row.get(4)?,
            object_id: row.get(5)?,
            description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    out.reverse();
    Ok(out)
}

/// Audit rows about one object, oldest first.
pub fn load_for_object(
    conn: &Connection,
    object_type: &str,
    object_id: i64,
) -> AppResult<Vec<ChangeLogRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, actor, action, object_type, object_id, description
         FROM change_log WHERE object_type = ?1 AND object_id = ?2 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![object_type, object_id], |row| {
        Ok(ChangeLogRow {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            actor: row.get(2)?,
            action: row.get(3)?,
            object_type: row.get(4)?,
            object_id: row.get(5)?,
            description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    #[test]
    fn audit_rows_roll_back_with_their_transaction() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let before = load_change_log(&conn, None).unwrap().len();

        {
            let tx = conn.transaction().unwrap();
            audit(&tx, Some("tester"), "Deleted TimeEntry", object::TIME_ENTRY, Some(1), "x")
                .unwrap();
            // dropped without commit
        }
        assert_eq!(load_change_log(&conn, None).unwrap().len(), before);

        audit(&conn, None, "Created WorkOrder", object::WORK_ORDER, Some(3), "y").unwrap();
        let rows = load_for_object(&conn, object::WORK_ORDER, 3).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "Created WorkOrder");
        assert_eq!(rows[0].actor, None);
    }
}
