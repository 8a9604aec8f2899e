use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result, params};

/// Ensure that the `change_log` table exists. It also records which
/// migrations have been applied, so it has to come first.
fn ensure_change_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS change_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp   TEXT NOT NULL,
            actor       TEXT,
            action      TEXT NOT NULL,
            object_type TEXT NOT NULL,
            object_id   INTEGER,
            description TEXT DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_change_log_object ON change_log(object_type, object_id);
        "#,
    )?;
    Ok(())
}

const CREATE_WORK_ORDERS: &str = r#"
    CREATE TABLE IF NOT EXISTS work_orders (
        id                          INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_work_order_number  TEXT,
        job_number                  TEXT NOT NULL UNIQUE,
        description                 TEXT NOT NULL,
        status                      TEXT NOT NULL DEFAULT 'Open'
                                    CHECK(status IN ('Open','Complete','Closed')),
        owner                       TEXT,
        estimated_hours             REAL NOT NULL DEFAULT 0,
        priority                    TEXT NOT NULL DEFAULT 'Medium'
                                    CHECK(priority IN ('Low','Medium','High')),
        location                    TEXT,
        scheduled_date              TEXT,
        classification              TEXT NOT NULL DEFAULT 'Billable',
        approved_for_work           INTEGER NOT NULL DEFAULT 0,
        created_at                  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_work_orders_status ON work_orders(status);
    CREATE INDEX IF NOT EXISTS idx_work_orders_scheduled ON work_orders(scheduled_date);
"#;

const CREATE_PROJECTS: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        work_order_id INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
        name          TEXT NOT NULL,
        description   TEXT NOT NULL DEFAULT '',
        status        TEXT NOT NULL DEFAULT 'Planning',
        start_date    TEXT,
        end_date      TEXT,
        created_at    TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_tasks (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id       INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        name             TEXT NOT NULL,
        description      TEXT NOT NULL DEFAULT '',
        status           TEXT NOT NULL DEFAULT 'Not Started',
        priority         TEXT NOT NULL DEFAULT 'Medium',
        estimated_hours  REAL NOT NULL DEFAULT 0,
        actual_hours     REAL NOT NULL DEFAULT 0,
        progress_percent INTEGER CHECK(progress_percent IS NULL OR progress_percent BETWEEN 0 AND 100),
        dependencies     TEXT NOT NULL DEFAULT '',
        assigned_to      TEXT,
        position         INTEGER NOT NULL DEFAULT 0,
        created_at       TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_projects_work_order ON projects(work_order_id);
    CREATE INDEX IF NOT EXISTS idx_project_tasks_project ON project_tasks(project_id);
"#;

const CREATE_TIME_ENTRIES: &str = r#"
    CREATE TABLE IF NOT EXISTS time_entries (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        work_order_id   INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
        task_id         INTEGER REFERENCES project_tasks(id) ON DELETE SET NULL,
        engineer        TEXT NOT NULL,
        work_date       TEXT NOT NULL,
        time_in         TEXT NOT NULL,
        time_out        TEXT NOT NULL,
        hours_worked    REAL NOT NULL,
        lunch_deduction REAL NOT NULL DEFAULT 0,
        lunch_start     TEXT,
        lunch_end       TEXT,
        description     TEXT NOT NULL DEFAULT '',
        created_at      TEXT NOT NULL,
        entered_on_jl   INTEGER NOT NULL DEFAULT 0,
        entered_on_jt   INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_time_entries_engineer_date ON time_entries(engineer, work_date);
    CREATE INDEX IF NOT EXISTS idx_time_entries_work_order ON time_entries(work_order_id);
    CREATE INDEX IF NOT EXISTS idx_time_entries_task ON time_entries(task_id);
"#;

/// Ordered schema migrations: (version, description, sql).
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20240101_0001_work_orders",
        "Created work_orders table",
        CREATE_WORK_ORDERS,
    ),
    (
        "20240101_0002_projects_and_tasks",
        "Created projects and project_tasks tables",
        CREATE_PROJECTS,
    ),
    (
        "20240101_0003_time_entries",
        "Created time_entries table",
        CREATE_TIME_ENTRIES,
    ),
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM change_log
         WHERE action = 'migration_applied' AND description = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, version: &str, message: &str, sql: &str) -> Result<()> {
    // DDL and its marker land together or not at all
    conn.execute_batch("BEGIN;")?;

    let res = conn.execute_batch(sql).and_then(|_| {
        conn.execute(
            "INSERT INTO change_log (timestamp, actor, action, object_type, object_id, description)
             VALUES (datetime('now'), NULL, 'migration_applied', 'Schema', NULL, ?1)",
            params![version],
        )
    });

    match res {
        Ok(_) => {
            conn.execute_batch("COMMIT;")?;
            success(format!("Migration applied: {} → {}", version, message));
            Ok(())
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK;").ok();
            Err(e)
        }
    }
}

/// Names of applied migrations, oldest first.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    ensure_change_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT description FROM change_log WHERE action = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db(). Safe to call on every start.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_change_log_table(conn)?;

    for (version, message, sql) in MIGRATIONS {
        if !is_applied(conn, version)? {
            apply(conn, version, message, sql)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let applied = applied_migrations(&conn).unwrap();
        assert_eq!(applied.len(), MIGRATIONS.len());
        assert_eq!(applied[0], "20240101_0001_work_orders");
    }

    #[test]
    fn schema_has_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        for table in ["work_orders", "projects", "project_tasks", "time_entries", "change_log"] {
            let found: Option<String> = conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |r| r.get(0),
                )
                .optional()
                .unwrap();
            assert!(found.is_some(), "missing table {table}");
        }
    }
}
