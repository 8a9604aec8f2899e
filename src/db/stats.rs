use crate::db::migrate::applied_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Row counts and date span shown by `db --info`.
#[derive(Debug, Default, PartialEq)]
pub struct DbStats {
    pub work_orders: i64,
    pub projects: i64,
    pub tasks: i64,
    pub entries: i64,
    pub locked_entries: i64,
    pub total_hours: f64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

pub fn collect_stats(pool: &DbPool) -> AppResult<DbStats> {
    let count = |table: &str| -> rusqlite::Result<i64> {
        pool.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    };

    let (first_date, last_date) = pool
        .conn
        .query_row(
            "SELECT MIN(work_date), MAX(work_date) FROM time_entries",
            [],
            |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?
        .unwrap_or((None, None));

    Ok(DbStats {
        work_orders: count("work_orders")?,
        projects: count("projects")?,
        tasks: count("project_tasks")?,
        entries: count("time_entries")?,
        locked_entries: pool.conn.query_row(
            "SELECT COUNT(*) FROM time_entries WHERE entered_on_jl = 1 OR entered_on_jt = 1",
            [],
            |row| row.get(0),
        )?,
        total_hours: pool.conn.query_row(
            "SELECT COALESCE(SUM(hours_worked), 0.0) FROM time_entries",
            [],
            |row| row.get(0),
        )?,
        first_date,
        last_date,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    let s = collect_stats(pool)?;

    println!("{}• Work orders:{} {}{}{}", CYAN, RESET, GREEN, s.work_orders, RESET);
    println!("{}• Projects / tasks:{} {} / {}", CYAN, RESET, s.projects, s.tasks);
    println!(
        "{}• Time entries:{} {}{}{} ({} locked)",
        CYAN, RESET, GREEN, s.entries, RESET, s.locked_entries
    );
    println!("{}• Hours logged:{} {:.2}", CYAN, RESET, s.total_hours);
    println!(
        "{}• Migrations applied:{} {}",
        CYAN,
        RESET,
        applied_migrations(&pool.conn)?.len()
    );

    let dash = format!("{GREY}--{RESET}");
    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", s.first_date.as_deref().unwrap_or(&dash));
    println!("    to:   {}", s.last_date.as_deref().unwrap_or(&dash));

    println!();
    Ok(())
}
