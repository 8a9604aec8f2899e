use crate::cli::commands::{Runtime, optional_date};
use crate::cli::parser::Commands;
use crate::db::queries::{
    load_all_entries, load_entries_by_task, load_entries_by_work_order,
    load_entries_for_engineer_day,
};
use crate::db::work_orders::job_number_of;
use crate::errors::{AppError, AppResult};
use crate::models::TimeEntry;
use crate::ui::messages::info;
use crate::utils::colors::colorize_lock;
use crate::utils::format_hours;
use crate::utils::formatting::truncate;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_time;
use std::collections::HashMap;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::List {
        work_order,
        engineer,
        date,
        task,
    } = cmd
    else {
        return Ok(());
    };

    let pool = rt.open_db()?;
    let date = optional_date(date.as_ref())?;

    let mut entries = match (task, work_order, engineer, date) {
        (Some(t), _, _, _) => load_entries_by_task(&pool.conn, *t)?,
        (None, Some(wo), _, _) => load_entries_by_work_order(&pool.conn, *wo)?,
        (None, None, Some(eng), Some(d)) => {
            load_entries_for_engineer_day(&pool.conn, eng, &d, None)?
        }
        (None, None, None, Some(_)) => {
            return Err(AppError::InvalidValue("--date needs --engineer".into()));
        }
        _ => load_all_entries(&pool.conn)?,
    };

    entries.retain(|e| {
        work_order.is_none_or(|wo| e.work_order_id == wo)
            && engineer.as_ref().is_none_or(|eng| &e.engineer == eng)
            && date.is_none_or(|d| e.work_date == d)
    });

    if entries.is_empty() {
        info("No time entries found.");
        return Ok(());
    }

    let mut jobs: HashMap<i64, String> = HashMap::new();
    for e in &entries {
        if !jobs.contains_key(&e.work_order_id) {
            let job = job_number_of(&pool.conn, e.work_order_id)?.unwrap_or_default();
            jobs.insert(e.work_order_id, job);
        }
    }

    print!("{}", render(&entries, &jobs));
    let total: f64 = entries.iter().map(|e| e.hours_worked).sum();
    println!("Total: {} in {} entries", format_hours(total), entries.len());
    Ok(())
}

fn render(entries: &[TimeEntry], jobs: &HashMap<i64, String>) -> String {
    let mut table = Table::new(vec![
        Column::new("ID", 5),
        Column::new("JOB", 10),
        Column::new("ENGINEER", 12),
        Column::new("DATE", 10),
        Column::new("IN", 5),
        Column::new("OUT", 5),
        Column::new("LUNCH", 11),
        Column::new("HOURS", 8),
        Column::new("TASK", 5),
        Column::new("STATE", 6),
        Column::new("DESCRIPTION", 24),
    ]);

    for e in entries {
        table.add_row(vec![
            e.id.to_string(),
            jobs.get(&e.work_order_id).cloned().unwrap_or_default(),
            truncate(&e.engineer, 12),
            e.work_date.to_string(),
            format_time(e.time_in),
            format_time(e.time_out),
            e.lunch
                .map(|l| format!("{}-{}", format_time(l.start), format_time(l.end)))
                .unwrap_or_else(|| "-".into()),
            format!("{:.2}", e.hours_worked),
            e.task_id.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
            colorize_lock(e.is_locked()),
            truncate(&e.description, 24),
        ]);
    }

    table.render()
}
