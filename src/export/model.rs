// src/export/model.rs

use crate::models::{TimeEntry, WorkOrder};
use crate::utils::time::format_time;
use serde::Serialize;

/// Flat row for CSV / JSON export of time entries.
#[derive(Serialize, Clone, Debug)]
pub struct EntryExport {
    pub id: i64,
    pub job_number: String,
    pub engineer: String,
    pub date: String,
    pub time_in: String,
    pub time_out: String,
    pub lunch_start: String,
    pub lunch_end: String,
    pub lunch_deduction: f64,
    pub hours_worked: f64,
    pub task_id: Option<i64>,
    pub description: String,
    pub entered_on_jl: bool,
    pub entered_on_jt: bool,
}

impl EntryExport {
    pub fn from_entry(e: &TimeEntry, wo: &WorkOrder) -> Self {
        Self {
            id: e.id,
            job_number: wo.job_number.clone(),
            engineer: e.engineer.clone(),
            date: e.work_date.format("%Y-%m-%d").to_string(),
            time_in: format_time(e.time_in),
            time_out: format_time(e.time_out),
            lunch_start: e.lunch.map(|l| format_time(l.start)).unwrap_or_default(),
            lunch_end: e.lunch.map(|l| format_time(l.end)).unwrap_or_default(),
            lunch_deduction: e.lunch_deduction,
            hours_worked: e.hours_worked,
            task_id: e.task_id,
            description: e.description.clone(),
            entered_on_jl: e.entered_on_jl,
            entered_on_jt: e.entered_on_jt,
        }
    }
}
