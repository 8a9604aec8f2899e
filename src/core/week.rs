use crate::db::queries::load_entries_for_engineer_range;
use crate::errors::AppResult;
use crate::models::TimeEntry;
use crate::utils::date::days_between;
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub entries: Vec<TimeEntry>,
    pub hours: f64,
}

/// One engineer's Sunday–Saturday week.
#[derive(Debug, Clone)]
pub struct WeekView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayTotal>,
}

impl WeekView {
    pub fn total_hours(&self) -> f64 {
        self.days.iter().map(|d| d.hours).sum()
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn build_week(conn: &Connection, engineer: &str, any_day: NaiveDate) -> AppResult<WeekView> {
    let start = week_start(any_day);
    let end = start + Duration::days(6);
    let entries = load_entries_for_engineer_range(conn, engineer, &start, &end)?;

    let days = days_between(start, end)
        .into_iter()
        .map(|date| {
            let entries: Vec<TimeEntry> = entries
                .iter()
                .filter(|e| e.work_date == date)
                .cloned()
                .collect();
            let hours = entries.iter().map(|e| e.hours_worked).sum();
            DayTotal { date, entries, hours }
        })
        .collect();

    Ok(WeekView { start, end, days })
}
