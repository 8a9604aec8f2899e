use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// A declared lunch break (clock times on the entry's work date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LunchWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LunchWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Both ends or neither: a half-declared lunch is a range error.
    pub fn from_parts(start: Option<NaiveTime>, end: Option<NaiveTime>) -> AppResult<Option<Self>> {
        match (start, end) {
            (Some(s), Some(e)) => Ok(Some(Self::new(s, e))),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidTimeRange(
                "lunch needs both a start and an end time".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub work_order_id: i64, // ⇔ time_entries.work_order_id (ON DELETE CASCADE)
    pub task_id: Option<i64>, // ⇔ time_entries.task_id (ON DELETE SET NULL)
    pub engineer: String,
    pub work_date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
    pub hours_worked: f64,
    pub lunch_deduction: f64,
    pub lunch: Option<LunchWindow>,
    pub description: String,
    pub created_at: String, // ISO 8601, UTC
    pub entered_on_jl: bool,
    pub entered_on_jt: bool,
}

impl TimeEntry {
    /// Exported to either accounting system. Always read from the current
    /// flags, never cached.
    pub fn is_locked(&self) -> bool {
        self.entered_on_jl || self.entered_on_jt
    }

    pub fn ensure_unlocked(&self) -> AppResult<()> {
        if self.is_locked() {
            return Err(AppError::EntryLocked { entry_id: self.id });
        }
        Ok(())
    }
}

/// Input of every logging route (single add, timesheet row, import row).
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub work_order_id: i64,
    pub task_id: Option<i64>,
    pub engineer: String,
    pub work_date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
    pub lunch: Option<LunchWindow>,
    pub description: String,
}

impl NewEntry {
    pub fn into_entry(self, hours_worked: f64, lunch_deduction: f64) -> TimeEntry {
        TimeEntry {
            id: 0,
            work_order_id: self.work_order_id,
            task_id: self.task_id,
            engineer: self.engineer,
            work_date: self.work_date,
            time_in: self.time_in,
            time_out: self.time_out,
            hours_worked,
            lunch_deduction,
            lunch: self.lunch,
            description: self.description,
            created_at: Utc::now().to_rfc3339(),
            entered_on_jl: false,
            entered_on_jt: false,
        }
    }
}

/// Field edits. `None` keeps the stored value; `lunch: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub engineer: Option<String>,
    pub work_date: Option<NaiveDate>,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub lunch: Option<Option<LunchWindow>>,
    pub description: Option<String>,
}

impl EntryEdit {
    pub fn is_empty(&self) -> bool {
        self.engineer.is_none()
            && self.work_date.is_none()
            && self.time_in.is_none()
            && self.time_out.is_none()
            && self.lunch.is_none()
            && self.description.is_none()
    }
}
