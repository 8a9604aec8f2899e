//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::io;
use thiserror::Error;

/// The entry an overlap check collided with, kept for user-facing messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictInfo {
    pub entry_id: i64,
    pub work_order_id: i64,
    pub job_number: Option<String>,
    pub work_date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entry #{} ({} - {}) on {}",
            self.entry_id,
            self.time_in.format("%H:%M"),
            self.time_out.format("%H:%M"),
            self.work_date
        )?;
        if let Some(job) = &self.job_number {
            write!(f, " (Work Order: {})", job)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Time entry accounting
    // ---------------------------
    #[error("Time overlap detected! This entry ({start} - {end}) overlaps with an existing {conflicting}")]
    OverlapConflict {
        start: String,
        end: String,
        conflicting: ConflictInfo,
    },

    #[error(
        "Lunch must be taken within {limit:.1} hours of start time. Your lunch ends {hours_after_start:.1} hours after your start time."
    )]
    LunchTimingInvalid { hours_after_start: f64, limit: f64 },

    #[error(
        "Time entry #{entry_id} is locked: it has been entered into the accounting system (JL/JT checked)"
    )]
    EntryLocked { entry_id: i64 },

    #[error("Time entry #{entry_id} does not belong to the work order of task #{task_id}'s project")]
    TaskWorkOrderMismatch { entry_id: i64, task_id: i64 },

    #[error("Time entry #{entry_id} is not assigned to task #{task_id}")]
    EntryNotOnTask { entry_id: i64, task_id: i64 },

    #[error("Aggregate update failed: {0}")]
    AggregateInconsistency(String),

    #[error("Work order {0} is {1}: no time can be added")]
    WorkOrderClosed(String, String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Rate limit exceeded. Maximum {max_calls} requests per {window_secs} seconds.")]
    RateLimited { max_calls: usize, window_secs: u64 },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: i64) -> Self {
        AppError::NotFound(format!("{} #{}", kind, id))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_message_names_conflicting_entry_and_work_order() {
        let err = AppError::OverlapConflict {
            start: "11:30".into(),
            end: "13:30".into(),
            conflicting: ConflictInfo {
                entry_id: 2,
                work_order_id: 7,
                job_number: Some("J-100".into()),
                work_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                time_in: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
                time_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            },
        };

        assert_eq!(
            err.to_string(),
            "Time overlap detected! This entry (11:30 - 13:30) overlaps with an existing entry #2 (12:30 - 17:00) on 2024-01-05 (Work Order: J-100)"
        );
    }

    #[test]
    fn lunch_timing_message_shows_one_decimal() {
        let err = AppError::LunchTimingInvalid {
            hours_after_start: 6.5,
            limit: 6.0,
        };
        assert_eq!(
            err.to_string(),
            "Lunch must be taken within 6.0 hours of start time. Your lunch ends 6.5 hours after your start time."
        );
    }

    #[test]
    fn sqlite_errors_convert_with_question_mark() {
        fn fails() -> AppResult<()> {
            Err(rusqlite::Error::QueryReturnedNoRows)?;
            Ok(())
        }
        assert!(matches!(fails(), Err(AppError::Db(_))));
    }
}
