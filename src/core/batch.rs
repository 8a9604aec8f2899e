//! Multi-row entry creation: a timesheet file for one engineer, and a bulk
//! import keyed by job number.

use crate::core::add::{EntryOutcome, create_entry, notify_threshold};
use crate::core::context::Context;
use crate::db::pool::DbPool;
use crate::db::work_orders::find_by_job_number;
use crate::errors::{AppError, AppResult};
use crate::models::{LunchWindow, NewEntry};
use crate::utils::date::parse_date;
use crate::utils::time::{parse_optional_time, require_time};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// One CSV row. Timesheets carry `work_order`; imports carry `job_number`
/// and `engineer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryRecord {
    #[serde(default)]
    pub work_order: Option<i64>,
    #[serde(default)]
    pub job_number: Option<String>,
    #[serde(default)]
    pub engineer: Option<String>,
    #[serde(default)]
    pub task: Option<i64>,
    pub date: String,
    pub time_in: String,
    pub time_out: String,
    #[serde(default)]
    pub lunch_start: Option<String>,
    #[serde(default)]
    pub lunch_end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn read_records(path: &Path) -> AppResult<Vec<EntryRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub created: Vec<EntryOutcome>,
    /// 1-based row number and the reason it was refused.
    pub failed: Vec<(usize, String)>,
    pub skipped: Vec<(usize, String)>,
}

impl EntryRecord {
    fn to_new_entry(&self, work_order_id: i64, engineer: &str) -> AppResult<NewEntry> {
        let work_date = parse_date(&self.date)
            .ok_or_else(|| AppError::InvalidDate(self.date.clone()))?;
        let lunch = LunchWindow::from_parts(
            parse_optional_time("lunch_start", self.lunch_start.as_ref())?,
            parse_optional_time("lunch_end", self.lunch_end.as_ref())?,
        )?;

        Ok(NewEntry {
            work_order_id,
            task_id: self.task,
            engineer: engineer.to_string(),
            work_date,
            time_in: require_time("time_in", &self.time_in)?,
            time_out: require_time("time_out", &self.time_out)?,
            lunch,
            description: self.description.clone().unwrap_or_default(),
        })
    }
}

pub struct BatchLogic;

impl BatchLogic {
    /// Submit a timesheet for `engineer`. Each row commits or fails on its
    /// own.
    pub fn timesheet(
        pool: &mut DbPool,
        ctx: &Context,
        engineer: &str,
        records: &[EntryRecord],
    ) -> AppResult<BatchReport> {
        let mut report = BatchReport::default();

        for (i, rec) in records.iter().enumerate() {
            let row = i + 1;
            let Some(wo) = rec.work_order else {
                report.failed.push((row, "missing work_order".into()));
                continue;
            };
            let engineer = rec.engineer.as_deref().unwrap_or(engineer);
            Self::submit_row(pool, ctx, row, rec.to_new_entry(wo, engineer), &mut report)?;
        }

        Ok(report)
    }

    /// Import rows keyed by job number. Unknown job numbers are skipped.
    pub fn import(
        pool: &mut DbPool,
        ctx: &Context,
        records: &[EntryRecord],
    ) -> AppResult<BatchReport> {
        let mut report = BatchReport::default();

        for (i, rec) in records.iter().enumerate() {
            let row = i + 1;
            let Some(job) = rec.job_number.as_deref().filter(|j| !j.is_empty()) else {
                report.failed.push((row, "missing job_number".into()));
                continue;
            };
            let Some(wo) = find_by_job_number(&pool.conn, job)? else {
                report.skipped.push((row, format!("unknown job number {}", job)));
                continue;
            };
            let Some(engineer) = rec.engineer.as_deref().filter(|e| !e.is_empty()) else {
                report.failed.push((row, "missing engineer".into()));
                continue;
            };
            Self::submit_row(pool, ctx, row, rec.to_new_entry(wo.id, engineer), &mut report)?;
        }

        Ok(report)
    }

    /// Row-level errors land in the report; storage failures abort.
    fn submit_row(
        pool: &mut DbPool,
        ctx: &Context,
        row: usize,
        parsed: AppResult<NewEntry>,
        report: &mut BatchReport,
    ) -> AppResult<()> {
        let input = match parsed {
            Ok(i) => i,
            Err(e) => {
                report.failed.push((row, e.to_string()));
                return Ok(());
            }
        };

        let tx = pool.conn.transaction()?;
        match create_entry(&tx, ctx, input) {
            Ok(outcome) => {
                tx.commit()?;
                notify_threshold(&pool.conn, ctx, &outcome);
                report.created.push(outcome);
            }
            Err(e @ (AppError::Db(_) | AppError::Io(_))) => return Err(e),
            Err(e) => {
                drop(tx);
                warn!(row, error = %e, "batch row rejected");
                report.failed.push((row, e.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::testing::*;
    use crate::db::queries::load_all_entries;
    use crate::notify::testing::MemoryNotifier;

    fn rec(wo: Option<i64>, job: Option<&str>, tin: &str, tout: &str) -> EntryRecord {
        EntryRecord {
            work_order: wo,
            job_number: job.map(str::to_string),
            engineer: Some("A".into()),
            date: "2024-01-05".into(),
            time_in: tin.into(),
            time_out: tout.into(),
            ..Default::default()
        }
    }

    #[test]
    fn timesheet_rows_fail_independently() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        let wo = work_order(&pool, "WO-1", 0.0);

        let rows = vec![
            rec(Some(wo), None, "08:00", "12:00"),
            rec(Some(wo), None, "11:00", "13:00"),
            rec(Some(wo), None, "13:00", "bad"),
            rec(Some(wo), None, "13:00", "16:00"),
        ];
        let report = BatchLogic::timesheet(&mut pool, &ctx, "A", &rows).unwrap();

        assert_eq!(report.created.len(), 2);
        let failed_rows: Vec<usize> = report.failed.iter().map(|(r, _)| *r).collect();
        assert_eq!(failed_rows, vec![2, 3]);
        assert!(report.failed[0].1.contains("overlap"));
        assert_eq!(load_all_entries(&pool.conn).unwrap().len(), 2);
    }

    #[test]
    fn import_skips_unknown_jobs() {
        let mut pool = pool();
        let n = MemoryNotifier::default();
        let ctx = ctx(&n, &[]);
        work_order(&pool, "WO-1", 0.0);

        let rows = vec![
            rec(None, Some("WO-1"), "08:00", "12:00"),
            rec(None, Some("NOPE"), "13:00", "14:00"),
        ];
        let report = BatchLogic::import(&mut pool, &ctx, &rows).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn reads_csv_with_optional_columns() {
        let path = std::env::temp_dir().join(format!("rworklog_batch_{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "job_number,engineer,date,time_in,time_out,lunch_start,lunch_end,description\n\
             WO-1,A,2024-01-05,08:00,16:00,12:00,12:30,Fit pump\n\
             WO-1,B,2024-01-05,08:00,12:00,,,\n",
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lunch_end.as_deref(), Some("12:30"));
        assert_eq!(records[1].lunch_start, None);
        let _ = std::fs::remove_file(&path);
    }
}
