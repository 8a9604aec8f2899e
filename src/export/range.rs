// src/export/range.rs

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

/// Parse `--range` into inclusive date bounds.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two of the same shape joined
/// by `:`.
pub(crate) fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match r.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (a.trim(), b.trim());
            if a.len() != b.len() {
                return Err(AppError::InvalidDate(format!(
                    "range ends must have the same format: {r}"
                )));
            }
            Ok((bounds(a)?.0, bounds(b)?.1))
        }
        None => bounds(r.trim()),
    }
}

/// First and last day covered by a single period expression.
fn bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(format!("unsupported period '{p}'"));

    match p.len() {
        4 => {
            let y: i32 = p.parse().map_err(|_| bad())?;
            let first = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let last = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((first, last))
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d").map_err(|_| bad())?;
            let next = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            }
            .ok_or_else(bad)?;
            let last = next.pred_opt().ok_or_else(bad)?;
            Ok((first, last))
        }
        10 => {
            let d = NaiveDate::parse_from_str(p, "%Y-%m-%d").map_err(|_| bad())?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}
