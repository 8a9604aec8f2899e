// src/export/logic.rs

use crate::db::pool::DbPool;
use crate::db::queries::{load_all_entries, load_entries_by_work_order};
use crate::db::work_orders::{list_work_orders, load_work_order};
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::EntryExport;
use crate::export::range::parse_range;
use crate::ui::messages::warning;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export time entries, optionally limited to one work order and a date
    /// range (see [`parse_range`]). Returns the number of rows written.
    pub fn export(
        pool: &mut DbPool,
        format: ExportFormat,
        file: &str,
        work_order: Option<i64>,
        range: &Option<String>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        ensure_writable(path, force)?;

        let bounds: Option<(NaiveDate, NaiveDate)> = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        let rows = load_rows(pool, work_order, bounds)?;

        if rows.is_empty() {
            warning("No time entries found for the selection.");
            return Ok(0);
        }

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        Ok(rows.len())
    }
}

fn load_rows(
    pool: &DbPool,
    work_order: Option<i64>,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<EntryExport>> {
    let (entries, orders) = match work_order {
        Some(id) => {
            let wo = load_work_order(&pool.conn, id)?;
            (load_entries_by_work_order(&pool.conn, id)?, vec![wo])
        }
        None => (load_all_entries(&pool.conn)?, list_work_orders(&pool.conn, None)?),
    };

    let by_id: HashMap<i64, _> = orders.iter().map(|w| (w.id, w)).collect();

    Ok(entries
        .iter()
        .filter(|e| bounds.is_none_or(|(from, to)| e.work_date >= from && e.work_date <= to))
        .filter_map(|e| by_id.get(&e.work_order_id).map(|wo| EntryExport::from_entry(e, wo)))
        .collect())
}
