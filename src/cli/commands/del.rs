use crate::cli::commands::Runtime;
use crate::cli::parser::Commands;
use crate::core::del::{BulkReport, DeleteLogic};
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Del { id, ids } = cmd else {
        return Ok(());
    };

    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    if let Some(id) = id {
        let entry = DeleteLogic::apply(&mut pool, &ctx, *id)?;
        success(format!(
            "Entry #{} ({} on {}) deleted",
            entry.id, entry.engineer, entry.work_date
        ));
        return Ok(());
    }

    let report = DeleteLogic::bulk(&mut pool, &ctx, ids)?;
    print_bulk("deleted", &report);
    Ok(())
}

pub(crate) fn print_bulk(verb: &str, report: &BulkReport) {
    success(format!("{} entries {}", report.processed.len(), verb));
    if !report.skipped_locked.is_empty() {
        warning(format!("Skipped locked entries: {}", join_ids(&report.skipped_locked)));
    }
    if !report.missing.is_empty() {
        warning(format!("Not found: {}", join_ids(&report.missing)));
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|i| format!("#{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
