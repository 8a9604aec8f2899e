use crate::cli::commands::Runtime;
use crate::cli::commands::add::report_threshold;
use crate::cli::parser::Commands;
use crate::core::batch::{BatchLogic, BatchReport, read_records};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use crate::utils::format_hours;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    let report = match cmd {
        Commands::Timesheet { file, engineer } => {
            let engineer = rt.engineer(engineer.as_ref())?;
            let records = read_records(&expand_tilde(file))?;
            BatchLogic::timesheet(&mut pool, &ctx, &engineer, &records)?
        }
        Commands::Import { file } => {
            let records = read_records(&expand_tilde(file))?;
            BatchLogic::import(&mut pool, &ctx, &records)?
        }
        _ => return Ok(()),
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    let hours: f64 = report.created.iter().map(|o| o.entry.hours_worked).sum();
    success(format!(
        "{} entries created ({})",
        report.created.len(),
        format_hours(hours)
    ));

    for outcome in &report.created {
        if let Some(level) = outcome.threshold {
            report_threshold(&outcome.work_order.job_number, level, outcome.summary.percentage);
        }
    }
    for (row, reason) in &report.skipped {
        info(format!("Row {} skipped: {}", row, reason));
    }
    for (row, reason) in &report.failed {
        error(format!("Row {} failed: {}", row, reason));
    }
    if !report.failed.is_empty() {
        warning(format!("{} rows were not logged", report.failed.len()));
    }
}
