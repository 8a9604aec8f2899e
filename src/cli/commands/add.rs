use crate::cli::commands::{Runtime, date_or_today};
use crate::cli::parser::Commands;
use crate::core::add::{AddLogic, EntryOutcome};
use crate::core::calculator::threshold::ThresholdLevel;
use crate::errors::AppResult;
use crate::models::{LunchWindow, NewEntry};
use crate::ui::messages::{notice, success};
use crate::utils::format_hours;
use crate::utils::time::{parse_optional_time, require_time};

/// Log one entry through the full create path.
pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Add {
        work_order,
        engineer,
        date,
        time_in,
        time_out,
        lunch_start,
        lunch_end,
        task,
        description,
    } = cmd
    else {
        return Ok(());
    };

    let input = NewEntry {
        work_order_id: *work_order,
        task_id: *task,
        engineer: rt.engineer(engineer.as_ref())?,
        work_date: date_or_today(date.as_ref())?,
        time_in: require_time("time_in", time_in)?,
        time_out: require_time("time_out", time_out)?,
        lunch: LunchWindow::from_parts(
            parse_optional_time("lunch_start", lunch_start.as_ref())?,
            parse_optional_time("lunch_end", lunch_end.as_ref())?,
        )?,
        description: description.clone(),
    };

    let mut pool = rt.open_db()?;
    let outcome = AddLogic::apply(&mut pool, &rt.ctx(), input)?;

    print_outcome(&outcome);
    Ok(())
}

pub(crate) fn print_outcome(outcome: &EntryOutcome) {
    let e = &outcome.entry;
    success(format!(
        "Entry #{} logged on {}: {} worked ({} lunch deducted)",
        e.id,
        outcome.work_order.job_number,
        format_hours(e.hours_worked),
        format_hours(e.lunch_deduction)
    ));
    if let Some(level) = outcome.threshold {
        report_threshold(&outcome.work_order.job_number, level, outcome.summary.percentage);
    }
}

pub(crate) fn report_threshold(job_number: &str, level: ThresholdLevel, pct: f64) {
    match level {
        ThresholdLevel::Warning => notice(format!(
            "Work order {} reached {:.1}% of its estimated hours",
            job_number, pct
        )),
        ThresholdLevel::Exceeded => notice(format!(
            "Work order {} exceeded its estimated hours ({:.1}%)",
            job_number, pct
        )),
    }
}
