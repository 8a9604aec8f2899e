use crate::cli::commands::{Runtime, optional_date};
use crate::cli::parser::Commands;
use crate::core::edit::EditLogic;
use crate::errors::AppResult;
use crate::models::{EntryEdit, LunchWindow};
use crate::ui::messages::success;
use crate::utils::format_hours;
use crate::utils::time::parse_optional_time;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    match cmd {
        Commands::Edit {
            id,
            engineer,
            date,
            time_in,
            time_out,
            lunch_start,
            lunch_end,
            no_lunch,
            description,
        } => {
            let lunch = if *no_lunch {
                Some(None)
            } else {
                LunchWindow::from_parts(
                    parse_optional_time("lunch_start", lunch_start.as_ref())?,
                    parse_optional_time("lunch_end", lunch_end.as_ref())?,
                )?
                .map(Some)
            };

            let edit = EntryEdit {
                engineer: engineer.clone(),
                work_date: optional_date(date.as_ref())?,
                time_in: parse_optional_time("time_in", time_in.as_ref())?,
                time_out: parse_optional_time("time_out", time_out.as_ref())?,
                lunch,
                description: description.clone(),
            };

            let mut pool = rt.open_db()?;
            let entry = EditLogic::apply(&mut pool, &rt.ctx(), *id, edit)?;
            success(format!(
                "Entry #{} updated: {} worked ({} lunch deducted)",
                entry.id,
                format_hours(entry.hours_worked),
                format_hours(entry.lunch_deduction)
            ));
        }

        Commands::Flags { ids, jl, jt } => {
            let mut pool = rt.open_db()?;
            let ctx = rt.ctx();
            // the limiter window spans this invocation only
            for id in ids {
                let entry = EditLogic::flags(&mut pool, &ctx, *id, *jl, *jt)?;
                success(format!(
                    "Entry #{}: JL={} JT={}{}",
                    entry.id,
                    entry.entered_on_jl,
                    entry.entered_on_jt,
                    if entry.is_locked() { " (locked)" } else { "" }
                ));
            }
        }

        _ => {}
    }

    Ok(())
}
