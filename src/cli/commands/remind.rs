use crate::cli::commands::{Runtime, date_or_today};
use crate::cli::parser::Commands;
use crate::core::reminders::RemindLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, notice};

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Remind { today } = cmd else {
        return Ok(());
    };

    let today = date_or_today(today.as_ref())?;
    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();
    let due = RemindLogic::run(&mut pool, &ctx, today)?;

    if due.is_empty() {
        info("No scheduled work orders are due.");
        return Ok(());
    }

    let sent = ctx.settings().scheduled_date().is_some();
    for wo in &due {
        let date = wo.scheduled_date.map(|d| d.to_string()).unwrap_or_default();
        if sent {
            notice(format!("Reminder sent: {} is scheduled for {}", wo.job_number, date));
        } else {
            info(format!("{} is scheduled for {}", wo.job_number, date));
        }
    }
    Ok(())
}
