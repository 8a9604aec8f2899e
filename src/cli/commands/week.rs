use crate::cli::commands::{Runtime, date_or_today};
use crate::cli::parser::Commands;
use crate::core::week::build_week;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::header;
use crate::utils::date::{week_bounds, weekday_short};
use crate::utils::format_hours;
use crate::utils::formatting::bold;
use crate::utils::time::format_time;
use chrono::NaiveDate;

/// Parse `YYYY-WW` into the Sunday that opens that week.
fn parse_week(s: &str) -> AppResult<NaiveDate> {
    let invalid = || AppError::InvalidDate(format!("'{}' is not YYYY-WW", s));
    let (y, w) = s.split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let week: u32 = w.parse().map_err(|_| invalid())?;
    week_bounds(year, week).map(|(start, _)| start).ok_or_else(invalid)
}

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Week {
        engineer,
        date,
        week,
    } = cmd
    else {
        return Ok(());
    };

    let engineer = rt.engineer(engineer.as_ref())?;
    let day = match week {
        Some(w) => parse_week(w)?,
        None => date_or_today(date.as_ref())?,
    };

    let pool = rt.open_db()?;
    let view = build_week(&pool.conn, &engineer, day)?;

    header(format!("{} | {} to {}", engineer, view.start, view.end));
    for d in &view.days {
        println!(
            "{} {}  {}",
            weekday_short(d.date),
            d.date,
            format_hours(d.hours)
        );
        for e in &d.entries {
            println!(
                "      #{:<5} {}-{}  {:>6.2}h  wo #{}",
                e.id,
                format_time(e.time_in),
                format_time(e.time_out),
                e.hours_worked,
                e.work_order_id
            );
        }
    }
    println!("{}", bold(&format!("Week total: {}", format_hours(view.total_hours()))));
    Ok(())
}
