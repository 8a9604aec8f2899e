use crate::core::context::Context;
use crate::db::pool::DbPool;
use crate::db::work_orders::scheduled_on;
use crate::errors::{AppError, AppResult};
use crate::models::WorkOrder;
use crate::notify::settings::ScheduledDateOptions;
use crate::notify::{Notice, deliver, recipients_for};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

/// Work orders whose scheduled date is exactly `days_before` days after
/// `today`. Pure lookup, meant to be run once a day by a scheduler.
pub fn find_due_reminders(conn: &Connection, today: NaiveDate, days_before: i64) -> AppResult<Vec<WorkOrder>> {
    let due = Duration::try_days(days_before)
        .and_then(|d| today.checked_add_signed(d))
        .ok_or_else(|| AppError::InvalidValue(format!("days_before {} is out of range", days_before)))?;
    scheduled_on(conn, &due)
}

pub struct RemindLogic;

impl RemindLogic {
    /// Look up due work orders and, when scheduled-date notices are
    /// enabled, send one per work order.
    pub fn run(pool: &mut DbPool, ctx: &Context, today: NaiveDate) -> AppResult<Vec<WorkOrder>> {
        let settings = ctx.settings();
        let enabled = settings.scheduled_date();
        let default_opts = ScheduledDateOptions::default();
        let opts = enabled.map(|(_, o)| o).unwrap_or(&default_opts);

        let due = find_due_reminders(&pool.conn, today, opts.days_before)?;

        if let Some((configured, opts)) = enabled {
            for wo in &due {
                let Some(date) = wo.scheduled_date else {
                    continue;
                };
                let notice = Notice::ScheduledDate {
                    work_order_id: wo.id,
                    job_number: wo.job_number.clone(),
                    scheduled_date: date,
                    days_before: opts.days_before,
                    recipients: recipients_for(configured, wo, opts.include_owner),
                };
                deliver(&pool.conn, ctx.notifier, ctx.actor(), &notice);
            }
        }

        Ok(due)
    }
}
