use crate::cli::commands::{Runtime, optional_date};
use crate::cli::parser::{Commands, WoAction};
use crate::core::workorder::WorkOrderLogic;
use crate::db::queries::load_entries_by_work_order;
use crate::db::tasks::list_projects;
use crate::db::work_orders::list_work_orders;
use crate::errors::{AppError, AppResult};
use crate::models::{NewWorkOrder, Priority, WorkOrderStatus};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{RESET, color_for_percentage, color_for_remaining};
use crate::utils::formatting::{truncate, yes_no};
use crate::utils::table::{Column, Table};
use crate::utils::format_hours;

fn parse_status(s: &str) -> AppResult<WorkOrderStatus> {
    WorkOrderStatus::from_code(s)
        .ok_or_else(|| AppError::InvalidValue(format!("unknown status '{}' (open, complete, closed)", s)))
}

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Wo { action } = cmd else {
        return Ok(());
    };

    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    match action {
        WoAction::Add {
            job_number,
            description,
            customer_wo,
            owner,
            estimate,
            priority,
            location,
            scheduled,
            classification,
        } => {
            if *estimate < 0.0 {
                return Err(AppError::InvalidValue("estimate cannot be negative".into()));
            }
            let priority = Priority::from_db_str(priority)
                .ok_or_else(|| AppError::InvalidValue(format!("unknown priority '{}'", priority)))?;

            let wo = WorkOrderLogic::create(
                &mut pool,
                &ctx,
                NewWorkOrder {
                    customer_work_order_number: customer_wo.clone(),
                    job_number: job_number.clone(),
                    description: description.clone(),
                    owner: owner.clone(),
                    estimated_hours: *estimate,
                    priority,
                    location: location.clone(),
                    scheduled_date: optional_date(scheduled.as_ref())?,
                    classification: classification.clone(),
                },
            )?;
            success(format!("Work order #{} ({}) created", wo.id, wo.job_number));
        }

        WoAction::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let orders = list_work_orders(&pool.conn, status)?;
            if orders.is_empty() {
                info("No work orders found.");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("JOB", 12),
                Column::new("STATUS", 9),
                Column::new("PRIO", 7),
                Column::new("EST", 8),
                Column::new("LOGGED", 8),
                Column::new("DESCRIPTION", 30),
            ]);
            for wo in &orders {
                let (_, s) = WorkOrderLogic::summary(&pool.conn, wo.id)?;
                table.add_row(vec![
                    wo.id.to_string(),
                    wo.job_number.clone(),
                    wo.status.to_db_str().to_string(),
                    wo.priority.to_db_str().to_string(),
                    format!("{:.2}", s.estimated),
                    format!("{:.2}", s.logged),
                    truncate(&wo.description, 30),
                ]);
            }
            print!("{}", table.render());
        }

        WoAction::Show { id } => {
            let (wo, s) = WorkOrderLogic::summary(&pool.conn, *id)?;
            let warn_at = ctx
                .settings()
                .hours_threshold()
                .map(|(_, o)| o.warning_threshold)
                .unwrap_or(80.0);

            header(format!("Work order {} (#{})", wo.job_number, wo.id));
            println!("Description : {}", wo.description);
            println!("Customer WO : {}", wo.customer_work_order_number.as_deref().unwrap_or("-"));
            println!("Status      : {}", wo.status.to_db_str());
            println!("Priority    : {}", wo.priority.to_db_str());
            println!("Owner       : {}", wo.owner.as_deref().unwrap_or("-"));
            println!("Location    : {}", wo.location.as_deref().unwrap_or("-"));
            println!(
                "Scheduled   : {}",
                wo.scheduled_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
            );
            println!("Class       : {}", wo.classification);
            println!("Approved    : {}", yes_no(wo.approved_for_work));
            println!("Estimated   : {}", format_hours(s.estimated));
            println!("Logged      : {}", format_hours(s.logged));
            println!(
                "Remaining   : {}{}{}",
                color_for_remaining(s.remaining),
                format_hours(s.remaining),
                RESET
            );
            println!(
                "Used        : {}{:.1}%{}",
                color_for_percentage(s.percentage, warn_at),
                s.percentage,
                RESET
            );

            let entries = load_entries_by_work_order(&pool.conn, wo.id)?;
            let projects = list_projects(&pool.conn, wo.id)?;
            println!("Entries     : {}", entries.len());
            println!("Projects    : {}", projects.len());
        }

        WoAction::Status { id, status } => {
            let wo = WorkOrderLogic::set_status(&mut pool, &ctx, *id, parse_status(status)?)?;
            success(format!("Work order {} is now {}", wo.job_number, wo.status.to_db_str()));
        }

        WoAction::Approve { id, revoke } => {
            WorkOrderLogic::approve(&mut pool, &ctx, *id, !*revoke)?;
            success(format!(
                "Work order #{} {}",
                id,
                if *revoke { "approval withdrawn" } else { "approved for work" }
            ));
        }

        WoAction::Del { id } => {
            let removed = WorkOrderLogic::delete(&mut pool, &ctx, *id)?;
            if removed > 0 {
                warning(format!("{} time entries were removed with it", removed));
            }
            success(format!("Work order #{} deleted", id));
        }
    }

    Ok(())
}
