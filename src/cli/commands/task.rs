use crate::cli::commands::Runtime;
use crate::cli::parser::{Commands, TaskAction};
use crate::core::task::TaskLogic;
use crate::db::tasks::{NewTask, list_tasks};
use crate::errors::{AppError, AppResult};
use crate::models::TaskStatus;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{RESET, color_for_remaining};
use crate::utils::formatting::truncate;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Task { action } = cmd else {
        return Ok(());
    };

    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    match action {
        TaskAction::Add {
            project,
            name,
            estimate,
            priority,
            description,
            depends,
            assignee,
        } => {
            if *estimate < 0.0 {
                return Err(AppError::InvalidValue("estimate cannot be negative".into()));
            }
            let id = TaskLogic::create_task(
                &mut pool,
                &ctx,
                NewTask {
                    project_id: *project,
                    name: name.clone(),
                    description: description.clone(),
                    priority: priority.clone(),
                    estimated_hours: *estimate,
                    dependencies: depends.clone(),
                    assigned_to: assignee.clone(),
                },
            )?;
            success(format!("Task #{} '{}' created", id, name));
        }

        TaskAction::List { project } => {
            let tasks = list_tasks(&pool.conn, *project)?;
            if tasks.is_empty() {
                info(format!("Project #{} has no tasks.", project));
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("NAME", 22),
                Column::new("STATUS", 11),
                Column::new("EST", 7),
                Column::new("ACTUAL", 7),
                Column::new("LEFT", 7),
                Column::new("DONE", 4),
                Column::new("ASSIGNEE", 12),
            ]);
            for t in &tasks {
                let left = t.hours_remaining();
                table.add_row(vec![
                    t.id.to_string(),
                    truncate(&t.name, 22),
                    t.status.to_db_str().to_string(),
                    format!("{:.2}", t.estimated_hours),
                    format!("{:.2}", t.actual_hours),
                    format!("{}{:.2}{}", color_for_remaining(left), left, RESET),
                    format!("{}%", t.completion_percentage()),
                    t.assigned_to.clone().unwrap_or_default(),
                ]);
            }
            print!("{}", table.render());
        }

        TaskAction::Status {
            id,
            status,
            progress,
        } => {
            let status = TaskStatus::from_db_str(status).ok_or_else(|| {
                AppError::InvalidValue(format!(
                    "unknown task status '{}' (not-started, in-progress, completed, delayed)",
                    status
                ))
            })?;
            let task = TaskLogic::set_status(&mut pool, &ctx, *id, status, *progress)?;
            success(format!(
                "Task #{} is {} ({}%)",
                task.id,
                task.status.to_db_str(),
                task.completion_percentage()
            ));
        }

        TaskAction::Assign { entry, task } => {
            let e = TaskLogic::assign(&mut pool, &ctx, *entry, *task)?;
            success(format!("Entry #{} ({:.2}h) booked on task #{}", e.id, e.hours_worked, task));
        }

        TaskAction::Unassign { entry, task } => {
            let e = TaskLogic::unassign(&mut pool, &ctx, *entry, *task)?;
            success(format!("Entry #{} ({:.2}h) taken off task #{}", e.id, e.hours_worked, task));
        }

        TaskAction::Del { id } => {
            let detached = TaskLogic::delete_task(&mut pool, &ctx, *id)?;
            if detached > 0 {
                warning(format!("{} entries detached and kept", detached));
            }
            success(format!("Task #{} deleted", id));
        }

        TaskAction::Reconcile { id } => {
            let (before, after) = TaskLogic::reconcile(&mut pool, &ctx, *id)?;
            if (before - after).abs() < f64::EPSILON {
                info(format!("Task #{} already consistent ({:.2}h)", id, after));
            } else {
                success(format!("Task #{} actual hours {:.2}h -> {:.2}h", id, before, after));
            }
        }
    }

    Ok(())
}
