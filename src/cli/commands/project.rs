use crate::cli::commands::{Runtime, optional_date};
use crate::cli::parser::{Commands, ProjectAction};
use crate::core::task::TaskLogic;
use crate::db::tasks::{list_projects, list_tasks};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::truncate;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Project { action } = cmd else {
        return Ok(());
    };

    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    match action {
        ProjectAction::Add {
            work_order,
            name,
            description,
            start,
            end,
        } => {
            let id = TaskLogic::create_project(
                &mut pool,
                &ctx,
                *work_order,
                name,
                description,
                optional_date(start.as_ref())?,
                optional_date(end.as_ref())?,
            )?;
            success(format!("Project #{} '{}' created", id, name));
        }

        ProjectAction::List { work_order } => {
            let projects = list_projects(&pool.conn, *work_order)?;
            if projects.is_empty() {
                info(format!("Work order #{} has no projects.", work_order));
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("NAME", 24),
                Column::new("STATUS", 12),
                Column::new("START", 10),
                Column::new("END", 10),
                Column::new("TASKS", 5),
            ]);
            for p in &projects {
                let tasks = list_tasks(&pool.conn, p.id)?;
                table.add_row(vec![
                    p.id.to_string(),
                    truncate(&p.name, 24),
                    p.status.clone(),
                    p.start_date.map(|d| d.to_string()).unwrap_or_default(),
                    p.end_date.map(|d| d.to_string()).unwrap_or_default(),
                    tasks.len().to_string(),
                ]);
            }
            print!("{}", table.render());
        }

        ProjectAction::Del { id } => {
            TaskLogic::delete_project(&mut pool, &ctx, *id)?;
            success(format!("Project #{} deleted", id));
        }
    }

    Ok(())
}
