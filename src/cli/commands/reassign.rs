use crate::cli::commands::Runtime;
use crate::cli::commands::del::print_bulk;
use crate::cli::parser::Commands;
use crate::core::reassign::ReassignLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Reassign {
        to,
        id,
        ids,
        from_wo,
    } = cmd
    else {
        return Ok(());
    };

    let mut pool = rt.open_db()?;
    let ctx = rt.ctx();

    if let Some(id) = id {
        let entry = ReassignLogic::apply(&mut pool, &ctx, *id, *to)?;
        success(format!(
            "Entry #{} moved to work order #{}",
            entry.id, entry.work_order_id
        ));
        return Ok(());
    }

    let report = match from_wo {
        Some(source) => ReassignLogic::from_work_order(&mut pool, &ctx, *source, *to)?,
        None => ReassignLogic::bulk(&mut pool, &ctx, ids, *to)?,
    };
    print_bulk("reassigned", &report);
    Ok(())
}
