use crate::cli::commands::Runtime;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        work_order,
        range,
        force,
    } = cmd
    {
        let mut pool = rt.open_db()?;
        let rows = ExportLogic::export(&mut pool, format.clone(), file, *work_order, range, *force)?;
        info(format!("{} entries written", rows));
    }
    Ok(())
}
