use crate::cli::commands::Runtime;
use crate::cli::parser::Commands;
use crate::core::log::LogLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let pool = rt.open_db()?;
        LogLogic::print_log(&pool, *limit)?;
    }

    Ok(())
}
