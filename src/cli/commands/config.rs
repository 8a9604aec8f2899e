use crate::cli::commands::Runtime;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::{AppError, AppResult};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            if path.exists() {
                ConfigLogic::print(&path)?;
            } else {
                let yaml =
                    serde_yaml::to_string(&rt.cfg).map_err(|e| AppError::Config(e.to_string()))?;
                println!("{}", yaml);
            }
        }

        if *check {
            ConfigLogic::check(&path)?;
        }

        if *edit_config {
            ConfigLogic::edit(&path, editor)?;
        }
    }

    Ok(())
}
