use crate::config::migrate::missing_fields;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &Path) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        println!("{}", content);
        Ok(())
    }

    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let ed = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "nano".into());

        Command::new(ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(())
    }

    /// Report top-level keys the file lacks; returns them.
    pub fn check(path: &Path) -> AppResult<Vec<&'static str>> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let missing = missing_fields(&content).map_err(|e| AppError::Config(e.to_string()))?;

        if missing.is_empty() {
            success("Configuration file is complete.");
        } else {
            for key in &missing {
                warning(format!("Missing field '{}' (default value applies)", key));
            }
        }
        Ok(missing)
    }
}
