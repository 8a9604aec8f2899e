//! rWorklog library root.
//! Exposes the CLI parser, the high-level run() function, and the internal
//! modules (work orders, time entries, tasks, notifications).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod notify;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands::{self, Runtime};
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, rt: &Runtime) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(cmd, rt),
        Commands::Db { .. } => commands::db::handle(cmd, rt),
        Commands::Log { .. } => commands::log::handle(cmd, rt),
        Commands::Wo { .. } => commands::wo::handle(cmd, rt),
        Commands::Project { .. } => commands::project::handle(cmd, rt),
        Commands::Task { .. } => commands::task::handle(cmd, rt),
        Commands::Add { .. } => commands::add::handle(cmd, rt),
        Commands::Edit { .. } | Commands::Flags { .. } => commands::edit::handle(cmd, rt),
        Commands::Del { .. } => commands::del::handle(cmd, rt),
        Commands::Reassign { .. } => commands::reassign::handle(cmd, rt),
        Commands::List { .. } => commands::list::handle(cmd, rt),
        Commands::Timesheet { .. } | Commands::Import { .. } => commands::batch::handle(cmd, rt),
        Commands::Week { .. } => commands::week::handle(cmd, rt),
        Commands::Export { .. } => commands::export::handle(cmd, rt),
        Commands::Remind { .. } => commands::remind::handle(cmd, rt),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; --db wins over the file
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    let rt = Runtime::new(&cli, cfg);
    dispatch(&cli, &rt)
}
