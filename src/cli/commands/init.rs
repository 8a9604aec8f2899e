use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::open;
use crate::db::log::{audit, object};
use crate::errors::AppResult;
use tracing::warn;

/// Handle the `init` command
///
/// Creates the config directory and file (skipped in test mode), the
/// SQLite database, and applies every pending migration.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing rWorklog…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &db_path);

    let pool = open(&db_path)?;

    println!("✅ Database initialized at {}", &db_path);

    if let Err(e) = audit(
        &pool.conn,
        cli.user.as_deref(),
        "init",
        object::SCHEMA,
        None,
        &format!("Database initialized at {}", &db_path),
    ) {
        warn!(error = %e, "failed to write init audit row");
    }

    println!("🎉 rWorklog initialization completed!");
    Ok(())
}
