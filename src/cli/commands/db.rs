use crate::cli::commands::Runtime;
use crate::cli::parser::Commands;
use crate::db::log::{audit, object};
use crate::db::migrate::{applied_migrations, run_pending_migrations};
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success};

/// `PRAGMA integrity_check` lines; a healthy file reports just "ok".
fn integrity_problems(pool: &DbPool) -> AppResult<Vec<String>> {
    let mut stmt = pool.conn.prepare("PRAGMA integrity_check")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        let line = r?;
        if line != "ok" {
            out.push(line);
        }
    }
    Ok(out)
}

pub fn handle(cmd: &Commands, rt: &Runtime) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    // opening already applies pending migrations
    let pool = rt.open_db()?;

    if *migrate {
        let before = applied_migrations(&pool.conn)?.len();
        run_pending_migrations(&pool.conn)?;
        let after = applied_migrations(&pool.conn)?.len();
        success(format!("Schema up to date ({} migrations applied)", after));
        if after > before {
            info(format!("{} new migrations ran", after - before));
        }
    }

    if *show_info {
        stats::print_db_info(&pool, &rt.cfg.database)?;
    }

    if *check {
        let problems = integrity_problems(&pool)?;
        if problems.is_empty() {
            success("Integrity check passed.");
        } else {
            for p in &problems {
                error(p);
            }
        }
    }

    if *vacuum {
        pool.conn.execute_batch("VACUUM;")?;
        audit(&pool.conn, rt.actor.as_deref(), "vacuum", object::SCHEMA, None, "VACUUM")?;
        success("Vacuum completed.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    #[test]
    fn fresh_database_has_no_integrity_problems() {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        assert!(integrity_problems(&pool).unwrap().is_empty());
    }
}
