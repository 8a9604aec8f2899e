use crate::db::log::load_change_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::ChangeLogRow;
use ansi_term::Colour;
use regex::Regex;
use std::sync::LazyLock;

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("valid ANSI pattern"));

fn strip_ansi(s: &str) -> String {
    ANSI.replace_all(s, "").into_owned()
}

fn color_for_action(action: &str) -> Colour {
    match action {
        "create" | "assign" => Colour::Green,
        "delete" | "bulk_delete" | "notification_failed" => Colour::Red,
        "update" | "flags" | "status" | "reconcile" => Colour::Yellow,
        "reassign" | "bulk_reassign" | "unassign" => Colour::Cyan,
        "migration_applied" | "vacuum" => Colour::Purple,
        "notification_sent" => Colour::Blue,
        _ => Colour::White,
    }
}

/// `action (ObjectType #id)` with the action coloured, cut to `max`
/// visible characters.
fn label(row: &ChangeLogRow, max: usize) -> String {
    let target = match row.object_id {
        Some(id) => format!("{} #{}", row.object_type, id),
        None => row.object_type.clone(),
    };
    let plain = format!("{} ({})", row.action, target);

    let visible = if plain.chars().count() > max {
        let mut s: String = plain.chars().take(max.saturating_sub(3)).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    let color = color_for_action(&row.action);
    match visible.split_once(' ') {
        Some((word, rest)) => format!("{} {}", color.paint(word), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool, limit: Option<usize>) -> AppResult<()> {
        let rows = load_change_log(&pool.conn, limit)?;

        if rows.is_empty() {
            println!("📜 Audit log is empty.");
            return Ok(());
        }

        let labels: Vec<String> = rows.iter().map(|r| label(r, 50)).collect();
        let label_w = labels
            .iter()
            .map(|l| strip_ansi(l).chars().count())
            .max()
            .unwrap_or(10);
        let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
        let actor_w = rows
            .iter()
            .map(|r| r.actor.as_deref().unwrap_or("-").len())
            .max()
            .unwrap_or(1);

        println!("📜 Audit log:\n");

        for (row, lbl) in rows.iter().zip(labels) {
            let date = chrono::DateTime::parse_from_rfc3339(&row.timestamp)
                .map(|dt| dt.format("%F %T").to_string())
                .unwrap_or_else(|_| row.timestamp.clone());
            let padding = " ".repeat(label_w.saturating_sub(strip_ansi(&lbl).chars().count()));

            println!(
                "{:>id_w$}: {} | {:<actor_w$} | {}{} => {}",
                row.id,
                date,
                row.actor.as_deref().unwrap_or("-"),
                lbl,
                padding,
                row.description,
                id_w = id_w,
                actor_w = actor_w
            );
        }

        Ok(())
    }
}
