/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Remaining-hours color:
/// \>0 → green
/// \<0 → red
/// 0 → reset
pub fn color_for_remaining(value: f64) -> &'static str {
    if value > 0.0 {
        GREEN
    } else if value < 0.0 {
        RED
    } else {
        RESET
    }
}

/// Percentage of estimate: yellow from the warning threshold, red from 100%.
pub fn color_for_percentage(pct: f64, warning: f64) -> &'static str {
    if pct >= 100.0 {
        RED
    } else if pct >= warning {
        YELLOW
    } else {
        GREEN
    }
}

pub fn colorize_lock(locked: bool) -> String {
    if locked {
        format!("{RED}locked{RESET}")
    } else {
        format!("{GREY}open{RESET}")
    }
}
