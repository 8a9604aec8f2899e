//! rWorklog main entrypoint.

use rworklog::run;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so command output stays clean.
/// `RWORKLOG_LOG` takes an EnvFilter directive (default: warn).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RWORKLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
