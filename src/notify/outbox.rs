use super::{Notice, Notifier, NotifyError};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Appends each notice as one JSON line to a file that an external mailer
/// drains.
pub struct OutboxNotifier {
    path: PathBuf,
}

#[derive(Serialize)]
struct OutboxLine<'a> {
    queued_at: String,
    #[serde(flatten)]
    notice: &'a Notice,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Notifier for OutboxNotifier {
    fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&OutboxLine {
            queued_at: chrono::Utc::now().to_rfc3339(),
            notice,
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
