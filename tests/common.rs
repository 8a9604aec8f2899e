#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Isolated home, database and outbox for one test.
pub struct Sandbox {
    pub dir: PathBuf,
    pub db: String,
    pub outbox: String,
}

impl Sandbox {
    /// Fresh directory under the system temp dir, with `init` already run.
    pub fn new(name: &str) -> Self {
        let dir = env::temp_dir().join(format!("rworklog_it_{}", name));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).expect("create sandbox dir");

        let sb = Sandbox {
            db: dir.join("worklog.sqlite").to_string_lossy().to_string(),
            outbox: dir.join("outbox.jsonl").to_string_lossy().to_string(),
            dir,
        };
        sb.run(&["init"]).assert().success();
        sb
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rworklog");
        cmd.env("HOME", &self.dir)
            .env("APPDATA", &self.dir)
            .env_remove("RWORKLOG_LOG")
            .args([
                "--db",
                self.db.as_str(),
                "--outbox",
                self.outbox.as_str(),
                "--user",
                "tester",
                "--test",
            ]);
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.args(args);
        cmd
    }

    /// Absolute path of a file inside the sandbox.
    pub fn path(&self, file: &str) -> String {
        self.dir.join(file).to_string_lossy().to_string()
    }

    pub fn outbox_lines(&self) -> Vec<serde_json::Value> {
        fs::read_to_string(&self.outbox)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("outbox line is JSON"))
            .collect()
    }

    /// Write a config file where `Config::load` looks for it.
    pub fn write_config(&self, yaml: &str) {
        for dir in [self.dir.join(".rworklog"), self.dir.join("rworklog")] {
            fs::create_dir_all(&dir).expect("create config dir");
            fs::write(dir.join("rworklog.conf"), yaml).expect("write config");
        }
    }

    /// Create a work order and return nothing; ids are assigned 1, 2, ...
    pub fn work_order(&self, job: &str, estimate: &str) {
        self.run(&["wo", "add", job, "-m", "Pump overhaul", "--estimate", estimate])
            .assert()
            .success();
    }
}
