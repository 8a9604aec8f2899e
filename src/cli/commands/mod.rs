pub mod add;
pub mod batch;
pub mod config;
pub mod db;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod project;
pub mod reassign;
pub mod remind;
pub mod task;
pub mod week;
pub mod wo;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::context::Context;
use crate::core::rate_limit::SlidingWindowLimiter;
use crate::db::initialize::open;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::notify::OutboxNotifier;
use crate::utils::date::{parse_date, today};
use crate::utils::path::expand_tilde;
use chrono::NaiveDate;
use std::time::Duration;

/// Everything a command handler needs, built once per invocation.
pub struct Runtime {
    pub cfg: Config,
    pub actor: Option<String>,
    pub test: bool,
    notifier: OutboxNotifier,
    limiter: SlidingWindowLimiter,
}

impl Runtime {
    pub fn new(cli: &Cli, cfg: Config) -> Self {
        let outbox = cli
            .outbox
            .clone()
            .unwrap_or_else(|| cfg.notification_outbox.clone());
        let limiter = SlidingWindowLimiter::new(
            cfg.rate_limit.max_calls,
            Duration::from_secs(cfg.rate_limit.window_secs),
        );

        Self {
            actor: cfg.resolve_actor(cli.user.as_deref()),
            test: cli.test,
            notifier: OutboxNotifier::new(expand_tilde(&outbox)),
            limiter,
            cfg,
        }
    }

    pub fn open_db(&self) -> AppResult<DbPool> {
        open(&self.cfg.database)
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.cfg, self.actor.clone(), &self.notifier, &self.limiter)
    }

    /// `--engineer` if given, otherwise the acting user.
    pub fn engineer(&self, explicit: Option<&String>) -> AppResult<String> {
        explicit
            .cloned()
            .or_else(|| self.actor.clone())
            .ok_or_else(|| AppError::InvalidValue("no engineer given (use --engineer or --user)".into()))
    }
}

pub(crate) fn date_or_today(input: Option<&String>) -> AppResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())),
        None => Ok(today()),
    }
}

pub(crate) fn optional_date(input: Option<&String>) -> AppResult<Option<NaiveDate>> {
    input
        .map(|s| parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())))
        .transpose()
}
