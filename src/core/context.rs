use crate::config::Config;
use crate::core::rate_limit::RateLimiter;
use crate::notify::Notifier;
use crate::notify::settings::{NotificationSetting, NotificationSettings};

/// Collaborators and policy shared by every mutating operation.
pub struct Context<'a> {
    pub actor: Option<String>,
    pub lunch_limit_hours: f64,
    pub notifications: &'a [NotificationSetting],
    pub notifier: &'a dyn Notifier,
    pub limiter: &'a dyn RateLimiter,
}

impl<'a> Context<'a> {
    pub fn new(
        cfg: &'a Config,
        actor: Option<String>,
        notifier: &'a dyn Notifier,
        limiter: &'a dyn RateLimiter,
    ) -> Self {
        Self {
            actor,
            lunch_limit_hours: cfg.lunch_max_hours_after_start,
            notifications: &cfg.notifications,
            notifier,
            limiter,
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Key used by the rate limiter.
    pub fn limiter_key(&self) -> &str {
        self.actor.as_deref().unwrap_or("anonymous")
    }

    pub fn settings(&self) -> NotificationSettings<'a> {
        NotificationSettings(self.notifications)
    }
}
