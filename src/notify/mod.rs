//! Outbound notifications.
//!
//! Core logic builds [`Notice`] values and hands them to a [`Notifier`]
//! after the triggering transaction has committed. Delivery problems are
//! logged and audited, never returned to the caller.

pub mod outbox;
pub mod settings;

use crate::core::calculator::threshold::{HoursSummary, ThresholdLevel};
use crate::db::log::{audit, object};
use crate::models::{Priority, WorkOrder, WorkOrderStatus};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub use outbox::OutboxNotifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    HoursThreshold {
        work_order_id: i64,
        job_number: String,
        level: ThresholdLevel,
        summary: HoursSummary,
        recipients: Vec<String>,
    },
    ScheduledDate {
        work_order_id: i64,
        job_number: String,
        scheduled_date: NaiveDate,
        days_before: i64,
        recipients: Vec<String>,
    },
    StatusChange {
        work_order_id: i64,
        job_number: String,
        from: WorkOrderStatus,
        to: WorkOrderStatus,
        recipients: Vec<String>,
    },
    NewWorkOrder {
        work_order_id: i64,
        job_number: String,
        priority: Priority,
        recipients: Vec<String>,
    },
}

impl Notice {
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::HoursThreshold { .. } => "hours_threshold",
            Notice::ScheduledDate { .. } => "scheduled_date",
            Notice::StatusChange { .. } => "status_change",
            Notice::NewWorkOrder { .. } => "new_work_order",
        }
    }

    pub fn work_order_id(&self) -> i64 {
        match self {
            Notice::HoursThreshold { work_order_id, .. }
            | Notice::ScheduledDate { work_order_id, .. }
            | Notice::StatusChange { work_order_id, .. }
            | Notice::NewWorkOrder { work_order_id, .. } => *work_order_id,
        }
    }

    pub fn recipients(&self) -> &[String] {
        match self {
            Notice::HoursThreshold { recipients, .. }
            | Notice::ScheduledDate { recipients, .. }
            | Notice::StatusChange { recipients, .. }
            | Notice::NewWorkOrder { recipients, .. } => recipients,
        }
    }

    /// One-line text for terminal output and the audit trail.
    pub fn summary_line(&self) -> String {
        match self {
            Notice::HoursThreshold {
                job_number,
                level,
                summary,
                ..
            } => format!(
                "Work order {} {} hours threshold: {:.1}% of {:.2}h estimate used",
                job_number,
                match level {
                    ThresholdLevel::Warning => "reached the warning",
                    ThresholdLevel::Exceeded => "exceeded its",
                },
                summary.percentage,
                summary.estimated
            ),
            Notice::ScheduledDate {
                job_number,
                scheduled_date,
                ..
            } => format!("Work order {} is scheduled for {}", job_number, scheduled_date),
            Notice::StatusChange {
                job_number,
                from,
                to,
                ..
            } => format!(
                "Work order {} changed from {} to {}",
                job_number,
                from.to_db_str(),
                to.to_db_str()
            ),
            Notice::NewWorkOrder {
                job_number,
                priority,
                ..
            } => format!(
                "New {} priority work order {}",
                priority.to_db_str(),
                job_number
            ),
        }
    }
}

/// Configured recipients plus, when asked for, the work order owner.
pub fn recipients_for(configured: &[String], wo: &WorkOrder, include_owner: bool) -> Vec<String> {
    let mut out: Vec<String> = configured.to_vec();
    if include_owner
        && let Some(owner) = wo.owner_email()
        && !out.iter().any(|r| r == owner)
    {
        out.push(owner.to_string());
    }
    out
}

pub trait Notifier {
    fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Send `notice` and record the outcome in the audit trail.
///
/// Runs after the mutation has committed; nothing here can fail the
/// caller.
pub fn deliver(conn: &Connection, notifier: &dyn Notifier, actor: Option<&str>, notice: &Notice) {
    let (action, description) = match notifier.send(notice) {
        Ok(()) => {
            debug!(kind = notice.kind(), work_order = notice.work_order_id(), "notification sent");
            ("notification_sent", notice.summary_line())
        }
        Err(e) => {
            warn!(kind = notice.kind(), work_order = notice.work_order_id(), error = %e, "notification failed");
            ("notification_failed", format!("{}: {}", notice.kind(), e))
        }
    };

    if let Err(e) = audit(
        conn,
        actor,
        action,
        object::NOTIFICATION,
        Some(notice.work_order_id()),
        &description,
    ) {
        warn!(error = %e, "could not record notification outcome");
    }
}
