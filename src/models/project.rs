use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub work_order_id: i64,
    pub name: String,
    pub description: String,
    pub status: String, // Planning, In Progress, Completed, On Hold
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

impl TaskStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Delayed => "Delayed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "not started" => Some(TaskStatus::NotStarted),
            "in progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "delayed" => Some(TaskStatus::Delayed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectTask {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: String,
    pub estimated_hours: f64,
    /// Running total, moved by assign/unassign; see `core::task::reconcile`.
    pub actual_hours: f64,
    pub progress_percent: Option<u8>,
    pub dependencies: String,
    pub assigned_to: Option<String>,
    pub position: i64,
}

impl ProjectTask {
    pub fn hours_remaining(&self) -> f64 {
        self.estimated_hours - self.actual_hours
    }

    /// 100 once completed, otherwise the manual override, otherwise the
    /// hours ratio capped at 99.
    pub fn completion_percentage(&self) -> u8 {
        if self.status == TaskStatus::Completed {
            return 100;
        }
        if let Some(p) = self.progress_percent {
            return p.min(100);
        }
        if self.estimated_hours == 0.0 {
            return 0;
        }
        let pct = (self.actual_hours / self.estimated_hours) * 100.0;
        pct.clamp(0.0, 99.0) as u8
    }

    /// Task ids this task depends on, ignoring malformed items.
    pub fn dependency_ids(&self) -> Vec<i64> {
        self.dependencies
            .split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect()
    }
}
