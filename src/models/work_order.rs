use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkOrderStatus {
    Open,
    Complete,
    Closed,
}

impl WorkOrderStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "Open",
            WorkOrderStatus::Complete => "Complete",
            WorkOrderStatus::Closed => "Closed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(WorkOrderStatus::Open),
            "Complete" => Some(WorkOrderStatus::Complete),
            "Closed" => Some(WorkOrderStatus::Closed),
            _ => None,
        }
    }

    /// Helper: accept CLI input in any case
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "open" => Some(WorkOrderStatus::Open),
            "complete" => Some(WorkOrderStatus::Complete),
            "closed" => Some(WorkOrderStatus::Closed),
            _ => None,
        }
    }

    /// No time can be logged once the job is finished.
    pub fn accepts_time(&self) -> bool {
        matches!(self, WorkOrderStatus::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOrder {
    pub id: i64,
    pub customer_work_order_number: Option<String>,
    pub job_number: String,
    pub description: String,
    pub status: WorkOrderStatus,
    pub owner: Option<String>,
    pub estimated_hours: f64,
    pub priority: Priority,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub classification: String,
    pub approved_for_work: bool,
    pub created_at: String,
}

impl WorkOrder {
    /// Owner field doubles as an address when it looks like one.
    pub fn owner_email(&self) -> Option<&str> {
        self.owner.as_deref().filter(|o| o.contains('@'))
    }
}

/// Fields accepted by `wo add`.
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub customer_work_order_number: Option<String>,
    pub job_number: String,
    pub description: String,
    pub owner: Option<String>,
    pub estimated_hours: f64,
    pub priority: Priority,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub classification: String,
}
