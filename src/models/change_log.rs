use serde::Serialize;

/// One row of the `change_log` audit table.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeLogRow {
    pub id: i64,
    pub timestamp: String,
    pub actor: Option<String>,
    pub action: String,
    pub object_type: String,
    pub object_id: Option<i64>,
    pub description: String,
}
