//! Config file upkeep for `config --check`.

use serde_yaml::Value;

/// Top-level keys a complete config file carries.
pub const EXPECTED_FIELDS: &[&str] = &[
    "database",
    "default_engineer",
    "lunch_max_hours_after_start",
    "notification_outbox",
    "rate_limit",
    "notifications",
];

/// Keys from [`EXPECTED_FIELDS`] absent in `yaml`. These fall back to
/// defaults at load time.
pub fn missing_fields(yaml: &str) -> Result<Vec<&'static str>, serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let map = value.as_mapping().cloned().unwrap_or_default();

    Ok(EXPECTED_FIELDS
        .iter()
        .copied()
        .filter(|k| !map.contains_key(Value::String(k.to_string())))
        .collect())
}
