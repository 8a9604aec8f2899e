//! Per-kind notification settings, stored in the `notifications` list of
//! the config file and tagged by `type`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursThresholdOptions {
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    #[serde(default = "yes")]
    pub exceeded_alert: bool,
    #[serde(default = "yes")]
    pub include_work_order_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledDateOptions {
    #[serde(default = "default_days_before")]
    pub days_before: i64,
    #[serde(default = "yes")]
    pub include_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangeOptions {
    #[serde(default = "yes")]
    pub open_to_complete: bool,
    #[serde(default = "yes")]
    pub complete_to_closed: bool,
    #[serde(default)]
    pub any_to_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkOrderOptions {
    #[serde(default = "yes")]
    pub high_priority: bool,
    #[serde(default = "yes")]
    pub medium_priority: bool,
    #[serde(default)]
    pub low_priority: bool,
}

fn yes() -> bool {
    true
}
fn default_warning_threshold() -> f64 {
    80.0
}
fn default_days_before() -> i64 {
    3
}

impl Default for HoursThresholdOptions {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            exceeded_alert: true,
            include_work_order_owner: true,
        }
    }
}

impl Default for ScheduledDateOptions {
    fn default() -> Self {
        Self {
            days_before: default_days_before(),
            include_owner: true,
        }
    }
}

impl Default for StatusChangeOptions {
    fn default() -> Self {
        Self {
            open_to_complete: true,
            complete_to_closed: true,
            any_to_open: false,
        }
    }
}

impl Default for NewWorkOrderOptions {
    fn default() -> Self {
        Self {
            high_priority: true,
            medium_priority: true,
            low_priority: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationSetting {
    HoursThreshold {
        #[serde(default = "yes")]
        enabled: bool,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default)]
        options: HoursThresholdOptions,
    },
    ScheduledDate {
        #[serde(default = "yes")]
        enabled: bool,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default)]
        options: ScheduledDateOptions,
    },
    StatusChange {
        #[serde(default = "yes")]
        enabled: bool,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default)]
        options: StatusChangeOptions,
    },
    NewWorkOrder {
        #[serde(default = "yes")]
        enabled: bool,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default)]
        options: NewWorkOrderOptions,
    },
}

/// Settings shipped in a fresh config: threshold alerts on, everything
/// else off until recipients are configured.
pub fn default_settings() -> Vec<NotificationSetting> {
    vec![
        NotificationSetting::HoursThreshold {
            enabled: true,
            recipients: Vec::new(),
            options: HoursThresholdOptions::default(),
        },
        NotificationSetting::ScheduledDate {
            enabled: false,
            recipients: Vec::new(),
            options: ScheduledDateOptions::default(),
        },
        NotificationSetting::StatusChange {
            enabled: false,
            recipients: Vec::new(),
            options: StatusChangeOptions::default(),
        },
        NotificationSetting::NewWorkOrder {
            enabled: false,
            recipients: Vec::new(),
            options: NewWorkOrderOptions::default(),
        },
    ]
}

/// Typed lookups over the configured list. A kind missing from the list is
/// disabled, except hours thresholds which fall back to the defaults.
pub struct NotificationSettings<'a>(pub &'a [NotificationSetting]);

impl<'a> NotificationSettings<'a> {
    pub fn hours_threshold(&self) -> Option<(&'a [String], HoursThresholdOptions)> {
        let found = self.0.iter().find_map(|s| match s {
            NotificationSetting::HoursThreshold {
                enabled,
                recipients,
                options,
            } => Some((*enabled, recipients.as_slice(), options.clone())),
            _ => None,
        });
        match found {
            Some((true, r, o)) => Some((r, o)),
            Some((false, _, _)) => None,
            None => Some((&[], HoursThresholdOptions::default())),
        }
    }

    pub fn scheduled_date(&self) -> Option<(&'a [String], &'a ScheduledDateOptions)> {
        self.0.iter().find_map(|s| match s {
            NotificationSetting::ScheduledDate {
                enabled: true,
                recipients,
                options,
            } => Some((recipients.as_slice(), options)),
            _ => None,
        })
    }

    pub fn status_change(&self) -> Option<(&'a [String], &'a StatusChangeOptions)> {
        self.0.iter().find_map(|s| match s {
            NotificationSetting::StatusChange {
                enabled: true,
                recipients,
                options,
            } => Some((recipients.as_slice(), options)),
            _ => None,
        })
    }

    pub fn new_work_order(&self) -> Option<(&'a [String], &'a NewWorkOrderOptions)> {
        self.0.iter().find_map(|s| match s {
            NotificationSetting::NewWorkOrder {
                enabled: true,
                recipients,
                options,
            } => Some((recipients.as_slice(), options)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_is_tagged_by_type_with_defaults() {
        let yaml = r#"
- type: hours_threshold
  recipients: [pm@example.com]
  options:
    warning_threshold: 75
- type: status_change
  enabled: false
"#;
        let parsed: Vec<NotificationSetting> = serde_yaml::from_str(yaml).unwrap();
        let s = NotificationSettings(&parsed);

        let (recipients, opts) = s.hours_threshold().unwrap();
        assert_eq!(recipients, ["pm@example.com".to_string()]);
        assert_eq!(opts.warning_threshold, 75.0);
        assert!(opts.exceeded_alert);

        assert!(s.status_change().is_none());
        assert!(s.new_work_order().is_none());
    }

    #[test]
    fn missing_threshold_setting_uses_defaults() {
        let s = NotificationSettings(&[]);
        let (recipients, opts) = s.hours_threshold().unwrap();
        assert!(recipients.is_empty());
        assert_eq!(opts, HoursThresholdOptions::default());
    }

    #[test]
    fn disabled_threshold_setting_is_off() {
        let list = vec![NotificationSetting::HoursThreshold {
            enabled: false,
            recipients: vec![],
            options: HoursThresholdOptions::default(),
        }];
        assert!(NotificationSettings(&list).hours_threshold().is_none());
    }
}
