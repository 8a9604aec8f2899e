//! Hour roll-ups for a work order and "just crossed" threshold detection.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThresholdLevel {
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoursSummary {
    pub estimated: f64,
    pub logged: f64,
    pub remaining: f64,
    pub percentage: f64,
}

impl HoursSummary {
    pub fn new(estimated: f64, logged: f64) -> Self {
        Self {
            estimated,
            logged,
            remaining: estimated - logged,
            percentage: percentage(logged, estimated),
        }
    }
}

pub fn percentage(logged: f64, estimated: f64) -> f64 {
    if estimated <= 0.0 {
        0.0
    } else {
        logged / estimated * 100.0
    }
}

/// Float noise allowed when comparing percentages against a line.
const EPSILON: f64 = 1e-9;

/// Threshold crossed by the entry that just added `added_hours`, if any.
///
/// `summary` already includes the new entry; the previous percentage is
/// recomputed from `logged - added_hours`. `Exceeded` wins over `Warning`
/// when both are crossed at once. At or above 100% nothing is reported
/// unless `exceeded_alert` is set.
pub fn crossed_threshold(
    summary: &HoursSummary,
    added_hours: f64,
    warning_pct: f64,
    exceeded_alert: bool,
) -> Option<ThresholdLevel> {
    if summary.estimated <= 0.0 {
        return None;
    }

    let pct = summary.percentage;
    let prev = percentage(summary.logged - added_hours, summary.estimated);

    let reached = |line: f64| pct >= line - EPSILON && prev < line - EPSILON;
    let crossed_warning = reached(warning_pct);
    let crossed_full = reached(100.0);

    if !crossed_warning && !crossed_full {
        return None;
    }

    if pct >= 100.0 - EPSILON {
        return exceeded_alert.then_some(ThresholdLevel::Exceeded);
    }
    Some(ThresholdLevel::Warning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_handles_zero_estimate() {
        let s = HoursSummary::new(0.0, 5.0);
        assert_eq!(s.percentage, 0.0);
        assert_eq!(s.remaining, -5.0);
        assert_eq!(crossed_threshold(&s, 5.0, 80.0, true), None);
    }

    #[test]
    fn crossing_warning_triggers_once() {
        // 7.5h logged of 10, then +1h → 85%
        let s = HoursSummary::new(10.0, 8.5);
        assert_eq!(crossed_threshold(&s, 1.0, 80.0, true), Some(ThresholdLevel::Warning));

        // 85% → 90% stays above the line
        let s = HoursSummary::new(10.0, 9.0);
        assert_eq!(crossed_threshold(&s, 0.5, 80.0, true), None);
    }

    #[test]
    fn exceeded_takes_precedence() {
        let s = HoursSummary::new(10.0, 11.0);
        assert_eq!(crossed_threshold(&s, 4.0, 80.0, true), Some(ThresholdLevel::Exceeded));
    }

    #[test]
    fn exceeded_without_alert_stays_silent() {
        let s = HoursSummary::new(10.0, 10.5);
        assert_eq!(crossed_threshold(&s, 1.0, 80.0, false), None);

        // 85% -> 105% with alerts off
        assert_eq!(crossed_threshold(&s, 2.0, 80.0, false), None);
        assert_eq!(crossed_threshold(&s, 2.0, 80.0, true), Some(ThresholdLevel::Exceeded));
    }

    #[test]
    fn small_entry_after_landing_on_the_line_is_not_a_new_crossing() {
        // 8h of 10h, then +4min
        let added = 4.0 / 60.0;
        let s = HoursSummary::new(10.0, 8.0 + added);
        assert_eq!(crossed_threshold(&s, added, 80.0, true), None);

        // exactly 10h of 10h, then +4min
        let s = HoursSummary::new(10.0, 10.0 + added);
        assert_eq!(crossed_threshold(&s, added, 80.0, true), None);
    }

    #[test]
    fn landing_exactly_on_threshold_counts() {
        let s = HoursSummary::new(10.0, 8.0);
        assert_eq!(crossed_threshold(&s, 2.0, 80.0, false), Some(ThresholdLevel::Warning));
    }
}
