use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Anchor a clock interval on `date`. An end earlier than the start is
/// taken to fall on the next day.
pub fn span(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> (NaiveDateTime, NaiveDateTime) {
    let s = date.and_time(start);
    let mut e = date.and_time(end);
    if end < start {
        e += Duration::days(1);
    }
    (s, e)
}

/// Fractional hours between two datetimes.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// Worked span of a shift in hours, crossing midnight when `time_out`
/// precedes `time_in`. Equal times give zero.
pub fn elapsed_hours(date: NaiveDate, time_in: NaiveTime, time_out: NaiveTime) -> f64 {
    let (s, e) = span(date, time_in, time_out);
    hours_between(s, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn same_day_shift() {
        assert_eq!(elapsed_hours(d(), t(8, 0), t(12, 0)), 4.0);
        assert_eq!(elapsed_hours(d(), t(8, 15), t(16, 45)), 8.5);
    }

    #[test]
    fn overnight_shift_rolls_over() {
        assert_eq!(elapsed_hours(d(), t(22, 0), t(6, 0)), 8.0);
    }

    #[test]
    fn equal_times_are_zero() {
        assert_eq!(elapsed_hours(d(), t(9, 0), t(9, 0)), 0.0);
    }

    proptest! {
        #[test]
        fn elapsed_is_within_a_day(a in 0u32..86_400, b in 0u32..86_400) {
            let ta = NaiveTime::from_num_seconds_from_midnight_opt(a, 0).unwrap();
            let tb = NaiveTime::from_num_seconds_from_midnight_opt(b, 0).unwrap();
            let h = elapsed_hours(d(), ta, tb);
            prop_assert!((0.0..24.0).contains(&h));
        }

        #[test]
        fn forward_and_backward_spans_sum_to_a_day(a in 0u32..86_400, b in 0u32..86_400) {
            prop_assume!(a != b);
            let ta = NaiveTime::from_num_seconds_from_midnight_opt(a, 0).unwrap();
            let tb = NaiveTime::from_num_seconds_from_midnight_opt(b, 0).unwrap();
            let total = elapsed_hours(d(), ta, tb) + elapsed_hours(d(), tb, ta);
            prop_assert!((total - 24.0).abs() < 1e-9);
        }
    }
}
