//! Date and name normalization shared by both source adapters.
//!
//! Health Connect stores instants as UTC epoch milliseconds plus the zone offset that was in
//! effect when the record was written. The offset is added to the instant and the shifted
//! instant is rendered as UTC, which yields the wall-clock date the user saw. All day
//! bucketing downstream depends on this exact conversion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Marks the start of a superset annotation appended to an exercise name,
/// e.g. `Bench Press [Superset 1]`.
pub const SUPERSET_DELIMITER: char = '[';

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Wall-clock date-time for an epoch-millisecond instant and an optional offset in seconds.
/// A missing offset is treated as UTC. `None` only when the shifted instant is out of range.
pub fn local_datetime(epoch_ms: i64, offset_s: Option<i32>) -> Option<NaiveDateTime> {
    let shifted = epoch_ms.checked_add(i64::from(offset_s.unwrap_or(0)) * 1000)?;
    DateTime::from_timestamp_millis(shifted).map(|dt| dt.naive_utc())
}

pub fn local_date(epoch_ms: i64, offset_s: Option<i32>) -> Option<NaiveDate> {
    local_datetime(epoch_ms, offset_s).map(|dt| dt.date())
}

/// `YYYY-MM-DDTHH:MM:SS`, sub-second part dropped.
pub fn local_datetime_string(epoch_ms: i64, offset_s: Option<i32>) -> Option<String> {
    local_datetime(epoch_ms, offset_s).map(|dt| dt.format(LOCAL_DATETIME_FORMAT).to_string())
}

/// Date from a textual cell: the first ten characters must be an ISO `YYYY-MM-DD` date.
/// Anything else means "no date" and the row is dropped by the caller.
pub fn date_from_text(text: &str) -> Option<NaiveDate> {
    let prefix = text.trim_start().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Exercise name with any superset annotation removed and whitespace trimmed.
pub fn strip_superset_suffix(name: &str) -> &str {
    match name.split_once(SUPERSET_DELIMITER) {
        Some((head, _)) => head.trim(),
        None => name.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-03-01T00:30:00Z
    const MARCH_FIRST_0030: i64 = 1_709_253_000_000;

    #[test]
    fn offset_is_baked_into_the_instant() {
        assert_eq!(local_date(MARCH_FIRST_0030, None), Some(ymd(2024, 3, 1)));
        assert_eq!(local_date(MARCH_FIRST_0030, Some(0)), Some(ymd(2024, 3, 1)));
        assert_eq!(local_date(MARCH_FIRST_0030, Some(-3600)), Some(ymd(2024, 2, 29)));
        assert_eq!(local_date(MARCH_FIRST_0030, Some(10 * 3600)), Some(ymd(2024, 3, 1)));
        assert_eq!(
            local_datetime_string(MARCH_FIRST_0030, Some(-3600)).as_deref(),
            Some("2024-02-29T23:30:00")
        );
    }

    #[test]
    fn sub_second_parts_are_truncated() {
        assert_eq!(
            local_datetime_string(MARCH_FIRST_0030 + 999, Some(7200)).as_deref(),
            Some("2024-03-01T02:30:00")
        );
    }

    #[test]
    fn pre_epoch_instants_floor_to_the_previous_day() {
        assert_eq!(local_date(-1, None), Some(ymd(1969, 12, 31)));
        assert_eq!(local_date(0, None), Some(ymd(1970, 1, 1)));
    }

    #[test]
    fn local_date_is_monotonic_for_fixed_offset() {
        for offset in [-43_200, -3_600, 0, 19_800, 50_400] {
            let mut previous: Option<NaiveDate> = None;
            let mut ms = MARCH_FIRST_0030 - 3 * 86_400_000;
            while ms < MARCH_FIRST_0030 + 3 * 86_400_000 {
                let date = local_date(ms, Some(offset)).expect("in range");
                if let Some(prev) = previous {
                    assert!(date >= prev, "offset {} at {}: {} < {}", offset, ms, date, prev);
                }
                previous = Some(date);
                ms += 997_331;
            }
        }
    }

    #[test]
    fn out_of_range_instants_have_no_date() {
        assert_eq!(local_date(i64::MAX, Some(3600)), None);
    }

    #[test]
    fn text_dates_use_iso_prefix() {
        assert_eq!(date_from_text("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(date_from_text("2024-03-01T07:15:00"), Some(ymd(2024, 3, 1)));
        assert_eq!(date_from_text("2024-03-01 07:15"), Some(ymd(2024, 3, 1)));
        assert_eq!(date_from_text("03/01/2024"), None);
        assert_eq!(date_from_text("2024-3-1"), None);
        assert_eq!(date_from_text(""), None);
        assert_eq!(date_from_text("2024-02-30"), None);
    }

    #[test]
    fn superset_suffix_is_stripped() {
        assert_eq!(strip_superset_suffix("Bench Press [Superset 1]"), "Bench Press");
        assert_eq!(strip_superset_suffix("  Lat Pulldown  "), "Lat Pulldown");
        assert_eq!(strip_superset_suffix("Curl (Dumbbell) [A]"), "Curl (Dumbbell)");
        assert_eq!(strip_superset_suffix("[Superset 2]"), "");
    }
}
