//! Timestamps are stored as `HH:MM:SS DD/MM/YYYY` in fixed UTC-3.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

const BRASILIA_OFFSET_SECS: i32 = 3 * 3600;

pub fn brasilia_offset() -> FixedOffset {
    FixedOffset::west_opt(BRASILIA_OFFSET_SECS).expect("UTC-3 is within offset bounds")
}

pub fn format_timestamp<Tz: TimeZone>(at: DateTime<Tz>) -> String {
    at.with_timezone(&brasilia_offset()).format(TIMESTAMP_FORMAT).to_string()
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}

/// Descending chronological order; unparseable stamps sort after parseable ones.
pub fn most_recent_first(a: &str, b: &str) -> Ordering {
    parse_timestamp(b).cmp(&parse_timestamp(a))
}

/// Stable sort, so records with equal stamps keep their append order.
pub fn sort_most_recent_first<T, F>(items: &mut [T], stamp: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| most_recent_first(stamp(a), stamp(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_utc_minus_three() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 1, 30, 5).unwrap();
        assert_eq!(format_timestamp(at), "22:30:05 01/01/2025");
    }

    #[test]
    fn now_round_trips_through_parse() {
        assert!(parse_timestamp(&now_timestamp()).is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn ordering_is_chronological_not_lexical() {
        // lexically "09:00:00 02/01/2025" < "23:00:00 01/01/2025"
        let mut stamps = vec!["23:00:00 01/01/2025", "09:00:00 02/01/2025", "garbage", "10:00:00 31/12/2024"];
        sort_most_recent_first(&mut stamps, |s| *s);
        assert_eq!(stamps, vec!["09:00:00 02/01/2025", "23:00:00 01/01/2025", "10:00:00 31/12/2024", "garbage"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut items = vec![("a", "10:00:00 01/01/2025"), ("b", "10:00:00 01/01/2025"), ("c", "11:00:00 01/01/2025")];
        sort_most_recent_first(&mut items, |i| i.1);
        let ids: Vec<_> = items.iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
