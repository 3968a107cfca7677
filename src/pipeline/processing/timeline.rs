use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::TIMELINE_DATE_FORMAT;
use crate::types::{Timeline, TimelinePoint};

/// Parse a `M/D/YY` timeline key
pub fn parse_timeline_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), TIMELINE_DATE_FORMAT).ok()
}

/// Turn a date-keyed series into dated points, most recent first.
///
/// Unparseable keys are dropped. Two keys naming the same day ("01/02/20" and
/// "1/2/20") collapse to one point carrying the larger value, keeping the
/// ordering strictly descending.
pub fn format_series(series: &HashMap<String, u64>) -> Vec<TimelinePoint> {
    let mut points: Vec<TimelinePoint> = series
        .iter()
        .filter_map(|(key, value)| match parse_timeline_date(key) {
            Some(date) => Some((date, *value)),
            None => {
                debug!("Dropping unparseable timeline key: {:?}", key);
                None
            }
        })
        .collect();

    points.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    points.dedup_by_key(|point| point.0);
    points
}

/// Most recent value of a formatted series
pub fn latest(points: &[TimelinePoint]) -> Option<TimelinePoint> {
    points.first().copied()
}

impl Timeline {
    pub fn cases_formatted(&self) -> Vec<TimelinePoint> {
        format_series(&self.cases)
    }

    pub fn deaths_formatted(&self) -> Vec<TimelinePoint> {
        format_series(&self.deaths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_formats_descending_and_drops_bad_keys() {
        let input = series(&[("01/02/20", 5), ("bad-date", 9), ("01/01/20", 3)]);
        assert_eq!(format_series(&input), vec![(date(2020, 1, 2), 5), (date(2020, 1, 1), 3)]);
    }

    #[test]
    fn test_accepts_unpadded_keys() {
        let input = series(&[("1/22/20", 557), ("12/31/21", 288_000_000), ("3/9/23", 676_000_000)]);
        let formatted = format_series(&input);
        assert_eq!(
            formatted,
            vec![
                (date(2023, 3, 9), 676_000_000),
                (date(2021, 12, 31), 288_000_000),
                (date(2020, 1, 22), 557),
            ]
        );
        assert_eq!(latest(&formatted), Some((date(2023, 3, 9), 676_000_000)));
    }

    #[test]
    fn test_empty_series() {
        assert!(format_series(&HashMap::new()).is_empty());
        assert_eq!(latest(&[]), None);
    }

    #[test]
    fn test_same_day_spelled_twice_collapses() {
        let input = series(&[("01/02/20", 5), ("1/2/20", 7), ("1/1/20", 1)]);
        assert_eq!(format_series(&input), vec![(date(2020, 1, 2), 7), (date(2020, 1, 1), 1)]);
    }

    #[test]
    fn test_rejects_other_formats() {
        assert_eq!(parse_timeline_date("2020-01-02"), None);
        assert_eq!(parse_timeline_date("13/01/20"), None);
        assert_eq!(parse_timeline_date(""), None);
    }

    #[test]
    fn test_timeline_helpers() {
        let timeline = Timeline {
            cases: series(&[("1/1/20", 1), ("1/2/20", 2)]),
            deaths: series(&[("1/2/20", 0)]),
        };
        assert_eq!(timeline.cases_formatted()[0], (date(2020, 1, 2), 2));
        assert_eq!(timeline.deaths_formatted(), vec![(date(2020, 1, 2), 0)]);
    }
}
