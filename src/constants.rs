/// Upstream API constants shared by the fetch layer and the CLI
/// Paths are relative to the configured base URL (disease.sh by default)

pub const DEFAULT_BASE_URL: &str = "https://disease.sh";

// Input A: per-province cumulative counts (JHU CSSE mirror)
pub const TIME_SERIES_PATH: &str = "/v3/covid-19/jhucsse";

// Input B: per-country snapshot with demographics (Worldometers mirror)
pub const SNAPSHOT_PATH: &str = "/v3/covid-19/countries";

// Input C: historical timelines, `all` or a country segment
pub const HISTORICAL_PATH: &str = "/v3/covid-19/historical";
pub const HISTORICAL_GLOBAL_SEGMENT: &str = "all";

/// Date format of timeline keys, e.g. "1/22/20"
pub const TIMELINE_DATE_FORMAT: &str = "%m/%d/%y";

/// Source labels used in logs, metrics and decode errors
pub const TIME_SERIES_SOURCE: &str = "jhucsse";
pub const SNAPSHOT_SOURCE: &str = "worldometers";
pub const HISTORICAL_SOURCE: &str = "historical";

/// Rows in the time-series feed that are not countries
pub const NON_COUNTRY_ENTRIES: [&str; 5] = [
    "Antarctica",
    "Diamond Princess",
    "MS Zaandam",
    "Summer Olympics 2020",
    "Winter Olympics 2022",
];

/// Build the historical query string for the given number of days (`None` = all)
pub fn lastdays_query(days: Option<u32>) -> String {
    match days {
        Some(n) => format!("lastdays={}", n),
        None => "lastdays=all".to_string(),
    }
}
