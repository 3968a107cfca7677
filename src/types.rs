use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Cumulative-to-date case and death counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovidStats {
    #[serde(default, deserialize_with = "nullable_count")]
    pub confirmed: u64,
    #[serde(default, deserialize_with = "nullable_count")]
    pub deaths: u64,
}

impl CovidStats {
    pub fn new(confirmed: u64, deaths: u64) -> Self {
        Self { confirmed, deaths }
    }

    /// Saturating so a corrupt feed can never wrap a total
    pub fn saturating_add(self, other: CovidStats) -> Self {
        Self {
            confirmed: self.confirmed.saturating_add(other.confirmed),
            deaths: self.deaths.saturating_add(other.deaths),
        }
    }
}

/// Coordinates as the time-series feed sends them (strings, occasionally numbers)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "string_or_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub longitude: Option<String>,
}

impl Coordinates {
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.longitude.as_deref()?.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// One row of the time-series feed (Input A)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProvinceRecord {
    #[serde(default, deserialize_with = "nullable_default")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stats: Option<CovidStats>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
}

impl RawProvinceRecord {
    pub fn new(country: impl Into<String>, province: Option<&str>, stats: Option<CovidStats>) -> Self {
        Self {
            country: country.into(),
            province: province.map(str::to_string),
            updated_at: None,
            stats,
            coordinates: None,
        }
    }

    /// Blank province strings count as absent
    pub fn has_province(&self) -> bool {
        self.province
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
    }

    /// Absent stats degrade to zero
    pub fn stats_or_zero(&self) -> CovidStats {
        self.stats.unwrap_or_default()
    }
}

/// ISO codes and flag image of a snapshot country
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub iso2: Option<String>,
    #[serde(default)]
    pub iso3: Option<String>,
    #[serde(default, rename = "flag")]
    pub flag_url: Option<String>,
}

impl CountryInfo {
    pub fn is_empty(&self) -> bool {
        self.iso2.is_none() && self.iso3.is_none() && self.flag_url.is_none()
    }
}

/// One row of the snapshot feed (Input B)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshotRecord {
    #[serde(default, deserialize_with = "nullable_default")]
    pub country: String,
    /// Milliseconds since the epoch
    #[serde(default, deserialize_with = "lenient")]
    pub updated: Option<i64>,
    #[serde(default, deserialize_with = "nullable_count")]
    pub cases: u64,
    #[serde(default, deserialize_with = "nullable_count")]
    pub deaths: u64,
    #[serde(default, deserialize_with = "optional_count")]
    pub population: Option<u64>,
    #[serde(default, deserialize_with = "optional_count")]
    pub tests: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub continent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country_info: Option<CountryInfo>,
}

impl RawSnapshotRecord {
    pub fn new(country: impl Into<String>, cases: u64, deaths: u64) -> Self {
        Self {
            country: country.into(),
            updated: None,
            cases,
            deaths,
            population: None,
            tests: None,
            continent: None,
            country_info: None,
        }
    }
}

/// The reconciled per-country record handed to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCountry {
    pub name: String,
    pub continent: Option<String>,
    pub population: Option<u64>,
    pub tests_administered: Option<u64>,
    pub iso_info: Option<CountryInfo>,
    pub stats: CovidStats,
}

impl CanonicalCountry {
    pub fn from_snapshot(record: &RawSnapshotRecord) -> Self {
        Self {
            name: record.country.clone(),
            continent: record.continent.clone().filter(|c| !c.trim().is_empty()),
            population: record.population,
            tests_administered: record.tests,
            iso_info: record.country_info.clone().filter(|info| !info.is_empty()),
            stats: CovidStats::new(record.cases, record.deaths),
        }
    }

    pub fn from_time_series(name: impl Into<String>, stats: CovidStats) -> Self {
        Self {
            name: name.into(),
            continent: None,
            population: None,
            tests_administered: None,
            iso_info: None,
            stats,
        }
    }

    pub fn iso3(&self) -> Option<&str> {
        self.iso_info.as_ref()?.iso3.as_deref()
    }

    pub fn iso2(&self) -> Option<&str> {
        self.iso_info.as_ref()?.iso2.as_deref()
    }
}

/// Historical series keyed by `M/D/YY` date strings (Input C)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default, deserialize_with = "nullable_default")]
    pub cases: HashMap<String, u64>,
    #[serde(default, deserialize_with = "nullable_default")]
    pub deaths: HashMap<String, u64>,
}

/// Per-country historical response wrapping a `Timeline`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryTimeline {
    #[serde(default, deserialize_with = "nullable_default")]
    pub country: String,
    pub timeline: Timeline,
}

/// A single dated value of a formatted timeline
pub type TimelinePoint = (NaiveDate, u64);

fn nullable_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// A field of the wrong JSON type degrades to absent instead of failing the record
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn nullable_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_count(deserializer)?.unwrap_or(0))
}

// Negative counts show up in the feed as corrections; clamp them to zero
fn optional_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        _ => None,
    }))
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
