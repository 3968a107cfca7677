use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::app::ports::HttpClientPort;
use crate::config::Config;
use crate::constants::{
    lastdays_query, HISTORICAL_GLOBAL_SEGMENT, HISTORICAL_PATH, HISTORICAL_SOURCE, SNAPSHOT_PATH,
    SNAPSHOT_SOURCE, TIME_SERIES_PATH, TIME_SERIES_SOURCE,
};
use crate::error::{Result, TrackerError};
use crate::observability::metrics::{
    emit_counter, emit_gauge, emit_source_counter, emit_source_histogram, record_reconciliation, MetricName,
};
use crate::pipeline::ingestion::decode::{
    decode_country_timeline, decode_global_timeline, decode_snapshot, decode_time_series, Decoded,
};
use crate::pipeline::processing::alias::{AliasResolver, AliasTables};
use crate::pipeline::processing::reconcile::{CountryReconciler, Reconciliation};
use crate::types::{CanonicalCountry, CountryTimeline, Timeline};

/// Join a base URL and an absolute API path
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Historical endpoint for `segment` (`all`, an ISO code or a country name), percent-encoded
pub fn historical_url(base_url: &str, segment: &str, days: Option<u32>) -> Result<String> {
    let mut url = reqwest::Url::parse(&endpoint(base_url, HISTORICAL_PATH))
        .map_err(|e| TrackerError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| TrackerError::Config(format!("Base URL '{}' cannot carry a path", base_url)))?
        .push(segment);
    url.set_query(Some(&lastdays_query(days)));
    Ok(url.to_string())
}

/// ISO3 when the snapshot supplied one, the canonical name otherwise
pub fn country_segment(country: &CanonicalCountry) -> &str {
    country
        .iso3()
        .filter(|iso3| !iso3.trim().is_empty())
        .unwrap_or(country.name.as_str())
}

/// Fetches the upstream feeds and hands them to the reconciliation core
pub struct DashboardUseCase {
    http: Arc<dyn HttpClientPort>,
    base_url: String,
    aliases: AliasTables,
}

impl DashboardUseCase {
    /// Use case with the built-in alias tables
    pub fn new(http: Arc<dyn HttpClientPort>, base_url: impl Into<String>) -> Self {
        Self::with_aliases(http, base_url, AliasTables::builtin())
    }

    pub fn with_aliases(http: Arc<dyn HttpClientPort>, base_url: impl Into<String>, aliases: AliasTables) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            aliases,
        }
    }

    pub fn from_config(http: Arc<dyn HttpClientPort>, config: &Config) -> Self {
        Self::with_aliases(http, config.api.base_url.clone(), config.alias_tables())
    }

    pub fn aliases(&self) -> &AliasTables {
        &self.aliases
    }

    async fn fetch(&self, source: &'static str, url: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        info!("Fetching {} from {}", source, url);

        let response = match self.http.get(url).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} fetch failed: {}", source, e);
                emit_source_counter(MetricName::FetchError, source, 1);
                return Err(TrackerError::Api {
                    message: format!("{} fetch failed: {}", source, e),
                });
            }
        };

        if !response.is_success() {
            error!("{} fetch returned HTTP {}", source, response.status);
            emit_source_counter(MetricName::FetchError, source, 1);
            return Err(TrackerError::Api {
                message: format!("{} fetch returned HTTP {}", source, response.status),
            });
        }

        if !response.is_json() {
            warn!(
                "{} responded with content type '{}', decoding as JSON anyway",
                source, response.content_type
            );
        }

        emit_source_counter(MetricName::FetchSuccess, source, 1);
        emit_source_histogram(MetricName::FetchDuration, source, start_time.elapsed().as_secs_f64());
        emit_source_histogram(MetricName::FetchBytes, source, response.bytes.len() as f64);
        Ok(response.bytes)
    }

    fn record_decode<T>(source: &'static str, decoded: &Decoded<T>) {
        emit_source_counter(MetricName::DecodeRecords, source, decoded.records.len() as u64);
        if decoded.skipped > 0 {
            warn!("Skipped {} malformed {} records", decoded.skipped, source);
            emit_source_counter(MetricName::DecodeSkipped, source, decoded.skipped as u64);
        }
    }

    /// Fetch both feeds concurrently and reconcile them once both have arrived.
    /// Either fetch failing fails the whole call; nothing is reconciled from partial data.
    #[instrument(skip(self))]
    pub async fn load_reconciliation(&self) -> Result<Reconciliation> {
        let time_series_url = endpoint(&self.base_url, TIME_SERIES_PATH);
        let snapshot_url = endpoint(&self.base_url, SNAPSHOT_PATH);

        let (time_series_bytes, snapshot_bytes) = tokio::try_join!(
            self.fetch(TIME_SERIES_SOURCE, &time_series_url),
            self.fetch(SNAPSHOT_SOURCE, &snapshot_url),
        )?;

        let time_series = decode_time_series(&time_series_bytes)?;
        Self::record_decode(TIME_SERIES_SOURCE, &time_series);
        let snapshot = decode_snapshot(&snapshot_bytes)?;
        Self::record_decode(SNAPSHOT_SOURCE, &snapshot);

        let start_time = Instant::now();
        let reconciler = CountryReconciler::new(AliasResolver::new(&self.aliases));
        let reconciliation = reconciler.reconcile_with_report(&time_series.records, &snapshot.records);
        record_reconciliation(
            &reconciliation.report,
            reconciliation.countries.len(),
            start_time.elapsed().as_secs_f64(),
        );

        Ok(reconciliation)
    }

    pub async fn load_countries(&self) -> Result<Vec<CanonicalCountry>> {
        Ok(self.load_reconciliation().await?.countries)
    }

    #[instrument(skip(self))]
    pub async fn load_global_timeline(&self, days: Option<u32>) -> Result<Timeline> {
        let url = historical_url(&self.base_url, HISTORICAL_GLOBAL_SEGMENT, days)?;
        let bytes = self.fetch(HISTORICAL_SOURCE, &url).await?;
        let timeline = decode_global_timeline(&bytes)?;
        Self::record_timeline(&timeline);
        Ok(timeline)
    }

    #[instrument(skip(self, country), fields(country = %country.name))]
    pub async fn load_country_timeline(&self, country: &CanonicalCountry, days: Option<u32>) -> Result<CountryTimeline> {
        let url = historical_url(&self.base_url, country_segment(country), days)?;
        let bytes = self.fetch(HISTORICAL_SOURCE, &url).await?;
        let timeline = decode_country_timeline(&bytes)?;
        Self::record_timeline(&timeline.timeline);
        Ok(timeline)
    }

    fn record_timeline(timeline: &Timeline) {
        let cases = timeline.cases_formatted();
        let dropped = timeline.cases.len() - cases.len() + timeline.deaths.len() - timeline.deaths_formatted().len();
        emit_gauge(MetricName::TimelinePoints, cases.len() as f64);
        if dropped > 0 {
            warn!("Dropped {} timeline keys (unparseable or same-day duplicates)", dropped);
            emit_counter(MetricName::TimelineKeysDropped, dropped as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountryInfo, CovidStats};

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://disease.sh/", TIME_SERIES_PATH),
            "https://disease.sh/v3/covid-19/jhucsse"
        );
    }

    #[test]
    fn test_historical_url_encodes_names() {
        assert_eq!(
            historical_url("https://disease.sh", "all", None).unwrap(),
            "https://disease.sh/v3/covid-19/historical/all?lastdays=all"
        );
        assert_eq!(
            historical_url("https://disease.sh", "United Kingdom", Some(30)).unwrap(),
            "https://disease.sh/v3/covid-19/historical/United%20Kingdom?lastdays=30"
        );
    }

    #[test]
    fn test_historical_url_rejects_bad_base() {
        assert!(matches!(
            historical_url("not a url", "all", None).unwrap_err(),
            TrackerError::Config(_)
        ));
    }

    #[test]
    fn test_country_segment_prefers_iso3() {
        let mut country = CanonicalCountry::from_time_series("Canada", CovidStats::default());
        assert_eq!(country_segment(&country), "Canada");
        country.iso_info = Some(CountryInfo {
            iso2: Some("CA".to_string()),
            iso3: Some("CAN".to_string()),
            flag_url: None,
        });
        assert_eq!(country_segment(&country), "CAN");
    }
}
