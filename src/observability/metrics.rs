//! Metrics for the fetch and reconciliation phases
//!
//! Recorded through the `metrics` facade; `init` installs a Prometheus
//! recorder whose handle renders the text exposition format. Without a
//! recorder every call here is a no-op, which is what tests rely on.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

use crate::pipeline::processing::reconcile::ReconciliationReport;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch metrics
    FetchSuccess,
    FetchError,
    FetchDuration,
    FetchBytes,

    // Decode metrics
    DecodeRecords,
    DecodeSkipped,

    // Reconcile metrics
    AggregatedCountries,
    NonCountriesDropped,
    AliasResolutions,
    CountriesReconciled,
    CountriesMatched,
    TimeSeriesOnly,
    SnapshotOnly,
    NameCollisions,
    ReconcileDuration,

    // Timeline metrics
    TimelinePoints,
    TimelineKeysDropped,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchSuccess => "covid_fetch_success_total",
            MetricName::FetchError => "covid_fetch_error_total",
            MetricName::FetchDuration => "covid_fetch_duration_seconds",
            MetricName::FetchBytes => "covid_fetch_bytes",

            MetricName::DecodeRecords => "covid_decode_records_total",
            MetricName::DecodeSkipped => "covid_decode_skipped_total",

            MetricName::AggregatedCountries => "covid_reconcile_aggregated_countries",
            MetricName::NonCountriesDropped => "covid_reconcile_non_countries_dropped_total",
            MetricName::AliasResolutions => "covid_reconcile_alias_resolutions_total",
            MetricName::CountriesReconciled => "covid_reconcile_countries",
            MetricName::CountriesMatched => "covid_reconcile_matched_total",
            MetricName::TimeSeriesOnly => "covid_reconcile_time_series_only_total",
            MetricName::SnapshotOnly => "covid_reconcile_snapshot_only_total",
            MetricName::NameCollisions => "covid_reconcile_name_collisions_total",
            MetricName::ReconcileDuration => "covid_reconcile_duration_seconds",

            MetricName::TimelinePoints => "covid_timeline_points",
            MetricName::TimelineKeysDropped => "covid_timeline_keys_dropped_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            FetchSuccess,
            FetchError,
            FetchDuration,
            FetchBytes,
            DecodeRecords,
            DecodeSkipped,
            AggregatedCountries,
            NonCountriesDropped,
            AliasResolutions,
            CountriesReconciled,
            CountriesMatched,
            TimeSeriesOnly,
            SnapshotOnly,
            NameCollisions,
            ReconcileDuration,
            TimelinePoints,
            TimelineKeysDropped,
        ]
        .into_iter()
    }
}

/// Install the Prometheus recorder and return its render handle
pub fn init() -> Result<PrometheusHandle, String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics system initialized");
    Ok(handle)
}

pub fn emit_counter(name: MetricName, value: u64) {
    ::metrics::counter!(name.as_str()).increment(value);
}

pub fn emit_source_counter(name: MetricName, source: &'static str, value: u64) {
    ::metrics::counter!(name.as_str(), "source" => source).increment(value);
}

pub fn emit_gauge(name: MetricName, value: f64) {
    ::metrics::gauge!(name.as_str()).set(value);
}

pub fn emit_histogram(name: MetricName, value: f64) {
    ::metrics::histogram!(name.as_str()).record(value);
}

pub fn emit_source_histogram(name: MetricName, source: &'static str, value: f64) {
    ::metrics::histogram!(name.as_str(), "source" => source).record(value);
}

/// Record the counters of one reconciliation pass
pub fn record_reconciliation(report: &ReconciliationReport, countries: usize, duration_secs: f64) {
    emit_gauge(MetricName::AggregatedCountries, report.aggregated_countries as f64);
    emit_counter(MetricName::NonCountriesDropped, report.non_countries_dropped as u64);
    emit_counter(MetricName::AliasResolutions, report.aliased as u64);
    emit_gauge(MetricName::CountriesReconciled, countries as f64);
    emit_counter(MetricName::CountriesMatched, report.matched as u64);
    emit_counter(MetricName::TimeSeriesOnly, report.time_series_only as u64);
    emit_counter(MetricName::SnapshotOnly, report.snapshot_only as u64);
    emit_counter(MetricName::NameCollisions, report.collisions.len() as u64);
    emit_histogram(MetricName::ReconcileDuration, duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: Vec<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|n| n.starts_with("covid_")));
    }

    #[test]
    fn test_emitting_without_recorder_is_noop() {
        emit_counter(MetricName::FetchSuccess, 1);
        emit_gauge(MetricName::CountriesReconciled, 3.0);
        record_reconciliation(&ReconciliationReport::default(), 0, 0.01);
    }
}
