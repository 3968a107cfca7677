//! Merges the cleaned time-series feed with the snapshot feed.
//!
//! Canonical names use the snapshot (Worldometers) vocabulary: the snapshot
//! seeds the set and carries every metadata field, so time-series names are
//! translated into it and never the other way round. The snapshot is
//! authoritative for population, tests, continent and ISO codes; the
//! time-series feed is authoritative for case and death counts.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::aggregate::aggregate_provinces;
use super::alias::{AliasDirection, AliasResolver};
use super::filter::{filter_non_countries, is_non_country};
use crate::types::{CanonicalCountry, RawProvinceRecord, RawSnapshotRecord};

/// Counters describing one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub time_series_rows: usize,
    pub aggregated_countries: usize,
    pub non_countries_dropped: usize,
    pub snapshot_rows: usize,
    pub snapshot_skipped: usize,
    pub aliased: usize,
    pub matched: usize,
    pub time_series_only: usize,
    pub snapshot_only: usize,
    /// Time-series names that resolved onto a country another row already claimed
    pub collisions: Vec<String>,
}

/// Output of a reconciliation pass: the countries sorted by name plus counters
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub countries: Vec<CanonicalCountry>,
    pub report: ReconciliationReport,
}

struct Slot {
    country: CanonicalCountry,
    from_snapshot: bool,
    claimed_by: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct CountryReconciler<'a> {
    resolver: AliasResolver<'a>,
}

impl Default for CountryReconciler<'static> {
    fn default() -> Self {
        Self::new(AliasResolver::default())
    }
}

impl<'a> CountryReconciler<'a> {
    pub fn new(resolver: AliasResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Reconcile both feeds into one record per country, sorted by canonical name
    pub fn reconcile(
        &self,
        time_series: &[RawProvinceRecord],
        snapshot: &[RawSnapshotRecord],
    ) -> Vec<CanonicalCountry> {
        self.reconcile_with_report(time_series, snapshot).countries
    }

    pub fn reconcile_with_report(
        &self,
        time_series: &[RawProvinceRecord],
        snapshot: &[RawSnapshotRecord],
    ) -> Reconciliation {
        let mut report = ReconciliationReport {
            time_series_rows: time_series.len(),
            snapshot_rows: snapshot.len(),
            ..Default::default()
        };

        let aggregated = aggregate_provinces(time_series);
        report.aggregated_countries = aggregated.len();
        let cleaned = filter_non_countries(aggregated);
        report.non_countries_dropped = report.aggregated_countries - cleaned.len();

        let mut slots: BTreeMap<String, Slot> = BTreeMap::new();
        for record in snapshot {
            let name = record.country.as_str();
            if name.trim().is_empty() || is_non_country(name) {
                report.snapshot_skipped += 1;
                continue;
            }
            if slots.contains_key(name) {
                warn!("Duplicate snapshot entry for {}, keeping the first", name);
                report.snapshot_skipped += 1;
                continue;
            }
            slots.insert(
                name.to_string(),
                Slot {
                    country: CanonicalCountry::from_snapshot(record),
                    from_snapshot: true,
                    claimed_by: None,
                },
            );
        }

        for record in &cleaned {
            let canonical = self
                .resolver
                .resolve(&record.country, AliasDirection::TimeSeriesToSnapshot);
            if canonical != record.country {
                report.aliased += 1;
                debug!("Resolved {} -> {}", record.country, canonical);
            }
            if is_non_country(canonical) {
                report.non_countries_dropped += 1;
                continue;
            }

            let stats = record.stats_or_zero();
            match slots.get_mut(canonical) {
                Some(slot) => {
                    if let Some(previous) = &slot.claimed_by {
                        warn!(
                            "{} and {} both resolve to {}; keeping counts from {}",
                            previous, record.country, canonical, previous
                        );
                        report.collisions.push(record.country.clone());
                        continue;
                    }
                    slot.country.stats = stats;
                    slot.claimed_by = Some(record.country.clone());
                    report.matched += 1;
                }
                None => {
                    debug!("No snapshot entry for {}, using time-series data only", canonical);
                    slots.insert(
                        canonical.to_string(),
                        Slot {
                            country: CanonicalCountry::from_time_series(canonical, stats),
                            from_snapshot: false,
                            claimed_by: Some(record.country.clone()),
                        },
                    );
                    report.time_series_only += 1;
                }
            }
        }

        report.snapshot_only = slots
            .values()
            .filter(|slot| slot.from_snapshot && slot.claimed_by.is_none())
            .count();

        let countries: Vec<CanonicalCountry> = slots.into_values().map(|slot| slot.country).collect();

        info!(
            "Reconciled {} countries ({} matched, {} time-series only, {} snapshot only, {} collisions)",
            countries.len(),
            report.matched,
            report.time_series_only,
            report.snapshot_only,
            report.collisions.len()
        );

        Reconciliation { countries, report }
    }
}
