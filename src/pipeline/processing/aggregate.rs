use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::{CovidStats, RawProvinceRecord};

struct CountryGroup<'a> {
    first: &'a RawProvinceRecord,
    country_row: Option<&'a RawProvinceRecord>,
    province_sum: CovidStats,
    province_rows: usize,
    total_rows: usize,
}

/// Collapse the time-series feed to one cumulative record per country.
///
/// Countries with province rows get the sum over exactly those rows; their
/// country-level rows are not added in. Countries without province rows keep
/// the stats of their first row. Output keeps first-occurrence order, every
/// record has `province == None` and `stats == Some(..)` (absent stats become
/// zero). Rows with a blank country name are dropped.
pub fn aggregate_provinces(records: &[RawProvinceRecord]) -> Vec<RawProvinceRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, CountryGroup<'_>> = HashMap::new();

    for record in records {
        let country = record.country.as_str();
        if country.trim().is_empty() {
            warn!("Dropping time-series row without a country name");
            continue;
        }

        let group = groups.entry(country).or_insert_with(|| {
            order.push(country);
            CountryGroup {
                first: record,
                country_row: None,
                province_sum: CovidStats::default(),
                province_rows: 0,
                total_rows: 0,
            }
        });
        group.total_rows += 1;

        if record.has_province() {
            group.province_sum = group.province_sum.saturating_add(record.stats_or_zero());
            group.province_rows += 1;
        } else if group.country_row.is_none() {
            group.country_row = Some(record);
        }
    }

    order
        .into_iter()
        .filter_map(|country| groups.remove(country))
        .map(|group| {
            if group.province_rows > 0 {
                debug!(
                    "Aggregated {} provinces for {} ({} rows total)",
                    group.province_rows, group.first.country, group.total_rows
                );
                let mut record = match group.country_row {
                    Some(row) => row.clone(),
                    None => {
                        // Province coordinates do not describe the country
                        let mut row = group.first.clone();
                        row.coordinates = None;
                        row
                    }
                };
                record.province = None;
                record.stats = Some(group.province_sum);
                record
            } else {
                if group.total_rows > 1 {
                    debug!(
                        "Keeping first of {} country-level rows for {}",
                        group.total_rows, group.first.country
                    );
                }
                let mut record = group.first.clone();
                record.province = None;
                record.stats = Some(group.first.stats_or_zero());
                record
            }
        })
        .collect()
}
