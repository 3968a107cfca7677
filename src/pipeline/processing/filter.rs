use tracing::debug;

use crate::constants::NON_COUNTRY_ENTRIES;
use crate::types::RawProvinceRecord;

/// True for cruise ships, Antarctica and sporting events (exact, case-sensitive match)
pub fn is_non_country(name: &str) -> bool {
    NON_COUNTRY_ENTRIES.contains(&name)
}

/// Drop pseudo-entity rows, preserving the order of everything else
pub fn filter_non_countries(records: Vec<RawProvinceRecord>) -> Vec<RawProvinceRecord> {
    records
        .into_iter()
        .filter(|record| {
            let keep = !is_non_country(&record.country);
            if !keep {
                debug!("Dropping non-country entry: {}", record.country);
            }
            keep
        })
        .collect()
}
