use clap::ValueEnum;
use serde::Serialize;

use crate::types::{CanonicalCountry, CovidStats};

/// Which count a ranking is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum SortBy {
    Cases,
    Deaths,
}

impl SortBy {
    pub fn value_of(self, stats: &CovidStats) -> u64 {
        match self {
            SortBy::Cases => stats.confirmed,
            SortBy::Deaths => stats.deaths,
        }
    }
}

/// The `limit` countries with the highest count, ties broken by name
pub fn top_countries(countries: &[CanonicalCountry], sort_by: SortBy, limit: usize) -> Vec<&CanonicalCountry> {
    let mut ranked: Vec<&CanonicalCountry> = countries.iter().collect();
    ranked.sort_by(|a, b| {
        sort_by
            .value_of(&b.stats)
            .cmp(&sort_by.value_of(&a.stats))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

pub fn global_totals(countries: &[CanonicalCountry]) -> CovidStats {
    countries
        .iter()
        .fold(CovidStats::default(), |acc, country| acc.saturating_add(country.stats))
}
