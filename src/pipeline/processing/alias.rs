//! Country-name aliases between the two source vocabularies.
//!
//! The time-series feed (JHU CSSE) and the snapshot feed (Worldometers) spell
//! a few dozen countries differently. The two directions are kept as separate
//! tables because the upstream vocabularies are not a clean bijection: JHU
//! folds some territories into a parent country that Worldometers lists on its
//! own. `AliasTables::asymmetries` reports every entry that does not round-trip.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Which vocabulary a name is being translated from and into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AliasDirection {
    TimeSeriesToSnapshot,
    SnapshotToTimeSeries,
}

impl AliasDirection {
    pub fn reverse(self) -> Self {
        match self {
            AliasDirection::TimeSeriesToSnapshot => AliasDirection::SnapshotToTimeSeries,
            AliasDirection::SnapshotToTimeSeries => AliasDirection::TimeSeriesToSnapshot,
        }
    }
}

impl fmt::Display for AliasDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasDirection::TimeSeriesToSnapshot => write!(f, "time-series -> snapshot"),
            AliasDirection::SnapshotToTimeSeries => write!(f, "snapshot -> time-series"),
        }
    }
}

// JHU CSSE name -> Worldometers name
const TIME_SERIES_TO_SNAPSHOT: &[(&str, &str)] = &[
    ("US", "USA"),
    ("United Kingdom", "UK"),
    ("Korea, South", "S. Korea"),
    ("Korea, North", "DPRK"),
    ("Congo (Kinshasa)", "DRC"),
    ("Congo (Brazzaville)", "Congo"),
    ("Taiwan*", "Taiwan"),
    ("United Arab Emirates", "UAE"),
    ("Central African Republic", "CAR"),
    ("Burma", "Myanmar"),
    ("Cote d'Ivoire", "Côte d'Ivoire"),
    ("Holy See", "Holy See (Vatican City State)"),
    ("West Bank and Gaza", "Palestine"),
    ("Saint Vincent and the Grenadines", "St. Vincent Grenadines"),
    ("Libya", "Libyan Arab Jamahiriya"),
    ("Syria", "Syrian Arab Republic"),
    ("Laos", "Lao People's Democratic Republic"),
    ("North Macedonia", "Macedonia"),
];

// Worldometers name -> JHU CSSE name
const SNAPSHOT_TO_TIME_SERIES: &[(&str, &str)] = &[
    ("USA", "US"),
    ("UK", "United Kingdom"),
    ("S. Korea", "Korea, South"),
    ("DPRK", "Korea, North"),
    ("DRC", "Congo (Kinshasa)"),
    ("Congo", "Congo (Brazzaville)"),
    ("UAE", "United Arab Emirates"),
    ("CAR", "Central African Republic"),
    ("Myanmar", "Burma"),
    ("Côte d'Ivoire", "Cote d'Ivoire"),
    ("Palestine", "West Bank and Gaza"),
    ("St. Vincent Grenadines", "Saint Vincent and the Grenadines"),
    ("Libyan Arab Jamahiriya", "Libya"),
    ("Syrian Arab Republic", "Syria"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Macedonia", "North Macedonia"),
    // JHU reports the Channel Islands as a province of the United Kingdom
    ("Channel Islands", "United Kingdom"),
];

/// Built-in tables, built once for the life of the process
pub static BUILTIN_ALIASES: Lazy<AliasTables> = Lazy::new(AliasTables::builtin);

/// Immutable pair of one-directional alias tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTables {
    time_series_to_snapshot: HashMap<String, String>,
    snapshot_to_time_series: HashMap<String, String>,
}

/// An alias entry whose target does not translate back to its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasAsymmetry {
    pub direction: AliasDirection,
    pub name: String,
    pub resolved: String,
    pub round_trip: String,
}

impl AliasTables {
    pub fn builtin() -> Self {
        Self::from_pairs(
            TIME_SERIES_TO_SNAPSHOT.iter().copied(),
            SNAPSHOT_TO_TIME_SERIES.iter().copied(),
        )
    }

    pub fn from_pairs<K, V>(
        time_series_to_snapshot: impl IntoIterator<Item = (K, V)>,
        snapshot_to_time_series: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            time_series_to_snapshot: time_series_to_snapshot
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            snapshot_to_time_series: snapshot_to_time_series
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Layer extra entries on top of these tables; overrides win on conflict
    pub fn with_overrides(
        mut self,
        time_series_to_snapshot: &HashMap<String, String>,
        snapshot_to_time_series: &HashMap<String, String>,
    ) -> Self {
        self.time_series_to_snapshot
            .extend(time_series_to_snapshot.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.snapshot_to_time_series
            .extend(snapshot_to_time_series.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn lookup(&self, name: &str, direction: AliasDirection) -> Option<&str> {
        self.table(direction).get(name).map(String::as_str)
    }

    /// Number of entries translating in `direction`
    pub fn len(&self, direction: AliasDirection) -> usize {
        self.table(direction).len()
    }

    /// Every entry in either table whose target does not resolve back to it,
    /// sorted by direction then name
    pub fn asymmetries(&self) -> Vec<AliasAsymmetry> {
        let mut found = Vec::new();
        for direction in [
            AliasDirection::TimeSeriesToSnapshot,
            AliasDirection::SnapshotToTimeSeries,
        ] {
            let mut names: Vec<&String> = self.table(direction).keys().collect();
            names.sort();
            for name in names {
                let resolved = &self.table(direction)[name];
                let round_trip = self
                    .lookup(resolved, direction.reverse())
                    .unwrap_or(resolved.as_str());
                if round_trip != name {
                    found.push(AliasAsymmetry {
                        direction,
                        name: name.clone(),
                        resolved: resolved.clone(),
                        round_trip: round_trip.to_string(),
                    });
                }
            }
        }
        found
    }

    fn table(&self, direction: AliasDirection) -> &HashMap<String, String> {
        match direction {
            AliasDirection::TimeSeriesToSnapshot => &self.time_series_to_snapshot,
            AliasDirection::SnapshotToTimeSeries => &self.snapshot_to_time_series,
        }
    }
}

/// Translates names between vocabularies; unknown names pass through unchanged
#[derive(Debug, Clone, Copy)]
pub struct AliasResolver<'a> {
    tables: &'a AliasTables,
}

impl Default for AliasResolver<'static> {
    fn default() -> Self {
        Self::new(&BUILTIN_ALIASES)
    }
}

impl<'a> AliasResolver<'a> {
    pub fn new(tables: &'a AliasTables) -> Self {
        Self { tables }
    }

    pub fn resolve<'n>(&self, name: &'n str, direction: AliasDirection) -> &'n str
    where
        'a: 'n,
    {
        self.tables.lookup(name, direction).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AliasDirection::*;

    #[test]
    fn test_resolves_punctuated_names_verbatim() {
        let resolver = AliasResolver::default();
        assert_eq!(resolver.resolve("Congo (Kinshasa)", TimeSeriesToSnapshot), "DRC");
        assert_eq!(resolver.resolve("Taiwan*", TimeSeriesToSnapshot), "Taiwan");
        assert_eq!(resolver.resolve("Cote d'Ivoire", TimeSeriesToSnapshot), "Côte d'Ivoire");
        assert_eq!(resolver.resolve("DRC", SnapshotToTimeSeries), "Congo (Kinshasa)");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let resolver = AliasResolver::default();
        assert_eq!(resolver.resolve("France", TimeSeriesToSnapshot), "France");
        assert_eq!(resolver.resolve("France", SnapshotToTimeSeries), "France");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let resolver = AliasResolver::default();
        assert_eq!(resolver.resolve("us", TimeSeriesToSnapshot), "us");
        assert_eq!(resolver.resolve("Taiwan", TimeSeriesToSnapshot), "Taiwan");
    }

    #[test]
    fn test_round_trip_for_symmetric_names() {
        let resolver = AliasResolver::default();
        for name in [
            "US",
            "United Kingdom",
            "Korea, South",
            "Congo (Kinshasa)",
            "Congo (Brazzaville)",
            "Cote d'Ivoire",
            "Burma",
            "West Bank and Gaza",
            "Laos",
            "Germany",
        ] {
            let there = resolver.resolve(name, TimeSeriesToSnapshot);
            assert_eq!(resolver.resolve(there, SnapshotToTimeSeries), name, "round trip of {}", name);
        }
    }

    #[test]
    fn test_builtin_asymmetries_are_the_known_ones() {
        let found: Vec<(AliasDirection, String)> = BUILTIN_ALIASES
            .asymmetries()
            .into_iter()
            .map(|a| (a.direction, a.name))
            .collect();

        assert_eq!(
            found,
            vec![
                (TimeSeriesToSnapshot, "Holy See".to_string()),
                (TimeSeriesToSnapshot, "Taiwan*".to_string()),
                (SnapshotToTimeSeries, "Channel Islands".to_string()),
            ]
        );
    }

    #[test]
    fn test_builtin_table_sizes() {
        assert_eq!(BUILTIN_ALIASES.len(TimeSeriesToSnapshot), 18);
        assert_eq!(BUILTIN_ALIASES.len(SnapshotToTimeSeries), 17);
    }

    #[test]
    fn test_overrides_win_on_conflict() {
        let mut extra = HashMap::new();
        extra.insert("Taiwan*".to_string(), "Taiwan, Province of China".to_string());
        extra.insert("Kosovo".to_string(), "Republic of Kosovo".to_string());
        let tables = AliasTables::builtin().with_overrides(&extra, &HashMap::new());
        let resolver = AliasResolver::new(&tables);

        assert_eq!(resolver.resolve("Taiwan*", TimeSeriesToSnapshot), "Taiwan, Province of China");
        assert_eq!(resolver.resolve("Kosovo", TimeSeriesToSnapshot), "Republic of Kosovo");
        assert_eq!(resolver.resolve("US", TimeSeriesToSnapshot), "USA");
    }
}
