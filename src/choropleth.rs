//! Fill-colour data for the world-map choropleth.
//!
//! Produces a Mapbox GL `match` expression keyed on the ISO 3166-1 alpha-3
//! code of each country boundary. Darker red means more cases relative to
//! `max_cases`; boundaries with no data fall through to transparent.

use serde_json::{json, Value};

use crate::types::CanonicalCountry;

pub const ISO3_PROPERTY: &str = "iso_3166_1_alpha_3";
pub const NO_DATA_COLOR: &str = "rgba(0, 0, 0, 0)";

// Floor so countries with few cases are still visibly shaded
const MIN_INTENSITY: f64 = 20.0;

/// Red intensity in 0..=255 for `cases` relative to `max_cases`
pub fn intensity(cases: u64, max_cases: u64) -> u8 {
    if max_cases == 0 {
        return MIN_INTENSITY as u8;
    }
    let ratio = cases as f64 / max_cases as f64 * 255.0 + MIN_INTENSITY;
    ratio.min(255.0) as u8
}

pub fn fill_color(cases: u64, max_cases: u64) -> String {
    let shade = 255 - intensity(cases, max_cases);
    format!("rgb(255, {}, {})", shade, shade)
}

/// Largest case count in the set, the natural scale maximum
pub fn max_cases(countries: &[CanonicalCountry]) -> u64 {
    countries.iter().map(|c| c.stats.confirmed).max().unwrap_or(0)
}

/// Build the `match` expression; countries without an ISO3 code are left out
pub fn fill_color_expression(countries: &[CanonicalCountry], max_cases: u64) -> Value {
    let mut expression = vec![json!("match"), json!(["get", ISO3_PROPERTY])];
    for country in countries {
        let Some(iso3) = country.iso3().filter(|code| !code.trim().is_empty()) else {
            continue;
        };
        expression.push(json!(iso3));
        expression.push(json!(fill_color(country.stats.confirmed, max_cases)));
    }
    expression.push(json!(NO_DATA_COLOR));
    Value::Array(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountryInfo, CovidStats};

    fn country(name: &str, iso3: Option<&str>, confirmed: u64) -> CanonicalCountry {
        let mut country = CanonicalCountry::from_time_series(name, CovidStats::new(confirmed, 0));
        country.iso_info = iso3.map(|code| CountryInfo {
            iso2: None,
            iso3: Some(code.to_string()),
            flag_url: None,
        });
        country
    }

    #[test]
    fn test_intensity_is_clamped() {
        assert_eq!(intensity(0, 8_000_000), 20);
        assert_eq!(intensity(8_000_000, 8_000_000), 255);
        assert_eq!(intensity(16_000_000, 8_000_000), 255);
        assert_eq!(intensity(4_000_000, 8_000_000), 147);
        assert_eq!(intensity(5, 0), 20);
    }

    #[test]
    fn test_fill_color() {
        assert_eq!(fill_color(8_000_000, 8_000_000), "rgb(255, 0, 0)");
        assert_eq!(fill_color(0, 8_000_000), "rgb(255, 235, 235)");
    }

    #[test]
    fn test_expression_shape() {
        let countries = vec![
            country("Germany", Some("DEU"), 100),
            country("Atlantis", None, 50),
            country("Spain", Some("ESP"), 0),
        ];
        let expression = fill_color_expression(&countries, max_cases(&countries));

        assert_eq!(
            expression,
            json!([
                "match",
                ["get", "iso_3166_1_alpha_3"],
                "DEU", "rgb(255, 0, 0)",
                "ESP", "rgb(255, 235, 235)",
                "rgba(0, 0, 0, 0)"
            ])
        );
    }

    #[test]
    fn test_empty_expression_has_only_default() {
        let expression = fill_color_expression(&[], 0);
        assert_eq!(expression, json!(["match", ["get", "iso_3166_1_alpha_3"], "rgba(0, 0, 0, 0)"]));
    }
}
