//! Display helpers for counts, chart axes and country flags

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Abbreviate a count: 1500 -> "1.5K", 2000 -> "2K", 999 -> "999"
pub fn format_with_suffix(value: u64) -> String {
    let mut scaled = value as f64;
    let mut index = 0;
    while scaled >= 1000.0 && index < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        index += 1;
    }
    let formatted = format!("{:.1}", scaled);
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{}{}", trimmed, SUFFIXES[index])
}

/// Round `value` up to `places` significant digits (chart axis maxima)
pub fn round_up(value: f64, places: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || places == 0 {
        return value;
    }
    let magnitude = value.abs().log10().ceil();
    let factor = 10f64.powf(magnitude - places as f64);
    (value / factor).ceil() * factor
}

/// Regional-indicator flag for an ISO 3166-1 alpha-2 code, "🏁" when there is none
pub fn flag_emoji(iso2: Option<&str>) -> String {
    const FALLBACK: &str = "🏁";
    let Some(code) = iso2.map(str::trim) else {
        return FALLBACK.to_string();
    };
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return FALLBACK.to_string();
    }
    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_suffix() {
        assert_eq!(format_with_suffix(0), "0");
        assert_eq!(format_with_suffix(999), "999");
        assert_eq!(format_with_suffix(1000), "1K");
        assert_eq!(format_with_suffix(1500), "1.5K");
        assert_eq!(format_with_suffix(2_340_000), "2.3M");
        assert_eq!(format_with_suffix(676_570_149), "676.6M");
        assert_eq!(format_with_suffix(7_000_000_000), "7B");
        assert_eq!(format_with_suffix(u64::MAX), "18446744.1T");
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0.0, 2), 0.0);
        assert_eq!(round_up(1234.0, 2), 1300.0);
        assert_eq!(round_up(98.0, 1), 100.0);
        assert_eq!(round_up(500.0, 1), 500.0);
    }

    #[test]
    fn test_flag_emoji() {
        assert_eq!(flag_emoji(Some("CA")), "🇨🇦");
        assert_eq!(flag_emoji(Some("cd")), "🇨🇩");
        assert_eq!(flag_emoji(None), "🏁");
        assert_eq!(flag_emoji(Some("COD")), "🏁");
        assert_eq!(flag_emoji(Some("1A")), "🏁");
    }
}
