#[cfg(test)]
mod tests {
    use covid_tracker::config::Config;
    use covid_tracker::pipeline::processing::alias::AliasDirection;
    use covid_tracker::TrackerError;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config.api.base_url, "https://disease.sh");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.aliases.time_series_to_snapshot.is_empty());
    }

    #[test]
    fn test_loads_api_and_alias_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "http://localhost:3000"
timeout_seconds = 12

[aliases.time_series_to_snapshot]
"Kosovo" = "Republic of Kosovo"

[aliases.snapshot_to_time_series]
"Republic of Kosovo" = "Kosovo"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout_seconds, 12);

        let tables = config.alias_tables();
        assert_eq!(
            tables.lookup("Kosovo", AliasDirection::TimeSeriesToSnapshot),
            Some("Republic of Kosovo")
        );
        assert_eq!(
            tables.lookup("Republic of Kosovo", AliasDirection::SnapshotToTimeSeries),
            Some("Kosovo")
        );
        // Built-in entries survive the overlay
        assert_eq!(tables.lookup("DRC", AliasDirection::SnapshotToTimeSeries), Some("Congo (Kinshasa)"));
    }

    #[test]
    fn test_malformed_toml_is_toml_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        assert!(matches!(Config::load_from(&path).unwrap_err(), TrackerError::Toml(_)));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_seconds = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path).unwrap_err(), TrackerError::Config(_)));
    }
}
