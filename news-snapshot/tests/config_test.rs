use chrono_tz::Tz;
use news_snapshot::{HarvestConfig, NewsError};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = HarvestConfig::default();

    assert_eq!(config.max_articles_per_category, 10);
    assert_eq!(config.max_summary_length, 150);
    assert_eq!(config.keep_days, 7);
    assert_eq!(config.data_dir, PathBuf::from("data"));
    assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
    assert!(!config.concurrent_fetches);

    let names: Vec<&str> = config.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["consulting", "ai", "poker"]);
    assert!(config.categories.iter().all(|c| c.sources.len() == 2));
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = HarvestConfig::from_json(
        r#"{
            "categories": [
                {"name": "rust", "sources": [{"name": "This Week", "url": "https://this-week-in-rust.org/rss.xml"}]}
            ],
            "keep_days": 3,
            "timezone": "Europe/Berlin",
            "fetch": {"timeout_seconds": 5}
        }"#,
    )
    .unwrap();

    assert_eq!(config.categories.len(), 1);
    assert_eq!(config.categories[0].sources[0].name, "This Week");
    assert_eq!(config.keep_days, 3);
    assert_eq!(config.timezone, Tz::Europe__Berlin);
    assert_eq!(config.fetch.timeout_seconds, 5);
    assert_eq!(config.fetch.max_redirects, 5);
    assert_eq!(config.max_articles_per_category, 10);
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"max_articles_per_category": 3, "data_dir": "/tmp/snapshots"}"#).unwrap();

    let config = HarvestConfig::load(Some(path.as_path())).unwrap();

    assert_eq!(config.max_articles_per_category, 3);
    assert_eq!(config.data_dir, PathBuf::from("/tmp/snapshots"));
    assert_eq!(config.categories.len(), 3);
}

#[test]
fn test_load_without_file_uses_defaults() {
    let config = HarvestConfig::load(None).unwrap();
    assert_eq!(config.categories.len(), 3);
}

#[test]
fn test_unknown_timezone_is_rejected() {
    assert!(HarvestConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).is_err());
}

#[test]
fn test_validation_errors() {
    let cases = [
        r#"{"categories": [{"name": "updated_at", "sources": []}]}"#,
        r#"{"categories": [{"name": "", "sources": []}]}"#,
        r#"{"categories": [{"name": "a", "sources": []}, {"name": "a", "sources": []}]}"#,
        r#"{"max_summary_length": 0}"#,
    ];
    for case in cases {
        let config = HarvestConfig::from_json(case).unwrap();
        assert!(matches!(config.validate(), Err(NewsError::Config(_))), "{}", case);
    }
}

#[test]
fn test_source_endpoints_are_not_checked_up_front() {
    let config = HarvestConfig::from_json(
        r#"{"categories": [{"name": "a", "sources": [
            {"name": "f", "url": "ftp://example.com/feed"},
            {"name": "local", "url": "feeds/local.xml"}
        ]}]}"#,
    )
    .unwrap();

    assert!(config.validate().is_ok());
}

#[test]
fn test_huge_retention_window_is_accepted() {
    let config = HarvestConfig::from_json(r#"{"keep_days": 4294967295}"#).unwrap();

    assert_eq!(config.keep_days, u32::MAX);
    assert!(config.validate().is_ok());
}
