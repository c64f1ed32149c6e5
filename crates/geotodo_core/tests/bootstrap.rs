use geotodo_core::db::migrations::{latest_version, schema_version};
use geotodo_core::{bootstrap, logging_status, AppConfig, BootstrapError, ConfigError};

#[test]
fn bootstrap_starts_logging_and_opens_configured_database() {
    let data_dir = tempfile::tempdir().unwrap();
    let log_dir = tempfile::tempdir().unwrap();
    let db_path = data_dir.path().join("tasks.sqlite3");
    let config = AppConfig {
        db_path: db_path.clone(),
        log_dir: Some(log_dir.path().to_path_buf()),
        log_level: "info".to_string(),
        ..AppConfig::default()
    };

    let conn = bootstrap(&config).unwrap();

    assert!(db_path.exists());
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_eq!(
        logging_status(),
        Some(("info", log_dir.path().to_path_buf()))
    );
}

#[test]
fn bootstrap_without_log_dir_only_opens_database() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: data_dir.path().join("quiet.sqlite3"),
        ..AppConfig::default()
    };

    let conn = bootstrap(&config).unwrap();

    assert!(config.db_path.exists());
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}

#[test]
fn bootstrap_rejects_invalid_config_before_touching_disk() {
    let data_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: data_dir.path().join("never.sqlite3"),
        log_level: "verbose".to_string(),
        ..AppConfig::default()
    };

    let err = bootstrap(&config).unwrap_err();

    assert!(matches!(err, BootstrapError::Config(ConfigError::Invalid(_))));
    assert!(!config.db_path.exists());
}
