//! Integration tests for courier-config

use courier_config::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = write_config(
        ".toml",
        r#"
[queue]
capacity = 256
continue_on_error = false

[logging]
level = "debug"
format = "compact"
"#,
    );

    let config = CourierConfig::from_file(file.path()).unwrap();
    assert_eq!(config.queue.capacity, Some(256));
    assert!(!config.queue.continue_on_error);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "compact");
    assert!(config.logging.targets);
}

#[test]
fn test_load_json_file() {
    let file = write_config(".json", r#"{ "logging": { "format": "pretty", "targets": false } }"#);

    let config = CourierConfig::from_file(file.path()).unwrap();
    assert_eq!(config.queue, QueueSettings::default());
    assert_eq!(config.logging.format, "pretty");
    assert!(!config.logging.targets);
}

#[test]
fn test_unsupported_extension() {
    let file = write_config(".yaml", "queue: {}");

    let err = CourierConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}

#[test]
fn test_wrong_field_type() {
    let file = write_config(".toml", "[queue]\ncapacity = \"lots\"\n");

    let err = CourierConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DeserializationError(_)));
}

#[test]
fn test_missing_file() {
    let err = CourierConfig::from_file(std::path::Path::new("/nonexistent/courier.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
    assert_eq!(err.to_string(), "Failed to read /nonexistent/courier.toml");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_file_then_env_then_validate() {
    let file = write_config(".toml", "[queue]\ncapacity = 4\n");

    let mut config = CourierConfig::from_file(file.path()).unwrap();
    EnvLoader::default()
        .apply_vars(
            &mut config,
            vec![("COURIER_QUEUE_CAPACITY".to_string(), "0".to_string())],
        )
        .unwrap();

    assert_eq!(config.queue.capacity, Some(0));
    assert!(config.validate().is_err());
}
