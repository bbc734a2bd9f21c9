use crate::tests::{EnvGuard, setup_config_dir, write_config};
use crate::{Config, DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECS, DEFAULT_SERVER_COUNT};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok, some};
use log::LevelFilter;
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.stripe.server_count, eq(DEFAULT_SERVER_COUNT));
    assert_that!(
        config.harness.force_shutdown_timeout_secs,
        eq(DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECS)
    );
    assert_that!(config.harness.fail_on_log_severity, eq(false));
    assert_that!(config.stripe.uri_scheme.as_str(), eq("terracotta"));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [harness]
            fail_on_log_severity = true

            [stripe]
            name = "stripeA"
            server_count = 3
            config_file = "tc-config.xml"

            [stripe.properties]
            "tc.property" = "value"

            [client]
            test_class = "org.example.FailoverIT"
            test_client_count = 4
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.harness.fail_on_log_severity, eq(true));
    assert_that!(config.stripe.name.as_str(), eq("stripeA"));
    assert_that!(config.stripe.server_count, eq(3));
    assert_that!(config.stripe.config_file.as_deref(), some(eq("tc-config.xml")));
    assert_that!(
        config.stripe.properties.get("tc.property").map(String::as_str),
        some(eq("value"))
    );
    assert_that!(config.client.test_client_count, eq(4));
    // Untouched sections keep their defaults
    assert_that!(config.stripe.server_name_prefix.as_str(), eq("testServer"));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [stripe]
            server_count = 3
        "#,
    );
    let _count = EnvGuard::set("SK_SERVER_COUNT", "5");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.stripe.server_count, eq(5));
}

#[test]
#[serial]
fn given_unparseable_env_var_when_load_then_value_unchanged() {
    // Given
    let _temp = setup_config_dir();
    let _count = EnvGuard::set("SK_TEST_CLIENT_COUNT", "many");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.client.test_client_count, eq(1));
}

#[test]
#[serial]
fn given_bool_env_var_as_one_when_load_then_true() {
    // Given
    let _temp = setup_config_dir();
    let _severity = EnvGuard::set("SK_FAIL_ON_LOG_SEVERITY", "1");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.harness.fail_on_log_severity, eq(true));
}

#[test]
#[serial]
fn given_log_level_env_var_when_load_then_level_applied() {
    // Given
    let _temp = setup_config_dir();
    let _level = EnvGuard::set("SK_LOG_LEVEL", "DEBUG");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.logging.level.0, eq(LevelFilter::Debug));
}

#[test]
#[serial]
fn given_unknown_log_level_in_toml_when_load_then_info() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [logging]
            level = "chatty"
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.logging.level.0, eq(LevelFilter::Info));
}

#[test]
#[serial]
fn given_explicit_path_when_load_from_then_reads_that_file() {
    // Given
    let _temp = setup_config_dir();
    let other = tempfile::TempDir::new().unwrap();
    let path = other.path().join("custom.toml");
    std::fs::write(&path, "[stripe]\nname = \"custom\"\n").unwrap();

    // When
    let config = Config::load_from(&path).unwrap();

    // Then
    assert_that!(config.stripe.name.as_str(), eq("custom"));
}

// =========================================================================
// Error Tests
// =========================================================================

#[test]
#[serial]
fn given_malformed_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[stripe\nname = ");

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_missing_explicit_file_when_load_from_then_io_error() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();

    // When
    let result = Config::load_from(&temp.path().join("absent.toml"));

    // Then
    assert!(matches!(result, Err(crate::ConfigError::Io { .. })));
}

#[test]
#[serial]
fn given_config_dir_env_when_config_dir_then_env_path() {
    // Given
    let (temp, _guard) = setup_config_dir();

    // When
    let dir = Config::config_dir().unwrap();

    // Then
    assert_that!(dir, eq(&temp.path().to_path_buf()));
}
