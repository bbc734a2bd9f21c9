use crate::TriggerConfig;
use crate::tests::{setup_config_dir, write_config};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

#[test]
fn given_defaults_when_validate_then_ok() {
    assert_that!(TriggerConfig::default().validate(), ok(anything()));
}

#[test]
fn given_default_triggers_when_inspected_then_server_phrases() {
    // Given
    let triggers = TriggerConfig::default();

    // Then
    assert_that!(triggers.pid.as_str(), eq("PID is"));
    assert_that!(
        triggers.active.as_str(),
        eq("Terracotta Server instance has started up as ACTIVE node")
    );
    assert_that!(
        triggers.passive.as_str(),
        eq("Moved to State[ PASSIVE-STANDBY ]")
    );
    assert_that!(triggers.zap.as_str(), eq("Restarting the server"));
}

#[test]
fn given_empty_phrase_when_validate_then_error() {
    // Given
    let triggers = TriggerConfig {
        active: String::new(),
        ..TriggerConfig::default()
    };

    // When / Then
    assert_that!(triggers.validate(), err(anything()));
}

#[test]
#[serial]
fn given_custom_phrases_in_toml_when_load_then_others_default() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [triggers]
            active = "NOW ACTIVE"
            severity_allow_list = ["netlib", "selector"]
        "#,
    );

    // When
    let config = crate::Config::load().unwrap();

    // Then
    assert_that!(config.triggers.active.as_str(), eq("NOW ACTIVE"));
    assert_that!(config.triggers.pid.as_str(), eq("PID is"));
    assert_that!(config.triggers.severity_allow_list.len(), eq(2));
}
