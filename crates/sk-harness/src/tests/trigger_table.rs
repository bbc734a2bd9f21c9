use super::{ACTIVE_LINE, BOOTSTRAP_LINE};
use crate::{TriggerAction, TriggerTable};

use sk_config::TriggerConfig;

use googletest::assert_that;
use googletest::prelude::eq;

#[test]
fn given_server_table_when_active_line_then_active_action() {
    // Given
    let table = TriggerTable::server(&TriggerConfig::default(), false);

    // When
    let actions = table.matches(ACTIVE_LINE);

    // Then
    assert_that!(actions, eq(&vec![TriggerAction::Active]));
}

#[test]
fn given_line_with_two_phrases_when_matched_then_both_in_table_order() {
    // Given
    let table = TriggerTable::server(&TriggerConfig::default(), false);
    let line = format!("PID is 12 and {BOOTSTRAP_LINE}");

    // When
    let actions = table.matches(&line);

    // Then
    assert_that!(
        actions,
        eq(&vec![TriggerAction::Pid, TriggerAction::Bootstrap])
    );
}

#[test]
fn given_severity_disabled_when_warning_line_then_no_action() {
    // Given
    let table = TriggerTable::server(&TriggerConfig::default(), false);

    // When
    let actions = table.matches("2024-01-01 WARN something odd");

    // Then
    assert_that!(actions.is_empty(), eq(true));
}

#[test]
fn given_severity_enabled_when_warning_and_error_line_then_one_severity_action() {
    // Given
    let table = TriggerTable::severity_only(&TriggerConfig::default(), true);

    // When
    let actions = table.matches("x WARN y ERROR z");

    // Then
    assert_that!(actions, eq(&vec![TriggerAction::Severity]));
}

#[test]
fn given_client_table_when_syn_line_then_control_action() {
    // Given
    let table = TriggerTable::client(&TriggerConfig::default(), false);

    // When
    let actions = table.matches("SYN:WAIT_FOR_ACTIVE");

    // Then
    assert_that!(actions, eq(&vec![TriggerAction::Control]));
    assert_that!(table.len(), eq(1));
}

#[test]
fn given_custom_phrase_when_table_built_then_phrase_matches() {
    // Given
    let table = TriggerTable::new().with("ready!", TriggerAction::Bootstrap);

    // When
    let actions = table.matches("node ready!");

    // Then
    assert_that!(actions, eq(&vec![TriggerAction::Bootstrap]));
}
