use crate::ServerMode;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};

#[test]
fn given_default_when_created_then_terminated() {
    assert_that!(ServerMode::default(), eq(ServerMode::Terminated));
}

#[test]
fn given_startup_and_zapped_when_checked_then_transitional() {
    assert_that!(ServerMode::Startup.is_transitional(), eq(true));
    assert_that!(ServerMode::Zapped.is_transitional(), eq(true));
    assert_that!(ServerMode::Unknown.is_transitional(), eq(false));
    assert_that!(ServerMode::Terminated.is_transitional(), eq(false));
}

#[test]
fn given_role_modes_when_checked_then_ready() {
    for mode in [ServerMode::Active, ServerMode::Passive, ServerMode::Diagnostic] {
        assert_that!(mode.is_ready(), eq(true));
        assert_that!(mode.is_settling(), eq(false));
    }
}

#[test]
fn given_unknown_when_checked_then_settling_but_not_ready() {
    // Given
    let mode = ServerMode::Unknown;

    // Then
    assert_that!(mode.is_running(), eq(true));
    assert_that!(mode.is_ready(), eq(false));
    assert_that!(mode.is_settling(), eq(true));
}

#[test]
fn given_terminated_when_checked_then_neither_running_nor_settling() {
    assert_that!(ServerMode::Terminated.is_running(), eq(false));
    assert_that!(ServerMode::Terminated.is_settling(), eq(false));
}

#[test]
fn given_display_output_when_parsed_then_same_mode() {
    for mode in [
        ServerMode::Terminated,
        ServerMode::Startup,
        ServerMode::Unknown,
        ServerMode::Active,
        ServerMode::Passive,
        ServerMode::Diagnostic,
        ServerMode::Zapped,
    ] {
        let parsed = mode.to_string().parse::<ServerMode>();
        assert_that!(parsed, ok(eq(&mode)));
    }
}

#[test]
fn given_lowercase_name_when_parsed_then_error() {
    assert_that!("active".parse::<ServerMode>(), err(anything()));
}
