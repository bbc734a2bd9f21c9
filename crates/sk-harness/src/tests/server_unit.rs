use super::{ACTIVE_LINE, BOOTSTRAP_LINE, Fixture, ZAP_LINE, eventually, serve_until_stopped, serving};
use crate::launch::InlineExit;
use crate::{FailureCause, HarnessError, UnitLogs, Verdict};

use sk_core::ServerMode;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{contains_substring, eq, some};

#[test]
fn given_inline_server_when_started_then_ready_as_active() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");

    // When
    unit.start().unwrap();
    let mode = unit.wait_for_ready().unwrap();

    // Then
    assert_that!(mode, eq(ServerMode::Active));
    assert_that!(unit.is_active().unwrap(), eq(true));
    unit.stop().unwrap();
}

#[test]
fn given_running_server_when_stopped_then_terminated_without_failure() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");
    unit.start().unwrap();
    unit.wait_for_ready().unwrap();

    // When
    unit.stop().unwrap();

    // Then
    assert_that!(unit.current_state().unwrap(), eq(ServerMode::Terminated));
    assert_that!(fixture.interlock.verdict(), eq(&Verdict::Running));
    assert_that!(fixture.interlock.is_crash_expected(unit.id()).unwrap(), eq(true));
}

#[test]
fn given_stopped_server_when_logs_read_then_output_kept() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");
    unit.start().unwrap();
    unit.wait_for_ready().unwrap();

    // When
    unit.stop().unwrap();

    // Then
    let log = std::fs::read_to_string(unit.working_dir().join(UnitLogs::STDOUT_FILE)).unwrap();
    assert_that!(log, contains_substring("PID is 1000"));
    assert_that!(log, contains_substring(ACTIVE_LINE));
}

#[test]
fn given_stopped_server_when_stopped_again_then_no_op() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");

    // When
    let result = unit.stop();

    // Then
    assert_that!(result.is_ok(), eq(true));
    assert_that!(unit.current_state().unwrap(), eq(ServerMode::Terminated));
}

#[test]
fn given_server_exiting_by_itself_when_not_expected_then_run_fails_with_crash() {
    // Given
    let fixture = Fixture::inline(|ctx| {
        ctx.out(BOOTSTRAP_LINE);
        ctx.out(ACTIVE_LINE);
        InlineExit::Exited(3)
    });
    let unit = fixture.server("testServer0");

    // When
    unit.start().unwrap();
    let mode = unit.wait_for_termination(Some(Duration::from_secs(5))).unwrap();

    // Then
    assert_that!(mode, eq(ServerMode::Terminated));
    assert_that!(
        fixture.interlock.verdict().cause(),
        some(eq(&FailureCause::UnexpectedServerCrash {
            server: String::from("testServer0"),
            pid: 1000,
            status: String::from("exit code 3"),
        }))
    );
}

#[test]
fn given_panicking_server_when_started_then_reported_as_crash() {
    // Given
    let fixture = Fixture::inline(|ctx| {
        ctx.out(BOOTSTRAP_LINE);
        panic!("server body blew up");
    });
    let unit = fixture.server("testServer0");

    // When
    unit.start().unwrap();
    unit.wait_for_termination(Some(Duration::from_secs(5))).unwrap();

    // Then
    assert!(matches!(
        fixture.interlock.verdict().cause(),
        Some(FailureCause::UnexpectedServerCrash { status, .. }) if status == "panicked"
    ));
}

#[test]
fn given_running_server_when_started_again_then_already_running_and_run_fails() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");
    unit.start().unwrap();

    // When
    let result = unit.start();

    // Then
    assert!(matches!(result, Err(HarnessError::AlreadyRunning { .. })));
    assert_that!(fixture.interlock.verdict().is_failed(), eq(true));
    unit.stop().unwrap();
}

#[test]
fn given_server_restarting_in_place_when_zapped_then_active_again_without_failure() {
    // Given
    let runs = AtomicU32::new(0);
    let fixture = Fixture::inline(move |ctx| {
        ctx.out(BOOTSTRAP_LINE);
        ctx.out(ACTIVE_LINE);
        if runs.fetch_add(1, Ordering::SeqCst) == 0 {
            ctx.out(ZAP_LINE);
            return InlineExit::Restart;
        }
        serve_until_stopped(ctx)
    });
    let unit = fixture.server("testServer0");

    // When
    unit.start().unwrap();
    let relaunched =
        eventually(|| fixture.interlock.server_pid(unit.id()).unwrap() == Some(1001));
    let mode = unit.wait_for_ready().unwrap();

    // Then
    assert_that!(relaunched, eq(true));
    assert_that!(mode, eq(ServerMode::Active));
    assert_that!(fixture.interlock.verdict(), eq(&Verdict::Running));
    unit.stop().unwrap();
    assert_that!(fixture.interlock.verdict(), eq(&Verdict::Running));
}

#[test]
fn given_server_restarting_when_stop_arrives_then_stop_returns_and_no_relaunch() {
    // Given
    let runs = Arc::new(AtomicU32::new(0));
    let counted = Arc::clone(&runs);
    let fixture = Fixture::inline(move |ctx| {
        ctx.out(BOOTSTRAP_LINE);
        ctx.out(ACTIVE_LINE);
        if counted.fetch_add(1, Ordering::SeqCst) == 0 {
            while !ctx.wait_for_stop(Duration::from_secs(60)) {}
            return InlineExit::Restart;
        }
        serve_until_stopped(ctx)
    });
    let unit = fixture.server("testServer0");
    unit.start().unwrap();
    unit.wait_for_ready().unwrap();

    // When
    let (done, stopped) = mpsc::channel();
    let stopping = unit.clone();
    thread::spawn(move || {
        let _ = done.send(stopping.stop().is_ok());
    });
    let stop_returned = stopped.recv_timeout(Duration::from_secs(5)).ok();

    // Then
    assert_that!(stop_returned, some(eq(true)));
    assert_that!(unit.current_state().unwrap(), eq(ServerMode::Terminated));
    assert_that!(runs.load(Ordering::SeqCst), eq(1));
    assert_that!(fixture.interlock.verdict(), eq(&Verdict::Running));
}

#[test]
fn given_restartable_launcher_when_new_instance_then_same_unit() {
    // Given
    let fixture = Fixture::inline(serving(&[BOOTSTRAP_LINE, ACTIVE_LINE]));
    let unit = fixture.server("testServer0");
    unit.start().unwrap();
    unit.stop().unwrap();

    // When
    let next = unit.new_instance().unwrap();

    // Then
    assert_that!(next.id(), eq(unit.id()));
    next.start().unwrap();
    assert_that!(next.wait_for_ready().unwrap(), eq(ServerMode::Active));
    next.stop().unwrap();
}
