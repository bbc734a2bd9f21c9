use crate::{ControlOpcode, CoreError, HarnessControl};

use std::io::Cursor;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};

fn written(control: HarnessControl<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    let (_, writer) = control.into_inner();
    String::from_utf8(writer).unwrap()
}

#[test]
fn given_matching_ack_when_request_then_ok_and_syn_written() {
    // Given
    let input = Cursor::new(b"ACK:WAIT_FOR_ACTIVE\n".to_vec());
    let mut control = HarnessControl::new(input, Vec::new());

    // When
    let result = control.wait_for_active();

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(written(control).as_str(), eq("SYN:WAIT_FOR_ACTIVE\n"));
}

#[test]
fn given_noise_and_foreign_acks_before_ack_when_request_then_skipped() {
    // Given
    let input = Cursor::new(b"hello\nACK:SOMETHING_NEW\nACK:SYNC\nACK:TERMINATE_ACTIVE\n".to_vec());
    let mut control = HarnessControl::new(input, Vec::new());

    // When
    let result = control.terminate_active();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
fn given_fatal_reply_when_request_then_control_fatal_error() {
    // Given
    let input = Cursor::new(b"FATAL:no active server\n".to_vec());
    let mut control = HarnessControl::new(input, Vec::new());

    // When
    let result = control.request(ControlOpcode::TerminateActive);

    // Then
    assert_that!(result, err(anything()));
    match result.unwrap_err() {
        CoreError::ControlFatal { opcode, message, .. } => {
            assert_that!(opcode.as_str(), eq("TERMINATE_ACTIVE"));
            assert_that!(message.as_str(), eq("no active server"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_closed_input_when_request_then_channel_closed_error() {
    // Given
    let mut control = HarnessControl::new(Cursor::new(Vec::new()), Vec::new());

    // When
    let result = control.synchronize();

    // Then
    assert!(matches!(
        result,
        Err(CoreError::ControlChannelClosed { .. })
    ));
}
