use crate::{ControlLine, ControlOpcode};

use googletest::assert_that;
use googletest::prelude::eq;

#[test]
fn given_syn_line_when_parsed_then_request() {
    assert_that!(
        ControlLine::parse("SYN:TERMINATE_ACTIVE\n"),
        eq(&ControlLine::Request(ControlOpcode::TerminateActive))
    );
}

#[test]
fn given_syn_line_with_unknown_opcode_when_parsed_then_unknown_request() {
    assert_that!(
        ControlLine::parse("SYN:REBALANCE"),
        eq(&ControlLine::UnknownRequest("REBALANCE".to_string()))
    );
}

#[test]
fn given_ack_line_when_parsed_then_ack() {
    assert_that!(
        ControlLine::parse("ACK:WAIT_FOR_PASSIVES\r\n"),
        eq(&ControlLine::Ack(ControlOpcode::WaitForPassivesInStandby))
    );
}

#[test]
fn given_fatal_line_when_parsed_then_message_kept() {
    assert_that!(
        ControlLine::parse("FATAL:no active server"),
        eq(&ControlLine::Fatal("no active server".to_string()))
    );
}

#[test]
fn given_ordinary_log_line_when_parsed_then_output() {
    assert_that!(
        ControlLine::parse("12:00:01 INFO connected to stripe"),
        eq(&ControlLine::Output)
    );
}

#[test]
fn given_prefix_mid_line_when_parsed_then_output() {
    assert_that!(
        ControlLine::parse("echo SYN:SYNC"),
        eq(&ControlLine::Output)
    );
}

#[test]
fn given_every_opcode_when_rendered_and_parsed_then_same_opcode() {
    for op in ControlOpcode::ALL {
        assert_that!(
            ControlLine::parse(&ControlLine::request(op)),
            eq(&ControlLine::Request(op))
        );
        assert_that!(
            ControlLine::parse(&ControlLine::ack(op)),
            eq(&ControlLine::Ack(op))
        );
    }
}

#[test]
fn given_multi_line_message_when_fatal_rendered_then_single_line() {
    // When
    let line = ControlLine::fatal("first\nsecond\r\nthird");

    // Then
    assert_that!(line.as_str(), eq("FATAL:first second  third"));
}
