pub mod client_args;
pub mod control_line;
pub mod control_opcode;
pub mod harness_control;
