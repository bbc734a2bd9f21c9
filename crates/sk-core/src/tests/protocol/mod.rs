mod client_args;
mod control_line;
mod harness_control;
