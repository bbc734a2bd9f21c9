pub mod error;
pub mod models;
pub mod protocol;

pub use error::{CoreError, Result as CoreErrorResult};
pub use models::client_role::ClientRole;
pub use models::cluster_info::ClusterInfo;
pub use models::server_info::ServerInfo;
pub use models::server_mode::ServerMode;
pub use protocol::client_args::ClientArgs;
pub use protocol::control_line::ControlLine;
pub use protocol::control_opcode::ControlOpcode;
pub use protocol::harness_control::HarnessControl;

/// Prefix of a control request written by a client on its stdout.
pub const SYN_PREFIX: &str = "SYN:";
/// Prefix of the acknowledgement the harness writes to a client's stdin.
pub const ACK_PREFIX: &str = "ACK:";
/// Prefix of the failure line the harness writes instead of an ACK.
pub const FATAL_PREFIX: &str = "FATAL:";

#[cfg(test)]
mod tests;
