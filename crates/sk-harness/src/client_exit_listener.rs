use crate::ClientId;

/// Told about a client's exit before the client leaves the interlock.
pub trait ClientExitListener: Send + Sync {
    /// `exit_code` is `None` when the client was killed by a signal or never ran.
    fn on_client_exit(&self, client: &ClientId, exit_code: Option<i32>);
}
