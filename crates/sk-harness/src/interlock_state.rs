use crate::{ClientId, ServerId, ServerSlot, Verdict};

use sk_core::ServerMode;

use serde::Serialize;

/// Everything the interlock guards with its one lock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterlockState {
    pub(crate) servers: Vec<ServerSlot>,
    pub(crate) clients: Vec<ClientId>,
    pub(crate) verdict: Verdict,
    pub(crate) shutting_down: bool,
    pub(crate) ignore_server_crashes: bool,
}

impl InterlockState {
    pub fn servers(&self) -> &[ServerSlot] {
        &self.servers
    }

    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub(crate) fn id_of(&self, index: usize) -> ServerId {
        ServerId::new(index, self.servers[index].generation)
    }

    pub(crate) fn ids_where<F>(&self, mut pred: F) -> Vec<ServerId>
    where
        F: FnMut(&ServerSlot) -> bool,
    {
        self.servers
            .iter()
            .enumerate()
            .filter(|(_, slot)| pred(slot))
            .map(|(index, slot)| ServerId::new(index, slot.generation))
            .collect()
    }

    pub(crate) fn first_where<F>(&self, pred: F) -> Option<ServerId>
    where
        F: FnMut(&ServerSlot) -> bool,
    {
        self.ids_where(pred).into_iter().next()
    }

    pub(crate) fn active(&self) -> Option<ServerId> {
        self.first_where(|slot| slot.mode == ServerMode::Active)
    }

    pub(crate) fn any_server_running(&self) -> bool {
        self.servers.iter().any(|slot| slot.mode.is_running())
    }

    /// No running server and no registered client.
    pub fn is_empty(&self) -> bool {
        !self.any_server_running() && self.clients.is_empty()
    }

    /// One-line count used while waiting in forced shutdown.
    pub fn summary(&self) -> String {
        let count = |mode: ServerMode| self.servers.iter().filter(|s| s.mode == mode).count();
        let unknown = self
            .servers
            .iter()
            .filter(|s| s.mode.is_settling())
            .count();
        format!(
            "active: {} passives: {} diagnostic servers: {} unknown: {} clients: {}",
            count(ServerMode::Active),
            count(ServerMode::Passive),
            count(ServerMode::Diagnostic),
            unknown,
            self.clients.len()
        )
    }

    fn names_where<F>(&self, mut pred: F) -> String
    where
        F: FnMut(&ServerSlot) -> bool,
    {
        let names = self
            .servers
            .iter()
            .filter(|slot| pred(slot))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        format!("[{}]", names.join(", "))
    }
}

/// Full dump, logged on invariant violations and shutdown timeouts.
impl std::fmt::Display for InterlockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clients = self
            .clients
            .iter()
            .map(ClientId::name)
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(
            f,
            "Interlock (verdict: {}, shutting down: {}, ignore crashes: {})",
            self.verdict, self.shutting_down, self.ignore_server_crashes
        )?;
        writeln!(
            f,
            "\tActive: {}",
            self.names_where(|s| s.mode == ServerMode::Active)
        )?;
        writeln!(
            f,
            "\tPassives: {}",
            self.names_where(|s| s.mode == ServerMode::Passive)
        )?;
        writeln!(
            f,
            "\tDiagnostic servers: {}",
            self.names_where(|s| s.mode == ServerMode::Diagnostic)
        )?;
        writeln!(f, "\tUnknown: {}", self.names_where(|s| s.mode.is_settling()))?;
        writeln!(
            f,
            "\tTerminated: {}",
            self.names_where(|s| s.mode == ServerMode::Terminated)
        )?;
        write!(f, "\tClients: [{clients}]")
    }
}
