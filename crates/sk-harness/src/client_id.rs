use sk_core::ClientRole;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClientId {
    pub role: ClientRole,
    pub index: u32,
}

impl ClientId {
    pub fn setup() -> Self {
        Self {
            role: ClientRole::Setup,
            index: 0,
        }
    }

    pub fn test(index: u32) -> Self {
        Self {
            role: ClientRole::Test,
            index,
        }
    }

    pub fn destroy() -> Self {
        Self {
            role: ClientRole::Destroy,
            index: 0,
        }
    }

    /// `setup-client`, `test-client-<i>` or `destroy-client`.
    pub fn name(&self) -> String {
        match self.role {
            ClientRole::Setup => String::from("setup-client"),
            ClientRole::Test => format!("test-client-{}", self.index),
            ClientRole::Destroy => String::from("destroy-client"),
        }
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
