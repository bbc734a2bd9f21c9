use crate::{HarnessResult, ServerUnit, StripeControl, UnitEnvironment};

use sk_config::StripeConfig;
use sk_core::{ClusterInfo, ServerInfo};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

/// Host clients connect to; servers of a stripe always run locally.
const STRIPE_HOST: &str = "localhost";

/// The installed servers of one stripe and what clients need to reach them.
pub struct Stripe {
    name: String,
    dir: PathBuf,
    cluster_info: ClusterInfo,
    connect_uri: String,
    control: Arc<StripeControl>,
}

impl Stripe {
    /// Create a working directory per server under `<parent>/<stripe name>`
    /// and register every server with the interlock, all `Terminated`.
    pub fn install(
        stripe: &StripeConfig,
        parent: &Path,
        env: Arc<UnitEnvironment>,
    ) -> HarnessResult<Self> {
        let dir = parent.join(&stripe.name);
        let mut units = Vec::new();
        let mut servers = Vec::new();

        for index in 0..stripe.server_count {
            let name = stripe.server_name(index);
            let working_dir = dir.join(&name);
            std::fs::create_dir_all(&working_dir)?;

            let id = env.interlock.register_server(&name)?;
            servers.push(ServerInfo::new(
                name.clone(),
                stripe.tsa_port(index),
                stripe.group_port(index),
            ));
            units.push(ServerUnit::new(
                id,
                name,
                index,
                working_dir,
                Arc::clone(&env),
            ));
        }

        let cluster_info = ClusterInfo::new(servers);
        let connect_uri = cluster_info.connect_uri(&stripe.uri_scheme, STRIPE_HOST);
        info!(
            "Installed stripe {} with {} servers at {}",
            stripe.name,
            units.len(),
            dir.display()
        );

        Ok(Self {
            name: stripe.name.clone(),
            dir,
            cluster_info,
            connect_uri,
            control: Arc::new(StripeControl::new(Arc::clone(&env.interlock), units)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cluster_info(&self) -> &ClusterInfo {
        &self.cluster_info
    }

    pub fn connect_uri(&self) -> &str {
        &self.connect_uri
    }

    pub fn server_count(&self) -> usize {
        self.cluster_info.len()
    }

    pub fn control(&self) -> Arc<StripeControl> {
        Arc::clone(&self.control)
    }
}
