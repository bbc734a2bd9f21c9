use crate::{ClientRole, ClusterInfo};

use clap::Parser;

/// Arguments every client test process is launched with.
///
/// The harness renders them with [`ClientArgs::to_args`]; a client program
/// parses its own command line with [`ClientArgs::parse`].
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "stripekit-client")]
#[command(about = "Client test process driven by the stripekit harness")]
pub struct ClientArgs {
    /// Phase this client runs in
    #[arg(long = "task", value_enum)]
    pub task: ClientRole,

    /// Test entry point to run
    #[arg(long = "testClass")]
    pub test_class: String,

    /// URI clients connect to the stripe with
    #[arg(long = "connectUri")]
    pub connect_uri: String,

    /// Encoded cluster info (`name,tsaPort,groupPort;...`)
    #[arg(long = "clusterInfo")]
    pub cluster_info: ClusterInfo,

    #[arg(long = "numberOfStripes")]
    pub number_of_stripes: u32,

    #[arg(long = "numberOfServersPerStripe")]
    pub number_of_servers_per_stripe: u32,

    #[arg(long = "totalClientCount")]
    pub total_client_count: u32,

    /// Zero-based index among the test clients
    #[arg(long = "thisClientIndex")]
    pub this_client_index: u32,

    /// Class used to report errors from the client, if any
    #[arg(long = "errorClass")]
    pub error_class: Option<String>,
}

impl ClientArgs {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--task".to_string(),
            self.task.as_str().to_string(),
            "--testClass".to_string(),
            self.test_class.clone(),
            "--connectUri".to_string(),
            self.connect_uri.clone(),
            "--clusterInfo".to_string(),
            self.cluster_info.encode(),
            "--numberOfStripes".to_string(),
            self.number_of_stripes.to_string(),
            "--numberOfServersPerStripe".to_string(),
            self.number_of_servers_per_stripe.to_string(),
            "--totalClientCount".to_string(),
            self.total_client_count.to_string(),
            "--thisClientIndex".to_string(),
            self.this_client_index.to_string(),
        ];

        if let Some(error_class) = &self.error_class {
            args.push("--errorClass".to_string());
            args.push(error_class.clone());
        }

        args
    }
}
