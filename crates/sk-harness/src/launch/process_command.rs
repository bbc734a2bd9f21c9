use sk_config::{ClientConfig, StripeConfig};
use sk_core::ClientArgs;

/// Command line of one server or client process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessCommand {
    /// `program [-Xms -Xmx] [debug] [-Dk=v...] entry_args [-f config] -n name`
    pub fn for_server(stripe: &StripeConfig, index: u32) -> Self {
        let mut args = heap_flags(stripe.heap_mb);

        if let Some(port) = stripe.debug_port(index) {
            args.extend(debug_flags(port));
        }
        for (key, value) in &stripe.properties {
            args.push(format!("-D{key}={value}"));
        }
        args.extend(stripe.entry_args.iter().cloned());
        if let Some(config_file) = &stripe.config_file {
            args.push("-f".to_string());
            args.push(config_file.clone());
        }
        args.push("-n".to_string());
        args.push(stripe.server_name(index));

        Self {
            program: stripe.program.clone(),
            args,
        }
    }

    /// `program [-Xms -Xmx] [debug] base_args entry_point client_args`
    pub fn for_client(client: &ClientConfig, client_args: &ClientArgs) -> Self {
        let mut args = heap_flags(client.heap_mb);

        if let Some(port) = client.debug_port() {
            args.extend(debug_flags(port));
        }
        args.extend(client.base_args.iter().cloned());
        if !client.entry_point.is_empty() {
            args.push(client.entry_point.clone());
        }
        args.extend(client_args.to_args());

        Self {
            program: client.program.clone(),
            args,
        }
    }
}

fn heap_flags(heap_mb: u32) -> Vec<String> {
    if heap_mb == 0 {
        return Vec::new();
    }
    vec![format!("-Xms{heap_mb}m"), format!("-Xmx{heap_mb}m")]
}

fn debug_flags(port: u16) -> [String; 2] {
    [
        String::from("-Xdebug"),
        format!("-Xrunjdwp:transport=dt_socket,server=y,address={port}"),
    ]
}

impl std::fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
