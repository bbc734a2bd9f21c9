mod client_role;
mod cluster_info;
mod server_mode;
