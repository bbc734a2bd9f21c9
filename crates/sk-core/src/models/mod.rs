pub mod client_role;
pub mod cluster_info;
pub mod server_info;
pub mod server_mode;
