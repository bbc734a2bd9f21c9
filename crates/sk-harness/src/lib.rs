mod admission_gate;
mod client_exit_listener;
mod client_id;
mod client_trigger_handler;
mod client_unit;
mod control_surface;
mod error;
mod failure_cause;
mod force_shutdown;
mod interlock;
mod interlock_state;
pub mod launch;
mod phase_orchestrator;
mod run_report;
mod server_id;
mod server_slot;
mod server_trigger_handler;
mod server_unit;
mod severity_filter;
mod severity_handler;
mod stripe;
mod stripe_control;
mod trigger_action;
mod trigger_handler;
mod trigger_scanner;
mod trigger_table;
mod unit_environment;
mod unit_logs;
mod verdict;

pub use admission_gate::{AdmissionGate, AdmissionToken};
pub use client_exit_listener::ClientExitListener;
pub use client_id::ClientId;
pub use client_trigger_handler::ClientTriggerHandler;
pub use client_unit::{ClientUnit, ProcessSlot};
pub use control_surface::{ClusterControl, dispatch};
pub use error::{HarnessError, Result as HarnessResult};
pub use failure_cause::FailureCause;
pub use force_shutdown::ForceShutdown;
pub use interlock::StateInterlock;
pub use interlock_state::InterlockState;
pub use phase_orchestrator::PhaseOrchestrator;
pub use run_report::{ClientReport, REPORT_FILE_NAME, RunReport};
pub use server_id::ServerId;
pub use server_slot::ServerSlot;
pub use server_trigger_handler::ServerTriggerHandler;
pub use server_unit::ServerUnit;
pub use severity_filter::SeverityFilter;
pub use severity_handler::SeverityHandler;
pub use stripe::Stripe;
pub use stripe_control::StripeControl;
pub use trigger_action::TriggerAction;
pub use trigger_handler::TriggerHandler;
pub use trigger_scanner::TriggerScanner;
pub use trigger_table::TriggerTable;
pub use unit_environment::UnitEnvironment;
pub use unit_logs::UnitLogs;
pub use verdict::Verdict;

/// Directory under the run directory holding one directory per client.
pub const CLIENTS_DIR_NAME: &str = "clients";

#[cfg(test)]
mod tests;
