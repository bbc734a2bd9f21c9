use crate::{ClientUnit, FailureCause, HarnessResult, ServerSlot, StateInterlock, Verdict};

use sk_core::ClientRole;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// File name of the report inside the run directory.
pub const REPORT_FILE_NAME: &str = "report.json";

#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub name: String,
    pub role: ClientRole,
    pub exit_code: Option<i32>,
}

/// What a finished run leaves behind besides the unit logs.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub verdict: Verdict,
    pub passed: bool,
    pub cause: Option<String>,
    pub run_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: String,
    pub servers: Vec<ServerSlot>,
    pub clients: Vec<ClientReport>,
    pub harness_error: Option<String>,
}

impl RunReport {
    pub fn collect(
        run_dir: &Path,
        started_at: DateTime<Utc>,
        interlock: &StateInterlock,
        clients: &[ClientUnit],
        harness_error: Option<String>,
    ) -> Self {
        let finished_at = Utc::now();
        let state = interlock.snapshot();
        let verdict = state.verdict().clone();
        let elapsed = (finished_at - started_at).to_std().unwrap_or_default();

        Self {
            passed: verdict.is_passed() && harness_error.is_none(),
            cause: verdict.cause().map(FailureCause::to_string),
            verdict,
            run_dir: run_dir.to_path_buf(),
            started_at,
            finished_at,
            duration: humantime::format_duration(elapsed).to_string(),
            servers: state.servers().to_vec(),
            clients: clients
                .iter()
                .map(|client| ClientReport {
                    name: client.name().to_string(),
                    role: client.id().role,
                    exit_code: client.exit_code(),
                })
                .collect(),
            harness_error,
        }
    }

    pub fn write(&self, path: &Path) -> HarnessResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
