use settings::ExecutorConfig;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::types::RawOutput;

/// Failure to run a check command. The runner converts this into a `down`
/// result; the executor itself never synthesizes one.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs a check command as a child process and captures its output.
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Spawn the configured command and wait for it to finish.
    ///
    /// The child environment contains only the explicitly configured
    /// variables; nothing is inherited from the daemon, so commands should
    /// be configured with absolute paths.
    pub async fn run(id: &str, config: &ExecutorConfig) -> Result<RawOutput, ExecError> {
        info!(id, command = %config.command, "running check");

        let output = Command::new(&config.command)
            .args(&config.args)
            .env_clear()
            .envs(&config.env)
            .output()
            .await
            .map_err(|source| ExecError::Spawn { command: config.command.clone(), source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        // A process killed by a signal reports no code; treat that as 0
        // rather than crashing the pipeline.
        let exit_code = output.status.code().unwrap_or(0);

        if exit_code == 0 {
            info!(id, exit_code, "check completed");
        } else {
            warn!(id, exit_code, "check failed");
        }
        if !stdout.is_empty() {
            debug!(id, stdout = %stdout, "check output");
        }
        if !stderr.is_empty() {
            warn!(id, stderr = %stderr, "check stderr");
        }

        Ok(RawOutput { stdout, stderr, exit_code })
    }
}
