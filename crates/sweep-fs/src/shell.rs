use std::path::PathBuf;
use std::process::Command;

use sweep_core::{BenchmarkDriver, DriverOutcome, Invocation, SweepError, SweepResult};

/// Runs an external program (typically a shell wrapper around `perf stat`)
/// once per invocation, passing `N Nx start_run num_runs output_dir`.
#[derive(Debug, Clone)]
pub struct ShellDriver {
    program: PathBuf,
}

impl ShellDriver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl BenchmarkDriver for ShellDriver {
    fn invoke(&mut self, invocation: &Invocation) -> SweepResult<DriverOutcome> {
        tracing::debug!(
            program = %self.program.display(),
            args = ?invocation.args(),
            "spawning driver"
        );
        let status = Command::new(&self.program)
            .args(invocation.args())
            .status()
            .map_err(|e| {
                SweepError::Driver(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if status.success() {
            Ok(DriverOutcome::Completed)
        } else {
            Ok(DriverOutcome::Failed {
                code: status.code(),
            })
        }
    }
}
