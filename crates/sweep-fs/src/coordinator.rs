use std::path::Path;

use sweep_core::{
    plan_fresh, plan_resume, BenchmarkDriver, Checkpoint, DriverOutcome, Invocation, ProblemSize,
    Sweep, SweepError, SweepResult,
};

use crate::tree::prepare_tree;

/// Counts for one session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    pub planned: usize,
    pub completed: usize,
    pub failed: Vec<ProblemSize>,
    pub skipped: Vec<ProblemSize>,
}

/// Invocations a session would perform, without touching the filesystem.
///
/// A checkpoint is rejected when it lies outside `sweep` or when its last run
/// index would not fit in a `u32`.
pub fn plan_session(
    root: &Path,
    sweep: &Sweep,
    num_runs: u32,
    checkpoint: Option<&Checkpoint>,
) -> SweepResult<Vec<Invocation>> {
    match checkpoint {
        Some(cp) => {
            cp.validate(sweep)?;
            if cp.run.checked_add(num_runs.saturating_sub(1)).is_none() {
                return Err(SweepError::CheckpointParse {
                    input: cp.to_string(),
                    reason: format!("{num_runs} runs from run {} overflow the run index", cp.run),
                });
            }
            Ok(plan_resume(sweep, cp, num_runs, root))
        }
        None => Ok(plan_fresh(sweep, num_runs, root)),
    }
}

/// Prepare the result tree and drive every planned invocation in order.
///
/// A malformed checkpoint is rejected before anything is created or run.
/// Problem sizes whose directory could not be created are skipped; a driver
/// that exits non-zero is logged and the sweep moves on.
pub fn run_sweep<D: BenchmarkDriver + ?Sized>(
    root: &Path,
    sweep: &Sweep,
    num_runs: u32,
    checkpoint: Option<&Checkpoint>,
    driver: &mut D,
) -> SweepResult<SweepSummary> {
    let plan = plan_session(root, sweep, num_runs, checkpoint)?;
    let tree = prepare_tree(root, sweep);

    match checkpoint {
        Some(cp) => tracing::info!("restarting from where the error occurred in {cp}"),
        None => tracing::info!("starting fresh"),
    }

    let mut summary = SweepSummary {
        planned: plan.len(),
        ..Default::default()
    };

    for inv in &plan {
        if !tree.is_usable(inv.size) {
            tracing::warn!(
                "skipping {}: directory {} is unavailable",
                inv.size,
                inv.output_dir.display()
            );
            summary.skipped.push(inv.size);
            continue;
        }

        tracing::info!(
            start_run = inv.start_run,
            num_runs = inv.num_runs,
            "running {}",
            inv.size
        );
        match driver.invoke(inv)? {
            DriverOutcome::Completed => summary.completed += 1,
            DriverOutcome::Failed { code } => {
                tracing::warn!(?code, "driver failed for {}", inv.size);
                summary.failed.push(inv.size);
            }
        }
    }

    Ok(summary)
}
