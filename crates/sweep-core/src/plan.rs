//! Which driver invocations a session performs, and in what order.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checkpoint::Checkpoint;
use crate::layout;
use crate::problem::{ProblemSize, Sweep};

/// One call of the external benchmark driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    #[serde(flatten)]
    pub size: ProblemSize,
    pub start_run: u32,
    pub num_runs: u32,
    pub output_dir: PathBuf,
}

impl Invocation {
    pub fn new(root: &Path, size: ProblemSize, start_run: u32, num_runs: u32) -> Self {
        Self {
            size,
            start_run,
            num_runs,
            output_dir: layout::problem_dir(root, size),
        }
    }

    /// Positional driver arguments: `N Nx start_run num_runs output_dir`.
    pub fn args(&self) -> [String; 5] {
        [
            self.size.n.to_string(),
            self.size.nx.to_string(),
            self.start_run.to_string(),
            self.num_runs.to_string(),
            self.output_dir.to_string_lossy().into_owned(),
        ]
    }
}

/// Every problem size from run 1.
pub fn plan_fresh(sweep: &Sweep, num_runs: u32, root: &Path) -> Vec<Invocation> {
    sweep
        .problem_sizes()
        .into_iter()
        .map(|size| Invocation::new(root, size, 1, num_runs))
        .collect()
}

/// Finish the interrupted N row from the checkpoint's Nx onward, then run
/// every larger N across the whole Nx axis.
///
/// Only the interrupted cell starts mid-way; later Nx values on its row
/// restart at 1 even if an earlier session already reached them.
pub fn plan_resume(
    sweep: &Sweep,
    checkpoint: &Checkpoint,
    num_runs: u32,
    root: &Path,
) -> Vec<Invocation> {
    let n_err = checkpoint.size.n;
    let nx_err = checkpoint.size.nx;

    let error_row = sweep
        .nx_axis
        .values()
        .filter(|&nx| nx >= nx_err)
        .map(|nx| {
            let start = if nx == nx_err { checkpoint.run } else { 1 };
            Invocation::new(root, ProblemSize::new(n_err, nx), start, num_runs)
        });

    let rest = sweep
        .problem_sizes()
        .into_iter()
        .filter(|size| size.n > n_err)
        .map(|size| Invocation::new(root, size, 1, num_runs));

    error_row.chain(rest).collect()
}
