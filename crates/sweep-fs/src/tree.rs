use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use sweep_core::layout;
use sweep_core::{ProblemSize, Sweep};

/// Result of making sure a directory exists. "Already there" is a normal
/// outcome, not an error.
#[derive(Debug)]
pub enum EnsureOutcome {
    Created,
    AlreadyPresent,
    Failed(io::Error),
}

impl EnsureOutcome {
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Create a single directory level. The parent must exist.
pub fn ensure_dir(path: &Path) -> EnsureOutcome {
    let outcome = match std::fs::create_dir(path) {
        Ok(()) => EnsureOutcome::Created,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => existing(path),
        Err(e) => EnsureOutcome::Failed(e),
    };
    log_outcome(path, &outcome);
    outcome
}

/// Like [`ensure_dir`] but creates missing parents too.
pub fn ensure_dir_all(path: &Path) -> EnsureOutcome {
    let outcome = if path.exists() {
        existing(path)
    } else {
        match std::fs::create_dir_all(path) {
            Ok(()) => EnsureOutcome::Created,
            Err(e) => EnsureOutcome::Failed(e),
        }
    };
    log_outcome(path, &outcome);
    outcome
}

fn existing(path: &Path) -> EnsureOutcome {
    if path.is_dir() {
        EnsureOutcome::AlreadyPresent
    } else {
        EnsureOutcome::Failed(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists but is not a directory",
        ))
    }
}

fn log_outcome(path: &Path, outcome: &EnsureOutcome) {
    match outcome {
        EnsureOutcome::Created => tracing::info!("created directory {}", path.display()),
        EnsureOutcome::AlreadyPresent => {
            tracing::info!("directory {} already exists", path.display())
        }
        EnsureOutcome::Failed(e) => {
            tracing::warn!("cannot create directory {}: {e}", path.display())
        }
    }
}

/// What [`prepare_tree`] did.
#[derive(Debug, Default)]
pub struct TreeReport {
    pub created: usize,
    pub present: usize,
    pub failed: Vec<(PathBuf, io::Error)>,
    unusable: HashSet<ProblemSize>,
}

impl TreeReport {
    /// Whether the directory of `size` exists and can receive result files.
    pub fn is_usable(&self, size: ProblemSize) -> bool {
        !self.unusable.contains(&size)
    }

    fn record(&mut self, path: PathBuf, outcome: EnsureOutcome) -> bool {
        match outcome {
            EnsureOutcome::Created => self.created += 1,
            EnsureOutcome::AlreadyPresent => self.present += 1,
            EnsureOutcome::Failed(e) => {
                self.failed.push((path, e));
                return false;
            }
        }
        true
    }
}

/// Create `root`, one directory per N and one per problem size.
///
/// Failures are recorded, never returned: the affected problem sizes are
/// marked unusable and the rest of the tree is still prepared. Running this
/// twice on the same root is harmless.
pub fn prepare_tree(root: &Path, sweep: &Sweep) -> TreeReport {
    let mut report = TreeReport::default();
    let root_ok = report.record(root.to_path_buf(), ensure_dir_all(root));

    let mut bad_n = HashSet::new();
    for n in sweep.n_axis.values() {
        let dir = layout::n_dir(root, n);
        if !root_ok || !report.record(dir.clone(), ensure_dir(&dir)) {
            bad_n.insert(n);
        }
    }

    for size in sweep.problem_sizes() {
        if bad_n.contains(&size.n) {
            report.unusable.insert(size);
            continue;
        }
        let dir = layout::problem_dir(root, size);
        if !report.record(dir.clone(), ensure_dir(&dir)) {
            report.unusable.insert(size);
        }
    }

    report
}
