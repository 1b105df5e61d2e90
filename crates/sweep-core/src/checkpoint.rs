use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{SweepError, SweepResult};
use crate::layout;
use crate::problem::{ProblemSize, Sweep};

/// Resume marker: the result file that was being produced when a previous
/// session stopped, e.g. `bench/N4194304/N4194304_Nx65536/run16.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub size: ProblemSize,
    pub run: u32,
}

impl Checkpoint {
    pub fn parse(input: &str) -> SweepResult<Self> {
        let fail = |reason: String| SweepError::CheckpointParse {
            input: input.to_string(),
            reason,
        };

        let mut components = Path::new(input.trim())
            .iter()
            .rev()
            .map(|c| c.to_str().unwrap_or_default());

        let file = components
            .next()
            .ok_or_else(|| fail("path is empty".into()))?;
        let dir = components
            .next()
            .ok_or_else(|| fail("missing the N<N>_Nx<Nx> directory".into()))?;

        let run = layout::parse_run_file_name(file).map_err(|e| fail(e.to_string()))?;
        let size = layout::parse_problem_dir_name(dir).map_err(|e| fail(e.to_string()))?;

        if let Some(Ok(parent_n)) = components.next().map(layout::parse_n_dir_name) {
            if parent_n != size.n {
                return Err(fail(format!(
                    "parent directory says N={parent_n} but problem directory says N={}",
                    size.n
                )));
            }
        }

        Ok(Self { size, run })
    }

    /// The checkpoint must name a cell of `sweep`, otherwise resuming from it
    /// would run sizes the operator never asked for.
    pub fn validate(&self, sweep: &Sweep) -> SweepResult<()> {
        if sweep.contains(self.size) {
            return Ok(());
        }
        Err(SweepError::CheckpointParse {
            input: self.to_string(),
            reason: format!(
                "{} is outside the sweep (exponents {}..={} for N, {}..={} for Nx)",
                self.size,
                sweep.n_axis.min_exp(),
                sweep.n_axis.max_exp(),
                sweep.nx_axis.min_exp(),
                sweep.nx_axis.max_exp(),
            ),
        })
    }
}

impl FromStr for Checkpoint {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            layout::n_dir_name(self.size.n),
            layout::problem_dir_name(self.size),
            layout::run_file_name(self.run)
        )
    }
}
