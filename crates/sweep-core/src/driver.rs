use crate::error::SweepResult;
use crate::plan::Invocation;

/// How one driver invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOutcome {
    Completed,
    /// The driver ran but reported failure; `code` is `None` when it was
    /// killed by a signal.
    Failed { code: Option<i32> },
}

impl DriverOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// The external program that performs `num_runs` timed executions of one
/// problem size and writes `run<r>.txt` files into the output directory.
///
/// Calls are blocking and strictly sequential. An `Err` means the driver
/// could not be started at all and ends the session.
pub trait BenchmarkDriver {
    fn invoke(&mut self, invocation: &Invocation) -> SweepResult<DriverOutcome>;
}
