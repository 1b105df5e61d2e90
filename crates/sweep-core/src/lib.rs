pub mod checkpoint;
pub mod driver;
pub mod error;
pub mod layout;
pub mod plan;
pub mod problem;
pub mod record;

pub use checkpoint::Checkpoint;
pub use driver::{BenchmarkDriver, DriverOutcome};
pub use error::{SweepError, SweepResult};
pub use plan::{plan_fresh, plan_resume, Invocation};
pub use problem::{Axis, ProblemSize, Sweep, DEFAULT_MIN_EXPONENT, MAX_EXPONENT};
pub use record::{extract_duration, RunRecord, RunRow, DURATION_MARKER, UNSET_DURATION};
