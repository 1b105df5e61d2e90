pub mod aggregate;
pub mod coordinator;
pub mod loc;
pub mod shell;
pub mod tree;

pub use aggregate::{aggregate_tree, AggregateOptions, AggregateReport, MalformedPolicy, SummaryTable};
pub use coordinator::{plan_session, run_sweep, SweepSummary};
pub use shell::ShellDriver;
pub use tree::{ensure_dir, ensure_dir_all, prepare_tree, EnsureOutcome, TreeReport};
