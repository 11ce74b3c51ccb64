pub mod drain_batch;
pub mod queries;
pub mod reconcile_stuck_runs;
pub mod terminate_run;

pub use drain_batch::{drain_batch, DrainReport, TopicFailure};
pub use queries::{get_run, list_runs};
pub use reconcile_stuck_runs::{
    reconcile_stuck_runs, ReconcileReport, EMPTY_RUN_MESSAGE, TIMED_OUT_MESSAGE,
};
pub use terminate_run::{
    parse_run_id, terminate_run, TerminateOutcome, DEFAULT_TERMINATION_REASON,
};
