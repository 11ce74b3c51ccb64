//! Daily blog runs: the batch drain, the stuck-run sweep and the operator
//! terminate switch.

pub mod activities;
pub mod errors;
pub mod models;

pub use errors::{RunError, RunResult};
pub use models::{DailyBlogRun, RunStatus};
