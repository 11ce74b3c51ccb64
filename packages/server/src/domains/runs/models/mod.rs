pub mod run;

pub use run::{DailyBlogRun, RunStatus};
