//! CLI command handlers, one file per command.

mod check;
mod completions;
mod notify_test;
mod run;
mod status;

pub use check::run_check;
pub use completions::run_completions;
pub use notify_test::run_notify_test;
pub use run::run_monitor;
pub use status::run_status;
