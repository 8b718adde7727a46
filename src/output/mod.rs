mod archive;
mod progress;
mod styling;
mod summary;
mod tables;

pub use archive::save_reminder;
pub use progress::PhaseProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{print_dry_run, print_run_summary};

/// Prints the Jeeves banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🤵 Jeeves"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CI Failure Reminders")
    );
}
