use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, toned, Tone};

/// Spinner for the two phases of a reminder run.
///
/// A dry run stops after correlation; a normal run goes on to dispatch.
pub struct PhaseProgress {
    pb: ProgressBar,
    phases: usize,
}

impl PhaseProgress {
    pub fn start_correlation(owners: usize, dry_run: bool) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let phases = if dry_run { 1 } else { 2 };
        let pb = create_spinner(
            toned(
                format!("Phase 1/{phases}: Correlating failing jobs for {owners} owners"),
                Tone::Degraded,
            )
            .to_string(),
        );
        Self { pb, phases }
    }

    pub fn finish_correlation(self, failing_jobs: usize) -> Self {
        self.pb.finish_with_message(
            toned(
                format!(
                    "Phase 1/{}: Found {failing_jobs} failing jobs ✓",
                    self.phases
                ),
                Tone::Good,
            )
            .to_string(),
        );
        self
    }

    pub fn start_dispatch(self, reminders: usize) -> Self {
        let pb = create_spinner(
            toned(
                format!("Phase 2/{}: Sending {reminders} reminders", self.phases),
                Tone::Degraded,
            )
            .to_string(),
        );
        Self {
            pb,
            phases: self.phases,
        }
    }

    pub fn finish_dispatch(self) {
        self.pb.finish_with_message(
            toned(
                format!("Phase 2/{}: Reminders dispatched ✓", self.phases),
                Tone::Good,
            )
            .to_string(),
        );
        eprintln!();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
