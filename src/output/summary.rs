use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::reminder::{DispatchOutcome, RunSummary};
use crate::report::{Link, OwnerReport};

use super::styling::{bright, dim, toned, Tone};
use super::tables::{create_table, outcome_cell};

/// Prints the per-owner result of a reminder run to stdout.
///
/// Owners whose reminder was delivered are green, saved to a file yellow,
/// and lost red. Owners with nothing failing are listed as clear.
pub fn print_run_summary(summary: &RunSummary) {
    println!("{}", render_run_summary(summary));
}

/// Prints what a dry run would have sent, one line per failing job.
pub fn print_dry_run(reports: &[OwnerReport]) {
    println!("{}", render_dry_run(reports));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

fn render_run_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📬", "Reminders");

    if summary.owners.is_empty() {
        let _ = writeln!(output, "  {}", toned("No owners found in blocker file", Tone::Degraded));
        return output;
    }

    let delivered = summary.count(|o| *o == DispatchOutcome::Delivered);
    let saved = summary.count(|o| matches!(o, DispatchOutcome::Saved(_)));
    let failed = summary.count(|o| matches!(o, DispatchOutcome::Failed(_)));
    let clear = summary.owners.iter().filter(|o| o.outcome.is_none()).count();

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        dim("Delivered:"),
        toned(delivered, Tone::Good),
        dim("Saved to file:"),
        toned(saved, Tone::Degraded),
        dim("Failed:"),
        toned(failed, Tone::Bad),
        dim("Clear owners:"),
        toned(clear, Tone::Quiet)
    );

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Owner", "Failing Jobs", "Outcome"]));

    for owner in &summary.owners {
        table.add_row(vec![
            Cell::new(&owner.owner),
            Cell::new(owner.failing_jobs),
            outcome_cell(owner.outcome.as_ref()),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn render_dry_run(reports: &[OwnerReport]) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🔎", "Dry Run");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Owner", "Job", "Result", "Bugs", "Tickets"]));

    for report in reports.iter().filter(|r| !r.is_clear()) {
        for row in &report.rows {
            table.add_row(vec![
                Cell::new(&report.owner),
                Cell::new(&row.job_name),
                Cell::new(row.result).fg(TableColor::Red),
                Cell::new(join_names(&row.bugs)),
                Cell::new(join_names(&row.tickets)),
            ]);
        }
    }

    let _ = writeln!(output, "{table}");
    output
}

fn join_names(links: &[Link]) -> String {
    links
        .iter()
        .map(|link| link.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
