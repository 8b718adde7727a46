mod correlate;
mod dispatch;
mod render;

use futures::future::join_all;
use log::{debug, info};

use crate::blockers::Blockers;
use crate::providers::{release_version, BuildStatusResolver, RecordLookup};
use crate::report::{CorrelatedRow, OwnerReport};

use correlate::correlate;

pub use dispatch::{DispatchOutcome, Dispatcher, OwnerSummary, RunSummary};
pub use render::{HandlebarsRenderer, ReportRenderer};

/// Builds one consolidated report per job owner.
///
/// Owners are handled one after another. The jobs of a single owner are
/// resolved concurrently, and rows keep the blocker file's job order.
pub struct Reminder<S, D, T> {
    status: S,
    defects: D,
    tickets: T,
}

impl<S, D, T> Reminder<S, D, T>
where
    S: BuildStatusResolver,
    D: RecordLookup,
    T: RecordLookup,
{
    pub fn new(status: S, defects: D, tickets: T) -> Self {
        Self {
            status,
            defects,
            tickets,
        }
    }

    /// Builds a report for every owner in the blocker file, in owner order.
    ///
    /// Owners without failing jobs get an empty report. Returns nothing when
    /// no job lists an owner.
    pub async fn collect_reports(&self, blockers: &Blockers) -> Vec<OwnerReport> {
        let owners = blockers.owners();

        if owners.is_empty() {
            info!("No owners found in blocker file");
            return Vec::new();
        }

        info!(
            "Collecting reminders for {} owners across {} jobs",
            owners.len(),
            blockers.len()
        );

        let mut reports = Vec::with_capacity(owners.len());
        for owner in owners {
            let report = self.owner_report(blockers, owner).await;
            if report.is_clear() {
                info!("Owner {} has no UNSTABLE or FAILED jobs!", report.owner);
            } else {
                info!(
                    "Owner {} has {} UNSTABLE or FAILED jobs",
                    report.owner,
                    report.rows.len()
                );
            }
            reports.push(report);
        }

        reports
    }

    pub async fn owner_report(&self, blockers: &Blockers, owner: String) -> OwnerReport {
        let futures: Vec<_> = blockers
            .jobs_for_owner(&owner)
            .map(|job_name| self.build_row(blockers, job_name))
            .collect();

        let rows = join_all(futures).await.into_iter().flatten().collect();

        OwnerReport { owner, rows }
    }

    /// Returns a row only for a job whose last build is UNSTABLE or FAILURE.
    async fn build_row(&self, blockers: &Blockers, job_name: &str) -> Option<CorrelatedRow> {
        let entry = blockers.get(job_name)?;

        let Some(status) = self.status.resolve(job_name).await else {
            debug!("Skipping {job_name}: build status unavailable");
            return None;
        };

        if !status.is_failing() {
            debug!("Skipping {job_name}: last build is {}", status.result);
            return None;
        }

        let correlation =
            correlate(blockers, job_name, entry, &self.defects, &self.tickets).await;

        Some(CorrelatedRow {
            osp_version: release_version(job_name).unwrap_or_else(|| "N/A".to_string()),
            job_name: job_name.to_string(),
            job_url: status.job_url,
            build_number: status.build_number,
            build_url: status.build_url,
            compose: status.compose,
            result: status.result,
            bugs: correlation.bugs,
            tickets: correlation.tickets,
            other: correlation.other,
        })
    }
}
