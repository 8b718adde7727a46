use std::fmt;
use std::path::PathBuf;

use log::{error, info, warn};

use crate::mail::MailTransport;
use crate::output::save_reminder;
use crate::report::{OwnerReport, ReportHeader};

use super::render::ReportRenderer;

/// What happened to one owner's reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Accepted by the mail server for every recipient.
    Delivered,
    /// Delivery failed; the rendered reminder was written to this file.
    Saved(PathBuf),
    /// Neither delivered nor saved.
    Failed(String),
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Saved(path) => write!(f, "saved to {}", path.display()),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-owner line of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub owner: String,
    pub failing_jobs: usize,
    /// `None` when the owner had nothing failing and no mail was attempted.
    pub outcome: Option<DispatchOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub owners: Vec<OwnerSummary>,
}

impl RunSummary {
    pub fn count(&self, predicate: impl Fn(&DispatchOutcome) -> bool) -> usize {
        self.owners
            .iter()
            .filter(|o| o.outcome.as_ref().is_some_and(&predicate))
            .count()
    }
}

/// Renders owner reports and mails them, falling back to a local file.
pub struct Dispatcher<R, M> {
    renderer: R,
    transport: M,
    header: ReportHeader,
    fallback_dir: PathBuf,
}

impl<R: ReportRenderer, M: MailTransport> Dispatcher<R, M> {
    pub fn new(renderer: R, transport: M, header: ReportHeader, fallback_dir: PathBuf) -> Self {
        Self {
            renderer,
            transport,
            header,
            fallback_dir,
        }
    }

    /// Renders and sends one report. Never fails: every error ends in a saved
    /// file or a `Failed` outcome so the remaining owners are still processed.
    pub async fn dispatch(&self, report: &OwnerReport) -> DispatchOutcome {
        let html = match self.renderer.render(&self.header, &report.rows) {
            Ok(html) => html,
            Err(e) => {
                error!("Unable to render reminder for {}: {e}", report.owner);
                return DispatchOutcome::Failed(e.to_string());
            }
        };

        let subject = format!("Jeeves Reminder for {}", report.owner);
        let from = match &self.header.from_name {
            Some(name) => format!("{name} <{}>", self.header.from_address),
            None => self.header.from_address.clone(),
        };

        match self
            .transport
            .send(&from, &report.owner, &subject, &html)
            .await
        {
            Ok(undelivered) if undelivered.is_empty() => {
                info!(
                    "Reminder for {} successfully accepted by mail server for delivery",
                    report.owner
                );
                DispatchOutcome::Delivered
            }
            Ok(undelivered) => {
                warn!(
                    "Mail server cannot deliver reminder to following recipients: {}",
                    undelivered.into_iter().collect::<Vec<_>>().join(", ")
                );
                self.save(report, &html)
            }
            Err(e) => {
                warn!("Error sending email reminder to {}: {e}", report.owner);
                self.save(report, &html)
            }
        }
    }

    /// Sends every report that has rows. Clear owners are recorded without
    /// contacting the mail server.
    pub async fn dispatch_all(&self, reports: &[OwnerReport]) -> RunSummary {
        let mut owners = Vec::with_capacity(reports.len());

        for report in reports {
            let outcome = if report.is_clear() {
                None
            } else {
                Some(self.dispatch(report).await)
            };

            owners.push(OwnerSummary {
                owner: report.owner.clone(),
                failing_jobs: report.rows.len(),
                outcome,
            });
        }

        RunSummary { owners }
    }

    fn save(&self, report: &OwnerReport, html: &str) -> DispatchOutcome {
        match save_reminder(&self.fallback_dir, &report.owner, self.header.date, html) {
            Ok(path) => {
                info!("HTML file generated: {}", path.display());
                DispatchOutcome::Saved(path)
            }
            Err(e) => {
                error!("Unable to save reminder for {}: {e}", report.owner);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{JeevesError, Result};
    use crate::report::{BuildResult, CorrelatedRow, RecordKind};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct PlainRenderer;

    impl ReportRenderer for PlainRenderer {
        fn render(&self, _header: &ReportHeader, rows: &[CorrelatedRow]) -> Result<String> {
            Ok(rows
                .iter()
                .map(|r| r.job_name.as_str())
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    struct BrokenRenderer;

    impl ReportRenderer for BrokenRenderer {
        fn render(&self, _header: &ReportHeader, _rows: &[CorrelatedRow]) -> Result<String> {
            Err(JeevesError::Config("template missing".to_string()))
        }
    }

    enum Reply {
        Accept,
        Refuse,
        Error,
    }

    struct FakeTransport {
        reply: Reply,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeTransport {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl MailTransport for FakeTransport {
        async fn send(
            &self,
            from: &str,
            to: &str,
            subject: &str,
            _html: &str,
        ) -> Result<BTreeSet<String>> {
            self.sent
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string(), subject.to_string()));

            match self.reply {
                Reply::Accept => Ok(BTreeSet::new()),
                Reply::Refuse => Ok(BTreeSet::from([to.to_string()])),
                Reply::Error => Err(JeevesError::Mail("connection refused".to_string())),
            }
        }
    }

    fn header() -> ReportHeader {
        ReportHeader {
            from_address: "jeeves@example.com".to_string(),
            from_name: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            labels: Default::default(),
        }
    }

    fn report(owner: &str) -> OwnerReport {
        OwnerReport {
            owner: owner.to_string(),
            rows: vec![CorrelatedRow {
                osp_version: "17.1".to_string(),
                job_name: "job-a".to_string(),
                job_url: "https://jenkins/job/job-a/".to_string(),
                build_number: 3,
                build_url: "https://jenkins/job/job-a/3/".to_string(),
                compose: "RHOS-17.1".to_string(),
                result: BuildResult::Unstable,
                bugs: vec![RecordKind::Bug.placeholder()],
                tickets: vec![RecordKind::Ticket.placeholder()],
                other: vec![RecordKind::Other.placeholder()],
            }],
        }
    }

    #[tokio::test]
    async fn test_delivered_report_is_not_saved() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            PlainRenderer,
            FakeTransport::new(Reply::Accept),
            header(),
            temp_dir.path().to_path_buf(),
        );

        let outcome = dispatcher.dispatch(&report("alice@example.com")).await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(
            dispatcher.transport.sent.lock().unwrap().as_slice(),
            &[(
                "jeeves@example.com".to_string(),
                "alice@example.com".to_string(),
                "Jeeves Reminder for alice@example.com".to_string()
            )]
        );
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_refused_recipient_saves_reminder() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            PlainRenderer,
            FakeTransport::new(Reply::Refuse),
            header(),
            temp_dir.path().to_path_buf(),
        );

        let outcome = dispatcher.dispatch(&report("dave@example.com")).await;

        let expected = temp_dir
            .path()
            .join("reminder_dave@example.com_2024-03-01.html");
        assert_eq!(outcome, DispatchOutcome::Saved(expected.clone()));
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "job-a");
    }

    #[tokio::test]
    async fn test_transport_error_saves_reminder() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            PlainRenderer,
            FakeTransport::new(Reply::Error),
            header(),
            temp_dir.path().to_path_buf(),
        );

        let outcome = dispatcher.dispatch(&report("erin@example.com")).await;

        assert!(matches!(outcome, DispatchOutcome::Saved(path) if path.exists()));
    }

    #[tokio::test]
    async fn test_render_failure_skips_delivery() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            BrokenRenderer,
            FakeTransport::new(Reply::Accept),
            header(),
            temp_dir.path().to_path_buf(),
        );

        let outcome = dispatcher.dispatch(&report("alice@example.com")).await;

        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert!(dispatcher.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_fallback_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocked = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocked, "file in the way").unwrap();

        let dispatcher = Dispatcher::new(
            PlainRenderer,
            FakeTransport::new(Reply::Error),
            header(),
            blocked,
        );

        let outcome = dispatcher.dispatch(&report("alice@example.com")).await;
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    }
}
