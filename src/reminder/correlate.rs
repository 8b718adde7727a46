use log::warn;

use crate::blockers::{BlockerEntry, Blockers, TrackerId};
use crate::providers::RecordLookup;
use crate::report::{Link, LookupOutcome, RecordKind};

/// Bugs, tickets and other blockers attached to one failing job.
///
/// Each list holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub bugs: Vec<Link>,
    pub tickets: Vec<Link>,
    pub other: Vec<Link>,
}

/// Resolves one kind of tracker IDs with a single batch request.
pub async fn lookup_records<L: RecordLookup>(lookup: &L, ids: &[TrackerId]) -> LookupOutcome {
    if ids.is_empty() {
        return LookupOutcome::NotFound;
    }

    match lookup.resolve_many(ids).await {
        Ok(found) => LookupOutcome::from_ids(ids, &found),
        Err(e) => LookupOutcome::LookupError(e.to_string()),
    }
}

/// Collects everything known to block `job_name`.
///
/// The three kinds are looked up independently: a failing defect lookup only
/// replaces the bug list with its placeholder.
pub async fn correlate<D, T>(
    blockers: &Blockers,
    job_name: &str,
    entry: &BlockerEntry,
    defects: &D,
    tickets: &T,
) -> Correlation
where
    D: RecordLookup,
    T: RecordLookup,
{
    let (bugs, found_tickets) = futures::join!(
        lookup_records(defects, &entry.defect_ids),
        lookup_records(tickets, &entry.ticket_ids),
    );
    let other = blockers.other_blockers(job_name);

    Correlation {
        bugs: into_links(job_name, RecordKind::Bug, bugs),
        tickets: into_links(job_name, RecordKind::Ticket, found_tickets),
        other: into_links(job_name, RecordKind::Other, other),
    }
}

fn into_links(job_name: &str, kind: RecordKind, outcome: LookupOutcome) -> Vec<Link> {
    if let LookupOutcome::LookupError(reason) = &outcome {
        warn!("Could not look up {}s for job {job_name}: {reason}", kind.noun());
    }
    outcome.into_links(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{JeevesError, Result};
    use std::cell::Cell;
    use std::collections::HashMap;

    struct StaticLookup {
        records: HashMap<TrackerId, Link>,
        calls: Cell<usize>,
    }

    impl StaticLookup {
        fn new(records: &[(&str, &str)]) -> Self {
            Self {
                records: records
                    .iter()
                    .map(|(id, name)| (TrackerId::from(*id), Link::new(*name, None)))
                    .collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl RecordLookup for StaticLookup {
        async fn resolve_many(&self, ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>> {
            self.calls.set(self.calls.get() + 1);
            Ok(ids
                .iter()
                .filter_map(|id| self.records.get(id).map(|link| (id.clone(), link.clone())))
                .collect())
        }
    }

    struct FailingLookup;

    impl RecordLookup for FailingLookup {
        async fn resolve_many(&self, _ids: &[TrackerId]) -> Result<HashMap<TrackerId, Link>> {
            Err(JeevesError::Config("tracker down".to_string()))
        }
    }

    const BLOCKERS: &str = r#"
job-a:
  owners: [alice@example.com]
  bz: [101, 102]
  jira: [OSP-1]
  other:
    - name: Lab outage
job-b:
  owners: [alice@example.com]
"#;

    #[tokio::test]
    async fn test_lookup_records_empty_ids_skip_request() {
        let lookup = StaticLookup::new(&[("1", "one")]);
        assert_eq!(lookup_records(&lookup, &[]).await, LookupOutcome::NotFound);
        assert_eq!(lookup.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_lookup_records_single_batch() {
        let lookup = StaticLookup::new(&[("1", "one"), ("2", "two")]);
        let ids = vec![TrackerId::from("2"), TrackerId::from("1")];

        let outcome = lookup_records(&lookup, &ids).await;

        assert_eq!(
            outcome,
            LookupOutcome::Found(vec![Link::new("two", None), Link::new("one", None)])
        );
        assert_eq!(lookup.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_lookup_records_error() {
        let outcome = lookup_records(&FailingLookup, &[TrackerId::from("1")]).await;
        assert!(matches!(outcome, LookupOutcome::LookupError(reason) if reason.contains("tracker down")));
    }

    #[tokio::test]
    async fn test_correlate_all_kinds() {
        let blockers = Blockers::from_yaml_str(BLOCKERS).unwrap();
        let entry = blockers.get("job-a").unwrap();
        let defects = StaticLookup::new(&[("101", "Crash on boot"), ("102", "Slow attach")]);
        let tickets = StaticLookup::new(&[("OSP-1", "Rebuild lab")]);

        let correlation = correlate(&blockers, "job-a", entry, &defects, &tickets).await;

        assert_eq!(
            correlation.bugs,
            vec![Link::new("Crash on boot", None), Link::new("Slow attach", None)]
        );
        assert_eq!(correlation.tickets, vec![Link::new("Rebuild lab", None)]);
        assert_eq!(correlation.other, vec![Link::new("Lab outage", None)]);
    }

    #[tokio::test]
    async fn test_bug_failure_does_not_hide_tickets() {
        let blockers = Blockers::from_yaml_str(BLOCKERS).unwrap();
        let entry = blockers.get("job-a").unwrap();
        let tickets = StaticLookup::new(&[("OSP-1", "Rebuild lab")]);

        let correlation = correlate(&blockers, "job-a", entry, &FailingLookup, &tickets).await;

        assert_eq!(correlation.bugs, vec![RecordKind::Bug.placeholder()]);
        assert_eq!(correlation.tickets, vec![Link::new("Rebuild lab", None)]);
        assert_eq!(correlation.other, vec![Link::new("Lab outage", None)]);
    }

    #[tokio::test]
    async fn test_job_without_blockers_gets_placeholders() {
        let blockers = Blockers::from_yaml_str(BLOCKERS).unwrap();
        let entry = blockers.get("job-b").unwrap();
        let lookup = StaticLookup::new(&[]);

        let correlation = correlate(&blockers, "job-b", entry, &lookup, &lookup).await;

        assert_eq!(correlation.bugs, vec![RecordKind::Bug.placeholder()]);
        assert_eq!(correlation.tickets, vec![RecordKind::Ticket.placeholder()]);
        assert_eq!(correlation.other, vec![RecordKind::Other.placeholder()]);
        assert_eq!(lookup.calls.get(), 0);
    }
}
