use std::fmt;

use chrono::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
    /// Not attempted because the entity did not need it.
    pub skipped: usize,
}

impl Tally {
    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn failure(&mut self) {
        self.failed += 1;
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn merge(&mut self, other: &Tally) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} failed, {} skipped",
            self.succeeded, self.failed, self.skipped
        )
    }
}

///
/// Outcome of one or more pipelines. Pipelines return their own summary and
/// the caller folds them together, so no counter is shared between tasks.
///
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub accounts: Tally,
    pub approvals: Tally,
    pub applications: Tally,
    pub users: Tally,
    pub activations: Tally,
    pub deletions: Tally,
    /// Listed accounts left alone by cleanup because they lack the provenance tag.
    pub untouched: usize,
}

impl RunSummary {
    pub fn merge(&mut self, other: &RunSummary) {
        self.accounts.merge(&other.accounts);
        self.approvals.merge(&other.approvals);
        self.applications.merge(&other.applications);
        self.users.merge(&other.users);
        self.activations.merge(&other.activations);
        self.deletions.merge(&other.deletions);
        self.untouched += other.untouched;
    }

    fn tallies(&self) -> [Tally; 6] {
        [
            self.accounts,
            self.approvals,
            self.applications,
            self.users,
            self.activations,
            self.deletions,
        ]
    }

    /// Operations that were sent, successfully or not.
    pub fn attempted(&self) -> usize {
        self.tallies().iter().map(Tally::total).sum()
    }

    pub fn failures(&self) -> usize {
        self.tallies().iter().map(|tally| tally.failed).sum()
    }
}

impl FromIterator<RunSummary> for RunSummary {
    fn from_iter<I: IntoIterator<Item = RunSummary>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RunSummary::default(), |mut total, summary| {
                total.merge(&summary);
                total
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub command: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn start(command: &'static str) -> Self {
        let now = Utc::now();

        Self {
            run_id: Uuid::new_v4(),
            command,
            started_at: now,
            finished_at: now,
            summary: RunSummary::default(),
        }
    }

    pub fn finish(mut self, summary: RunSummary) -> Self {
        self.finished_at = Utc::now();
        self.summary = summary;
        self
    }

    pub fn log(&self) {
        let elapsed = self.finished_at - self.started_at;
        let summary = &self.summary;

        tracing::info!(
            "Run {} ({}) finished in {} ms: accounts {}, approvals {}, applications {}, users {}, activations {}, deletions {}, untouched {}",
            self.run_id,
            self.command,
            elapsed.num_milliseconds(),
            summary.accounts,
            summary.approvals,
            summary.applications,
            summary.users,
            summary.activations,
            summary.deletions,
            summary.untouched,
        );

        if summary.failures() > 0 {
            tracing::warn!(
                "Run {} ({}) had {} failed operations out of {}",
                self.run_id,
                self.command,
                summary.failures(),
                summary.attempted()
            );
        }

        if let Ok(json) = serde_json::to_string(self) {
            tracing::debug!("{}", json);
        }
    }
}
