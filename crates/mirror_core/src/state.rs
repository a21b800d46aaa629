use std::collections::{BTreeMap, VecDeque};

use crate::view_model::{BatchViewModel, JobRowView};
use crate::CatalogEntry;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Stop requested; waiting for the in-flight item.
    Finishing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Fetching,
    Converting,
    Writing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResultKind {
    Success,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
    entry: CatalogEntry,
    stage: Stage,
    outcome: Option<JobResultKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchState {
    session: SessionState,
    jobs: BTreeMap<JobId, Job>,
    pending: VecDeque<JobId>,
    in_flight: Option<JobId>,
    next_job_id: JobId,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn in_flight(&self) -> Option<JobId> {
        self.in_flight
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn view(&self) -> BatchViewModel {
        let jobs: Vec<JobRowView> = self
            .jobs
            .iter()
            .map(|(job_id, job)| JobRowView {
                job_id: *job_id,
                url: job.entry.url.clone(),
                stage: job.stage,
                outcome: job.outcome.clone(),
            })
            .collect();
        let succeeded = jobs
            .iter()
            .filter(|job| job.outcome == Some(JobResultKind::Success))
            .count();
        let failed = jobs
            .iter()
            .filter(|job| matches!(job.outcome, Some(JobResultKind::Failed { .. })))
            .count();

        BatchViewModel {
            session: self.session,
            job_count: jobs.len(),
            pending: self.pending.len(),
            succeeded,
            failed,
            jobs,
        }
    }

    pub(crate) fn load_catalog(&mut self, entries: Vec<CatalogEntry>) {
        self.jobs.clear();
        self.pending.clear();
        for entry in entries {
            self.next_job_id += 1;
            let job_id = self.next_job_id;
            self.jobs.insert(
                job_id,
                Job {
                    entry,
                    stage: Stage::Queued,
                    outcome: None,
                },
            );
            self.pending.push_back(job_id);
        }
    }

    pub(crate) fn start_session(&mut self) {
        self.session = SessionState::Running;
    }

    pub(crate) fn request_stop(&mut self) {
        self.session = SessionState::Finishing;
    }

    pub(crate) fn finish_session(&mut self) {
        self.session = SessionState::Finished;
    }

    /// Pop the next queued job and mark it in flight.
    pub(crate) fn start_next_job(&mut self) -> Option<(JobId, CatalogEntry)> {
        let job_id = self.pending.pop_front()?;
        let job = self.jobs.get(&job_id)?;
        self.in_flight = Some(job_id);
        Some((job_id, job.entry.clone()))
    }

    pub(crate) fn apply_progress(&mut self, job_id: JobId, stage: Stage) {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            if job.outcome.is_none() {
                job.stage = stage;
            }
        }
    }

    /// Record the outcome of the in-flight job. Returns false for stale ids.
    pub(crate) fn apply_done(&mut self, job_id: JobId, result: JobResultKind) -> bool {
        if self.in_flight != Some(job_id) {
            return false;
        }
        self.in_flight = None;
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.stage = Stage::Done;
            job.outcome = Some(result);
        }
        true
    }
}
