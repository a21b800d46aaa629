use crate::{JobId, JobResultKind, SessionState, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchViewModel {
    pub session: SessionState,
    pub job_count: usize,
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub jobs: Vec<JobRowView>,
}

impl BatchViewModel {
    /// Jobs never started because the batch was stopped early.
    pub fn skipped(&self) -> usize {
        self.job_count.saturating_sub(self.succeeded + self.failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub url: String,
    pub stage: Stage,
    pub outcome: Option<JobResultKind>,
}
