#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Replace the pending queue with catalog entries (only while idle).
    CatalogLoaded(Vec<crate::CatalogEntry>),
    /// Begin processing the queue.
    Start,
    /// Engine progress for a job.
    JobProgress {
        job_id: crate::JobId,
        stage: crate::Stage,
    },
    /// Engine completion for a job.
    JobDone {
        job_id: crate::JobId,
        result: crate::JobResultKind,
    },
    /// The politeness delay before the next item has elapsed.
    PauseElapsed,
    /// Stop before the next item; the one in flight still completes.
    StopRequested,
    NoOp,
}
