use crate::{CatalogEntry, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch, convert and write one catalog entry.
    Process { job_id: JobId, entry: CatalogEntry },
    /// Politeness delay toward the source platform before the next item.
    Pause,
    /// No further items will be started.
    Finished { policy: StopPolicy },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Every catalog entry was attempted.
    Exhausted,
    /// A stop request cut the batch short between items.
    Interrupted,
}
