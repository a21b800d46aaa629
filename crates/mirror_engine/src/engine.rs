use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use mirror_core::{update, BatchState, BatchViewModel, Catalog, Effect, JobResultKind, Msg, StopPolicy};
use mirror_logging::{mirror_error, mirror_info};
use tokio_util::sync::CancellationToken;

use crate::fetch::{pick_delay, ChannelProgressSink};
use crate::pipeline::{ArticleOutcome, ArticlePipeline};
use crate::{EngineEvent, JobProgress};

/// Download figures folded from one job's progress events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FetchTally {
    attempts: u32,
    bytes: u64,
}

impl FetchTally {
    fn record(&mut self, progress: &JobProgress) {
        if let Some(attempt) = progress.attempt {
            self.attempts = self.attempts.max(attempt);
        }
        if let Some(bytes) = progress.bytes {
            self.bytes = self.bytes.max(bytes);
        }
    }
}

impl fmt::Display for FetchTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, {} attempt(s)", self.bytes, self.attempts.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub view: BatchViewModel,
    pub outcomes: Vec<ArticleOutcome>,
    pub stop: StopPolicy,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.view.failed == 0 && self.stop == StopPolicy::Exhausted
    }
}

/// Executes the effects of the batch state machine, one article at a time.
///
/// Cancellation is honoured between items only: it cuts a politeness pause
/// short but never interrupts the article in flight.
pub struct BatchRunner {
    pipeline: ArticlePipeline,
    pause_delays: Vec<Duration>,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(pipeline: ArticlePipeline, pause_delays: Vec<Duration>, cancel: CancellationToken) -> Self {
        Self {
            pipeline,
            pause_delays,
            cancel,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, catalog: Catalog) -> BatchReport {
        let total = catalog.entries.len();
        let (mut state, _) = update(BatchState::new(), Msg::CatalogLoaded(catalog.entries));
        let first = if self.cancel.is_cancelled() {
            Msg::StopRequested
        } else {
            Msg::Start
        };
        let (next, effects) = update(state, first);
        state = next;

        let mut queue: VecDeque<Effect> = effects.into();
        let mut outcomes = Vec::new();
        let mut stop = StopPolicy::Interrupted;

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::Process { job_id, entry } => {
                    mirror_info!("[{}/{}] {}", job_id, total, entry.url);
                    let (event_tx, event_rx) = mpsc::channel();
                    let sink = ChannelProgressSink::new(event_tx);
                    let result = self.pipeline.process(job_id, &entry, &sink).await;
                    drop(sink);

                    let mut tally = FetchTally::default();
                    for EngineEvent::Progress(progress) in event_rx.try_iter() {
                        tally.record(&progress);
                        let (next, _) = update(
                            state,
                            Msg::JobProgress {
                                job_id: progress.job_id,
                                stage: progress.stage,
                            },
                        );
                        state = next;
                    }

                    if self.cancel.is_cancelled() {
                        let (next, effects) = update(state, Msg::StopRequested);
                        state = next;
                        queue.extend(effects);
                    }

                    let result = match result {
                        Ok(outcome) => {
                            mirror_info!(
                                "Done: {} -> {} ({})",
                                outcome.slug,
                                outcome.index_path.display(),
                                tally
                            );
                            outcomes.push(outcome);
                            JobResultKind::Success
                        }
                        Err(err) => {
                            mirror_error!("Failed: {} ({}): {}", entry.url, tally, err);
                            JobResultKind::Failed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    Msg::JobDone { job_id, result }
                }
                Effect::Pause => {
                    let delay = pick_delay(&self.pause_delays);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => Msg::PauseElapsed,
                        _ = self.cancel.cancelled() => {
                            mirror_info!("stop requested; not starting further articles");
                            Msg::StopRequested
                        }
                    }
                }
                Effect::Finished { policy } => {
                    stop = policy;
                    continue;
                }
            };

            let (next, effects) = update(state, msg);
            state = next;
            queue.extend(effects);
        }

        let view = state.view();
        mirror_info!(
            "batch finished ({:?}): {} succeeded, {} failed, {} skipped",
            stop,
            view.succeeded,
            view.failed,
            view.skipped()
        );
        BatchReport {
            view,
            outcomes,
            stop,
        }
    }
}
