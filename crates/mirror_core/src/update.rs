use crate::{BatchState, Effect, Msg, SessionState, StopPolicy};

/// Pure update function: applies a message to state and returns any effects.
///
/// Items run one at a time. A [`Effect::Pause`] separates consecutive items and
/// a stop request only takes effect between items.
pub fn update(mut state: BatchState, msg: Msg) -> (BatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::CatalogLoaded(entries) => {
            if state.session() == SessionState::Idle {
                state.load_catalog(entries);
            }
            Vec::new()
        }
        Msg::Start => {
            if state.session() == SessionState::Idle {
                state.start_session();
                vec![start_next_or_finish(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::JobProgress { job_id, stage } => {
            state.apply_progress(job_id, stage);
            Vec::new()
        }
        Msg::JobDone { job_id, result } => {
            if !state.apply_done(job_id, result) {
                return (state, Vec::new());
            }
            match state.session() {
                SessionState::Running if state.has_pending() => vec![Effect::Pause],
                SessionState::Running => {
                    state.finish_session();
                    vec![Effect::Finished {
                        policy: StopPolicy::Exhausted,
                    }]
                }
                SessionState::Finishing => {
                    let policy = if state.has_pending() {
                        StopPolicy::Interrupted
                    } else {
                        StopPolicy::Exhausted
                    };
                    state.finish_session();
                    vec![Effect::Finished { policy }]
                }
                SessionState::Idle | SessionState::Finished => Vec::new(),
            }
        }
        Msg::PauseElapsed => {
            if state.session() == SessionState::Running && state.in_flight().is_none() {
                vec![start_next_or_finish(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::StopRequested => match state.session() {
            SessionState::Running if state.in_flight().is_some() => {
                state.request_stop();
                Vec::new()
            }
            SessionState::Running | SessionState::Idle => {
                state.finish_session();
                vec![Effect::Finished {
                    policy: StopPolicy::Interrupted,
                }]
            }
            SessionState::Finishing | SessionState::Finished => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_next_or_finish(state: &mut BatchState) -> Effect {
    match state.start_next_job() {
        Some((job_id, entry)) => Effect::Process { job_id, entry },
        None => {
            state.finish_session();
            Effect::Finished {
                policy: StopPolicy::Exhausted,
            }
        }
    }
}
