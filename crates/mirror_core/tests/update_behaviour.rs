use std::sync::Once;

use mirror_core::{
    update, BatchState, CatalogEntry, Effect, JobResultKind, Msg, SessionState, StopPolicy,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(mirror_logging::initialize_for_tests);
}

fn loaded(urls: &[&str]) -> BatchState {
    let entries = urls.iter().map(|url| CatalogEntry::new(*url)).collect();
    let (state, effects) = update(BatchState::new(), Msg::CatalogLoaded(entries));
    assert!(effects.is_empty());
    state
}

fn done(state: BatchState, job_id: u64) -> (BatchState, Vec<Effect>) {
    update(
        state,
        Msg::JobDone {
            job_id,
            result: JobResultKind::Success,
        },
    )
}

#[test]
fn start_processes_first_entry_without_pause() {
    init_logging();
    let state = loaded(&["https://a.example/p/1", "https://a.example/p/2"]);

    let (state, effects) = update(state, Msg::Start);

    assert_eq!(state.session(), SessionState::Running);
    assert_eq!(
        effects,
        vec![Effect::Process {
            job_id: 1,
            entry: CatalogEntry::new("https://a.example/p/1"),
        }]
    );
}

#[test]
fn items_run_in_catalog_order_separated_by_pauses() {
    init_logging();
    let state = loaded(&["https://a.example/p/1", "https://a.example/p/2"]);
    let (state, _) = update(state, Msg::Start);

    let (state, effects) = done(state, 1);
    assert_eq!(effects, vec![Effect::Pause]);
    assert_eq!(state.in_flight(), None);

    let (state, effects) = update(state, Msg::PauseElapsed);
    assert_eq!(
        effects,
        vec![Effect::Process {
            job_id: 2,
            entry: CatalogEntry::new("https://a.example/p/2"),
        }]
    );

    let (state, effects) = done(state, 2);
    assert_eq!(
        effects,
        vec![Effect::Finished {
            policy: StopPolicy::Exhausted
        }]
    );
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn stop_waits_for_in_flight_item() {
    init_logging();
    let state = loaded(&["https://a.example/p/1", "https://a.example/p/2"]);
    let (state, _) = update(state, Msg::Start);

    let (state, effects) = update(state, Msg::StopRequested);
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Finishing);

    let (state, effects) = done(state, 1);
    assert_eq!(
        effects,
        vec![Effect::Finished {
            policy: StopPolicy::Interrupted
        }]
    );
    let view = state.view();
    assert_eq!(view.succeeded, 1);
    assert_eq!(view.skipped(), 1);
}

#[test]
fn stop_during_pause_finishes_immediately() {
    init_logging();
    let state = loaded(&["https://a.example/p/1", "https://a.example/p/2"]);
    let (state, _) = update(state, Msg::Start);
    let (state, _) = done(state, 1);

    let (state, effects) = update(state, Msg::StopRequested);
    assert_eq!(
        effects,
        vec![Effect::Finished {
            policy: StopPolicy::Interrupted
        }]
    );

    // A pause elapsing after the stop must not start another item.
    let (_state, effects) = update(state, Msg::PauseElapsed);
    assert!(effects.is_empty());
}

#[test]
fn stop_on_last_item_reports_exhausted() {
    init_logging();
    let state = loaded(&["https://a.example/p/1"]);
    let (state, _) = update(state, Msg::Start);
    let (state, _) = update(state, Msg::StopRequested);

    let (_state, effects) = done(state, 1);
    assert_eq!(
        effects,
        vec![Effect::Finished {
            policy: StopPolicy::Exhausted
        }]
    );
}

#[test]
fn empty_catalog_finishes_on_start() {
    init_logging();
    let (state, effects) = update(BatchState::new(), Msg::Start);

    assert_eq!(state.session(), SessionState::Finished);
    assert_eq!(
        effects,
        vec![Effect::Finished {
            policy: StopPolicy::Exhausted
        }]
    );
}

#[test]
fn catalog_is_ignored_once_running() {
    init_logging();
    let state = loaded(&["https://a.example/p/1"]);
    let (state, _) = update(state, Msg::Start);

    let (state, effects) = update(
        state,
        Msg::CatalogLoaded(vec![CatalogEntry::new("https://b.example/p/9")]),
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().job_count, 1);
    assert_eq!(state.view().jobs[0].url, "https://a.example/p/1");

    let (_state, effects) = update(state, Msg::Start);
    assert!(effects.is_empty());
}
