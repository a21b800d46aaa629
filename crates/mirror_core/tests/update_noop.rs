use mirror_core::{update, BatchState, CatalogEntry, Msg};

#[test]
fn update_is_noop() {
    let state = BatchState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn progress_for_unknown_job_changes_nothing() {
    let (state, _) = update(
        BatchState::new(),
        Msg::CatalogLoaded(vec![CatalogEntry::new("https://a.example/p/1")]),
    );
    let before = state.view().jobs;
    let (next, effects) = update(
        state,
        Msg::JobProgress {
            job_id: 99,
            stage: mirror_core::Stage::Writing,
        },
    );

    assert_eq!(next.view().jobs, before);
    assert!(effects.is_empty());
}
