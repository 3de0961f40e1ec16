use std::sync::Once;
use std::time::Duration;

use docchat_core::{
    update, AppState, Effect, Msg, ProgressTiming, Screen, SessionId, StepState, UploadStatus,
    GENERIC_UPLOAD_ERROR,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docchat_logging::initialize_for_tests);
}

fn select(state: AppState, name: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileSelected {
            name: name.to_string(),
        },
    )
}

fn tick(mut state: AppState, session: SessionId, progress_ticks: usize, step_ticks: usize) -> AppState {
    for _ in 0..progress_ticks {
        state = update(state, Msg::ProgressTick { session }).0;
    }
    for _ in 0..step_ticks {
        state = update(state, Msg::StepTick { session }).0;
    }
    state
}

#[test]
fn select_file_starts_tickers_and_ingest() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), "report.pdf");
    let upload = state.upload();

    assert_eq!(upload.status(), UploadStatus::Uploading);
    assert_eq!(upload.filename(), "report.pdf");
    assert_eq!(upload.progress(), 0);
    assert_eq!(upload.active_step(), 1);
    assert_eq!(
        effects,
        vec![
            Effect::StartTickers {
                session: 1,
                timing: ProgressTiming::default(),
            },
            Effect::Ingest {
                session: 1,
                filename: "report.pdf".to_string(),
            },
        ]
    );
    assert!(state.consume_dirty());
}

#[test]
fn successful_ingest_after_three_seconds_finishes_at_full_progress() {
    init_logging();
    let (state, _) = select(AppState::new(), "report.pdf");
    // 3 s of ticking: 30 progress ticks at 100 ms, 2 step ticks at 1.5 s.
    let state = tick(state, 1, 30, 2);
    assert_eq!(state.upload().progress(), 60);
    assert_eq!(state.upload().active_step(), 3);

    let (state, effects) = update(state, Msg::IngestSucceeded { session: 1 });
    let view = state.view();

    assert_eq!(view.upload.status, UploadStatus::Success);
    assert_eq!(view.upload.progress, 100);
    assert_eq!(view.upload.active_step, 3);
    assert_eq!(view.upload.filename, "report.pdf");
    assert!(view.upload.steps.iter().all(|step| step.state == StepState::Done));
    assert_eq!(
        effects,
        vec![
            Effect::CancelTickers { session: 1 },
            Effect::ScheduleHandoff {
                session: 1,
                delay: Duration::from_millis(1000),
            },
        ]
    );

    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    assert_eq!(state.screen(), Screen::Chat);
    let conversation = state.conversation().expect("conversation started");
    assert_eq!(conversation.filename(), "report.pdf");
    assert!(conversation.messages().is_empty());
}

#[test]
fn fast_ingest_still_forces_final_values() {
    init_logging();
    let (state, _) = select(AppState::new(), "quick.txt");
    let (state, _) = update(state, Msg::IngestSucceeded { session: 1 });

    assert_eq!(state.upload().progress(), 100);
    assert_eq!(state.upload().active_step(), 3);
}

#[test]
fn ticks_after_completion_do_not_mutate() {
    init_logging();
    let (state, _) = select(AppState::new(), "report.pdf");
    let state = tick(state, 1, 5, 1);
    let (state, _) = update(state, Msg::IngestSucceeded { session: 1 });
    let before = state.upload().clone();

    let state = tick(state, 1, 10, 10);
    assert_eq!(state.upload(), &before);

    let (state, _) = select(AppState::new(), "bad.pdf");
    let (state, _) = update(state, Msg::IngestFailed { session: 1, message: None });
    let before = state.upload().clone();
    let state = tick(state, 1, 10, 10);
    assert_eq!(state.upload(), &before);
    assert_eq!(state.upload().status(), UploadStatus::Error);
}

#[test]
fn failed_ingest_reports_message_and_never_hands_off() {
    init_logging();
    let (state, _) = select(AppState::new(), "bad.pdf");
    let state = tick(state, 1, 3, 0);
    let (state, effects) = update(
        state,
        Msg::IngestFailed {
            session: 1,
            message: Some("file too large".to_string()),
        },
    );

    assert_eq!(effects, vec![Effect::CancelTickers { session: 1 }]);
    assert_eq!(state.upload().status(), UploadStatus::Error);
    assert_eq!(state.upload().error_message(), Some("file too large"));

    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    assert_eq!(state.screen(), Screen::Upload);
    assert!(state.conversation().is_none());
}

#[test]
fn failure_without_message_uses_generic_text() {
    let (state, _) = select(AppState::new(), "bad.pdf");
    let (state, _) = update(state, Msg::IngestFailed { session: 1, message: None });

    assert_eq!(state.view().upload.error_message.as_deref(), Some(GENERIC_UPLOAD_ERROR));
}

#[test]
fn select_is_ignored_while_uploading() {
    let (state, _) = select(AppState::new(), "first.pdf");
    let (state, effects) = select(state, "second.pdf");

    assert!(effects.is_empty());
    assert_eq!(state.upload().filename(), "first.pdf");
    assert_eq!(state.upload().session(), 1);
}

#[test]
fn retry_after_error_uses_new_session_and_ignores_stale_events() {
    let (state, _) = select(AppState::new(), "bad.pdf");
    let (state, _) = update(state, Msg::IngestFailed { session: 1, message: None });
    let (state, _) = update(state, Msg::ResetClicked);
    assert_eq!(state.upload().status(), UploadStatus::Idle);
    assert_eq!(state.upload().filename(), "");

    let (state, effects) = select(state, "good.pdf");
    assert_eq!(state.upload().session(), 2);
    assert!(matches!(effects[0], Effect::StartTickers { session: 2, .. }));

    // Events from the first attempt arriving late change nothing.
    let state = tick(state, 1, 3, 3);
    let (state, stale) = update(state, Msg::IngestSucceeded { session: 1 });
    assert!(stale.is_empty());
    assert_eq!(state.upload().status(), UploadStatus::Uploading);
    assert_eq!(state.upload().progress(), 0);
    assert_eq!(state.upload().active_step(), 1);
}

#[test]
fn retry_directly_from_error_is_allowed() {
    let (state, _) = select(AppState::new(), "bad.pdf");
    let (state, _) = update(state, Msg::IngestFailed { session: 1, message: None });
    let (state, effects) = select(state, "bad.pdf");

    assert_eq!(effects.len(), 2);
    assert_eq!(state.upload().status(), UploadStatus::Uploading);
    assert_eq!(state.upload().error_message(), None);
}

#[test]
fn handoff_fires_once() {
    let (state, _) = select(AppState::new(), "report.pdf");
    let (state, _) = update(state, Msg::IngestSucceeded { session: 1 });
    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    let first = state.conversation().map(|c| c.id());

    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    assert_eq!(state.conversation().map(|c| c.id()), first);
    assert_eq!(first, Some(1));
}

#[test]
fn second_success_is_ignored() {
    let (state, _) = select(AppState::new(), "report.pdf");
    let (state, _) = update(state, Msg::IngestSucceeded { session: 1 });
    let (state, effects) = update(state, Msg::IngestSucceeded { session: 1 });
    let (state, failed) = update(state, Msg::IngestFailed { session: 1, message: None });

    assert!(effects.is_empty());
    assert!(failed.is_empty());
    assert_eq!(state.upload().status(), UploadStatus::Success);
}

#[test]
fn step_view_tracks_active_phase() {
    let (state, _) = select(AppState::new(), "report.pdf");
    let state = tick(state, 1, 0, 1);
    let states: Vec<_> = state.view().upload.steps.iter().map(|s| s.state).collect();

    assert_eq!(states, vec![StepState::Done, StepState::Active, StepState::Pending]);
}

#[test]
fn custom_timing_is_forwarded() {
    let timing = ProgressTiming {
        progress_increment: 10,
        handoff_delay: Duration::from_millis(5),
        ..ProgressTiming::default()
    };
    let (state, effects) = select(AppState::with_timing(timing), "a.pdf");
    assert_eq!(effects[0], Effect::StartTickers { session: 1, timing });

    let state = tick(state, 1, 3, 0);
    assert_eq!(state.upload().progress(), 30);
}

#[test]
fn reset_during_success_window_does_not_cancel_handoff() {
    init_logging();
    let (state, _) = select(AppState::new(), "report.pdf");
    let (mut state, _) = update(state, Msg::IngestSucceeded { session: 1 });
    state.consume_dirty();

    let (mut state, effects) = update(state, Msg::ResetClicked);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.upload().status(), UploadStatus::Success);
    assert_eq!(state.upload().progress(), 100);

    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    assert_eq!(state.screen(), Screen::Chat);
    assert_eq!(
        state.conversation().expect("conversation").filename(),
        "report.pdf"
    );
}

#[test]
fn work_in_flight_spans_upload_and_handoff() {
    init_logging();
    assert!(!AppState::new().has_work_in_flight());

    let (state, _) = select(AppState::new(), "report.pdf");
    assert!(state.has_work_in_flight());
    let (state, _) = update(state, Msg::IngestSucceeded { session: 1 });
    assert!(state.has_work_in_flight());
    let (state, _) = update(state, Msg::CompletionDelayElapsed { session: 1 });
    assert!(!state.has_work_in_flight());

    let (state, _) = update(state, Msg::SuggestionClicked("Summarize the key points".into()));
    assert!(state.has_work_in_flight());
    let (state, _) = update(state, Msg::QueryFailed { conversation: 1 });
    assert!(!state.has_work_in_flight());
}

#[test]
fn failed_upload_leaves_no_work_in_flight() {
    let (state, _) = select(AppState::new(), "bad.pdf");
    let (state, _) = update(state, Msg::IngestFailed { session: 1, message: None });
    assert!(!state.has_work_in_flight());
}
