use std::sync::Once;

use omniconv_core::{
    update, Effect, JobUpdate, MediaKind, Msg, Phase, SessionState, StagedFile, UpdateBody,
    START_SETTLE_MS,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(conv_logging::initialize_for_tests);
}

fn staged_video() -> StagedFile {
    StagedFile {
        file_id: "f-9".to_string(),
        media_kind: MediaKind::Video,
        source_name: "clip.avi".to_string(),
        output_formats: vec![
            "mp4".to_string(),
            "webm".to_string(),
            "avi".to_string(),
            "gif".to_string(),
        ],
    }
}

fn staged_image() -> StagedFile {
    StagedFile {
        file_id: "f-3".to_string(),
        media_kind: MediaKind::Image,
        source_name: "photo.png".to_string(),
        output_formats: vec!["jpg".to_string(), "webp".to_string()],
    }
}

fn stage(state: SessionState, staged: StagedFile) -> SessionState {
    let path = format!("/tmp/{}", staged.source_name);
    let (state, _) = update(
        state,
        Msg::FilePicked {
            path,
            size_bytes: 1024,
        },
    );
    let (state, _) = update(state, Msg::UploadFinished(Ok(staged)));
    state
}

fn start_video_conversion(state: SessionState) -> (SessionState, Vec<Effect>) {
    let state = stage(state, staged_video());
    let (state, _) = update(state, Msg::FormatSelected("mp4".to_string()));
    update(state, Msg::OptionsConfirmed)
}

fn running_job(job_id: &str) -> SessionState {
    let (state, _) = start_video_conversion(SessionState::new());
    let (state, _) = update(state, Msg::ConvertStarted(Ok(job_id.to_string())));
    state
}

#[test]
fn video_format_opens_options_panel() {
    init_logging();
    let state = stage(SessionState::new(), staged_video());
    let (mut state, effects) = update(state, Msg::FormatSelected("mp4".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::OptionsPending);
    let view = state.view();
    assert!(view.preset_panel);
    assert!(!view.ocr_panel);
    assert!(state.consume_dirty());
}

#[test]
fn plain_format_schedules_a_delayed_start() {
    init_logging();
    let state = stage(SessionState::new(), staged_image());
    let (state, effects) = update(state, Msg::FormatSelected("webp".to_string()));

    assert_eq!(state.phase(), Phase::FormatChosen);
    assert_eq!(
        effects,
        vec![Effect::ScheduleStart {
            epoch: state.epoch(),
            delay_ms: START_SETTLE_MS,
        }]
    );

    let epoch = state.epoch();
    let (state, effects) = update(state, Msg::StartDelayElapsed { epoch });
    assert_eq!(state.phase(), Phase::Converting);
    assert!(matches!(
        effects.as_slice(),
        [Effect::StartConversion { output_format, .. }] if output_format == "webp"
    ));
}

#[test]
fn delayed_start_is_inert_after_reset() {
    init_logging();
    let state = stage(SessionState::new(), staged_image());
    let (state, _) = update(state, Msg::FormatSelected("webp".to_string()));
    let stale_epoch = state.epoch();

    let (state, _) = update(state, Msg::ResetRequested);
    let (state, effects) = update(state, Msg::StartDelayElapsed { epoch: stale_epoch });

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert!(!state.converting());
}

#[test]
fn confirming_options_captures_the_preset() {
    init_logging();
    let (state, effects) = start_video_conversion(SessionState::new());

    assert_eq!(state.phase(), Phase::Converting);
    assert!(state.converting());
    match effects.as_slice() {
        [Effect::StartConversion {
            file_id,
            output_format,
            options,
        }] => {
            assert_eq!(file_id, "f-9");
            assert_eq!(output_format, "mp4");
            assert_eq!(options.preset.as_deref(), Some("fast"));
            assert_eq!(options.ocr_engine, None);
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn duplicate_start_is_a_silent_noop() {
    init_logging();
    let (state, _) = start_video_conversion(SessionState::new());
    let (mut state, _) = update(state, Msg::ConvertStarted(Ok("job-A".to_string())));
    state.consume_dirty();

    let (mut state, effects) = update(state, Msg::OptionsConfirmed);

    assert!(effects.is_empty());
    assert_eq!(state.job_id(), Some("job-A"));
    assert_eq!(state.phase(), Phase::Converting);
    assert!(!state.consume_dirty());
}

#[test]
fn convert_start_failure_fails_the_session() {
    init_logging();
    let (state, _) = start_video_conversion(SessionState::new());
    let (state, effects) = update(
        state,
        Msg::ConvertStarted(Err("Conversion failed to start".to_string())),
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Failed);
    assert!(!state.converting());
    assert_eq!(
        state.view().error.as_deref(),
        Some("Conversion failed to start")
    );
}

#[test]
fn job_start_begins_watching() {
    init_logging();
    let (state, _) = start_video_conversion(SessionState::new());
    let (state, effects) = update(state, Msg::ConvertStarted(Ok("job-A".to_string())));

    assert_eq!(
        effects,
        vec![Effect::WatchJob {
            job_id: "job-A".to_string(),
        }]
    );
    assert_eq!(state.job_id(), Some("job-A"));
}

#[test]
fn mismatched_job_update_produces_no_observable_change() {
    init_logging();
    let state = running_job("A");
    let (mut state, _) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Progress { percent: 40 },
            },
            at_ms: 0,
        },
    );
    assert_eq!(state.view().progress, 40);
    assert!(state.consume_dirty());

    let before = state.clone();
    let (mut state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "B".to_string(),
                body: UpdateBody::Progress { percent: 10 },
            },
            at_ms: 0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().progress, 40);
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}

#[test]
fn stale_terminal_update_is_discarded() {
    init_logging();
    let state = running_job("A");
    let (state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "old".to_string(),
                body: UpdateBody::Completed {
                    filename: "out.mp4".to_string(),
                },
            },
            at_ms: 0,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Converting);
    assert!(state.view().history.is_empty());
}

#[test]
fn completion_appends_history_and_stops_watching() {
    init_logging();
    let state = running_job("A");
    let (state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Completed {
                    filename: "out.mp4".to_string(),
                },
            },
            at_ms: 1_700_000_000_000,
        },
    );

    assert_eq!(effects, vec![Effect::StopWatch, Effect::PersistHistory]);
    assert_eq!(state.phase(), Phase::Done);
    assert!(!state.converting());
    let view = state.view();
    assert_eq!(view.output_filename.as_deref(), Some("out.mp4"));
    assert_eq!(view.progress, 100);

    let entry = &view.history[0];
    assert_eq!(entry.input_name, "clip.avi");
    assert_eq!(entry.input_format, "AVI");
    assert_eq!(entry.output_format, "MP4");
    assert_eq!(entry.kind, MediaKind::Video);
    assert_eq!(entry.timestamp_ms, 1_700_000_000_000);
}

#[test]
fn job_failure_carries_service_error() {
    init_logging();
    let state = running_job("A");
    let (state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Failed {
                    error: "ffmpeg exited with code 1".to_string(),
                },
            },
            at_ms: 0,
        },
    );

    assert_eq!(effects, vec![Effect::StopWatch]);
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        state.view().error.as_deref(),
        Some("ffmpeg exited with code 1")
    );
    assert!(state.view().history.is_empty());
}

#[test]
fn reset_while_watching_stops_the_watch() {
    init_logging();
    let state = running_job("A");
    let (state, effects) = update(state, Msg::ResetRequested);

    assert_eq!(effects, vec![Effect::StopWatch]);
    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.job_id().is_none());

    // Late events for the old job are inert afterwards.
    let (state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Progress { percent: 90 },
            },
            at_ms: 0,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().progress, 0);
}

#[test]
fn updates_after_completion_are_ignored() {
    init_logging();
    let state = running_job("A");
    let (state, _) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Completed {
                    filename: "out.mp4".to_string(),
                },
            },
            at_ms: 1,
        },
    );

    // A straggler progress update for the same job changes nothing.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::JobUpdate {
            update: JobUpdate {
                job_id: "A".to_string(),
                body: UpdateBody::Progress { percent: 50 },
            },
            at_ms: 2,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}
