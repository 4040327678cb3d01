use url::Url;

use crate::history::HistoryEntry;
use crate::msg::{JobUpdate, Msg, UpdateBody};
use crate::options::{capture_options, requires_confirmation};
use crate::state::{MediaKind, Phase, SessionState, MAX_UPLOAD_BYTES};
use crate::Effect;

/// UI-settle delay between a no-options format selection and the start of
/// the conversion. Cosmetic only; a reset during the delay cancels the start
/// via the epoch check.
pub const START_SETTLE_MS: u64 = 300;

/// Pure update function: applies a message to the session and returns any
/// effects for the platform to execute.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilePicked { path, size_bytes } => {
            // A new upload replaces whatever session was active.
            let mut effects = reset_session(&mut state);
            if size_bytes > MAX_UPLOAD_BYTES {
                state.set_error("File is too large. Maximum size is 500 MB.");
            } else {
                state.set_uploading(true);
                effects.push(Effect::UploadFile { path });
            }
            state.mark_dirty();
            effects
        }
        Msg::UrlSubmitted(url) => {
            let mut effects = reset_session(&mut state);
            if is_fetchable_url(&url) {
                state.set_uploading(true);
                effects.push(Effect::UploadUrl { url });
            } else {
                state.set_error("Enter a valid http(s) URL.");
            }
            state.mark_dirty();
            effects
        }
        Msg::UploadFinished(result) => {
            if !state.uploading() {
                // A reset happened while the request was in flight.
                return (state, Vec::new());
            }
            match result {
                Ok(staged) => state.stage(staged),
                Err(message) => {
                    state.set_uploading(false);
                    state.set_error(message);
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::FormatSelected(format) => {
            if !matches!(
                state.phase(),
                Phase::FileStaged | Phase::FormatChosen | Phase::OptionsPending
            ) {
                return (state, Vec::new());
            }
            if !state.presented_formats().contains(&format) {
                return (state, Vec::new());
            }
            let needs_panel = requires_confirmation(state.media_kind(), &format);
            state.choose_format(format);
            state.clear_error();
            let effects = if needs_panel {
                state.set_phase(Phase::OptionsPending);
                Vec::new()
            } else {
                state.set_phase(Phase::FormatChosen);
                vec![Effect::ScheduleStart {
                    epoch: state.epoch(),
                    delay_ms: START_SETTLE_MS,
                }]
            };
            state.mark_dirty();
            effects
        }
        Msg::PresetChanged(preset) => {
            state.option_inputs_mut().preset = preset;
            state.mark_dirty();
            Vec::new()
        }
        Msg::OcrEngineChanged(engine) => {
            state.option_inputs_mut().ocr_engine = engine;
            state.mark_dirty();
            Vec::new()
        }
        Msg::OcrThemeChanged(theme) => {
            state.option_inputs_mut().ocr_theme = theme;
            state.mark_dirty();
            Vec::new()
        }
        Msg::LengthLimitToggled(checked) => {
            state.option_inputs_mut().limit_length = checked;
            state.mark_dirty();
            Vec::new()
        }
        Msg::LengthLimitChanged(px) => {
            state.option_inputs_mut().max_length_px = px;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AiToggled(enabled) => {
            state.option_inputs_mut().ai_enhanced = enabled;
            state.mark_dirty();
            Vec::new()
        }
        Msg::OptionsConfirmed => {
            if state.phase() != Phase::OptionsPending {
                return (state, Vec::new());
            }
            try_start(&mut state)
        }
        Msg::StartDelayElapsed { epoch } => {
            if epoch != state.epoch() || state.phase() != Phase::FormatChosen {
                return (state, Vec::new());
            }
            try_start(&mut state)
        }
        Msg::ConvertStarted(result) => {
            if state.phase() != Phase::Converting || !state.converting() {
                return (state, Vec::new());
            }
            match result {
                Ok(job_id) => {
                    state.record_job(job_id.clone());
                    vec![Effect::WatchJob { job_id }]
                }
                Err(message) => {
                    state.fail(message);
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::JobUpdate { update, at_ms } => apply_job_update(&mut state, update, at_ms),
        Msg::ResetRequested => {
            let effects = reset_session(&mut state);
            state.mark_dirty();
            effects
        }
        Msg::HistoryRestored(entries) => {
            state.restore_history(entries);
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Guarded entry into `Converting`. The `converting` flag flips before any
/// asynchronous call is issued, so a rapid double-activation is a no-op.
fn try_start(state: &mut SessionState) -> Vec<Effect> {
    if state.converting() {
        return Vec::new();
    }
    let (Some(file_id), Some(format)) = (
        state.file_id().map(str::to_string),
        state.chosen_format().map(str::to_string),
    ) else {
        return Vec::new();
    };

    let options = capture_options(state.media_kind(), &format, state.option_inputs());
    state.begin_converting();
    state.mark_dirty();
    vec![Effect::StartConversion {
        file_id,
        output_format: format,
        options,
    }]
}

/// Applies a poll/push update. An update whose job id does not match the
/// session's current job is discarded with no observable change.
fn apply_job_update(state: &mut SessionState, update: JobUpdate, at_ms: u64) -> Vec<Effect> {
    if state.job_id() != Some(update.job_id.as_str()) {
        return Vec::new();
    }
    if state.phase() != Phase::Converting {
        return Vec::new();
    }

    match update.body {
        UpdateBody::Progress { percent } => {
            state.apply_progress(percent);
            state.mark_dirty();
            Vec::new()
        }
        UpdateBody::Completed { filename } => {
            let entry = HistoryEntry::from_completion(
                state.source_name().unwrap_or("Unknown"),
                state.media_kind().unwrap_or(MediaKind::Document),
                &filename,
                at_ms,
            );
            state.complete(filename, entry);
            state.mark_dirty();
            vec![Effect::StopWatch, Effect::PersistHistory]
        }
        UpdateBody::Failed { error } => {
            state.fail(error);
            state.mark_dirty();
            vec![Effect::StopWatch]
        }
    }
}

fn reset_session(state: &mut SessionState) -> Vec<Effect> {
    let watching = state.job_id().is_some();
    state.reset();
    if watching {
        vec![Effect::StopWatch]
    } else {
        Vec::new()
    }
}

fn is_fetchable_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
