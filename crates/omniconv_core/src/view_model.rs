use crate::history::HistoryEntry;
use crate::options::{ocr_panel_visible, preset_panel_visible, theme_panel_visible, OptionInputs};
use crate::state::{MediaKind, Phase, SessionState};

/// Everything the presentation sink needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    pub uploading: bool,
    pub source_name: Option<String>,
    pub media_kind: Option<MediaKind>,
    /// Presented format list, source extension already excluded.
    pub formats: Vec<String>,
    pub chosen_format: Option<String>,
    pub preset_panel: bool,
    pub ocr_panel: bool,
    pub theme_panel: bool,
    pub options: OptionInputs,
    pub progress: u8,
    pub output_filename: Option<String>,
    pub error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

pub(crate) fn build(state: &SessionState) -> SessionView {
    let awaiting_options = state.phase() == Phase::OptionsPending;
    let chosen = state.chosen_format().unwrap_or_default();
    let inputs = state.option_inputs();

    SessionView {
        phase: state.phase(),
        uploading: state.uploading(),
        source_name: state.source_name().map(str::to_string),
        media_kind: state.media_kind(),
        formats: state.presented_formats(),
        chosen_format: state.chosen_format().map(str::to_string),
        preset_panel: awaiting_options && preset_panel_visible(state.media_kind(), chosen),
        ocr_panel: awaiting_options && ocr_panel_visible(chosen),
        theme_panel: awaiting_options && theme_panel_visible(chosen, &inputs.ocr_engine),
        options: inputs.clone(),
        progress: state.progress(),
        output_filename: state.output_filename().map(str::to_string),
        error: state.error().map(str::to_string),
        history: state.history().to_vec(),
    }
}

/// Human status line for a progress percentage.
pub fn status_message(progress: u8) -> &'static str {
    if progress < 15 {
        "Preparing file..."
    } else if progress < 40 {
        "Processing..."
    } else if progress < 70 {
        "Converting..."
    } else if progress < 90 {
        "Finalizing..."
    } else if progress < 100 {
        "Almost done..."
    } else {
        "Complete!"
    }
}
