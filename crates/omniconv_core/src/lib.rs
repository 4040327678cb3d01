//! OmniConv core: pure conversion-session state machine and view-model helpers.
mod effect;
mod formats;
mod history;
mod msg;
mod options;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use formats::{filter_formats, source_extension};
pub use history::{HistoryEntry, MAX_HISTORY};
pub use msg::{JobUpdate, Msg, UpdateBody};
pub use options::{
    capture_options, ocr_panel_visible, preset_panel_visible, requires_confirmation,
    theme_panel_visible, ConvertOptions, OptionInputs, OCR_ENGINES, OCR_TARGETS, OCR_THEMES,
    VIDEO_PRESETS, VIDEO_PRESET_TARGETS,
};
pub use state::{MediaKind, Phase, SessionState, StagedFile, MAX_UPLOAD_BYTES};
pub use update::{update, START_SETTLE_MS};
pub use view_model::{status_message, SessionView};
