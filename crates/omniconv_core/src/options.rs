use crate::state::MediaKind;

/// Output formats whose video conversions expose the preset control.
pub const VIDEO_PRESET_TARGETS: &[&str] = &["mp4", "webm", "avi", "mkv", "mov"];

/// Preset values offered by the video options panel.
pub const VIDEO_PRESETS: &[&str] = &["ultrafast", "fast", "medium", "slow"];

/// Output formats that go through the OCR pipeline.
pub const OCR_TARGETS: &[&str] = &["txt", "md", "docx", "html"];

/// OCR engines offered by the options panel.
pub const OCR_ENGINES: &[&str] = &["tesseract", "paddle"];

/// Theme values for HTML-family OCR output.
pub const OCR_THEMES: &[&str] = &["light", "dark"];

// Targets for which the theme sub-panel can appear, and the engines that
// support themed output.
const HTML_FAMILY_TARGETS: &[&str] = &["html"];
const THEMED_ENGINES: &[&str] = &["paddle"];

/// Current values of every option control. Values persist while a control is
/// hidden; only visible controls are read at conversion-start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInputs {
    pub preset: String,
    pub ocr_engine: String,
    pub ocr_theme: String,
    pub limit_length: bool,
    pub max_length_px: u32,
    pub ai_enhanced: bool,
}

impl Default for OptionInputs {
    fn default() -> Self {
        Self {
            preset: "fast".to_string(),
            ocr_engine: "tesseract".to_string(),
            ocr_theme: "light".to_string(),
            limit_length: false,
            max_length_px: 800,
            ai_enhanced: false,
        }
    }
}

/// Options payload for the start-conversion call. Sparse: a `None` field is
/// absent from the serialized request, never null-padded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub preset: Option<String>,
    pub ocr_engine: Option<String>,
    pub ocr_theme: Option<String>,
    pub limit_css_length: Option<bool>,
    pub css_max_length: Option<u32>,
    pub ai_enhanced: Option<bool>,
}

/// Whether the video preset panel is relevant for this selection.
pub fn preset_panel_visible(kind: Option<MediaKind>, format: &str) -> bool {
    kind == Some(MediaKind::Video) && contains_ignore_case(VIDEO_PRESET_TARGETS, format)
}

/// Whether the OCR panel is relevant for this selection.
pub fn ocr_panel_visible(format: &str) -> bool {
    contains_ignore_case(OCR_TARGETS, format)
}

/// Whether the theme sub-panel is relevant: only for themed engines
/// producing an HTML-family target.
pub fn theme_panel_visible(format: &str, engine: &str) -> bool {
    ocr_panel_visible(format)
        && contains_ignore_case(HTML_FAMILY_TARGETS, format)
        && contains_ignore_case(THEMED_ENGINES, engine)
}

/// Whether the selection needs an options panel and an explicit "start"
/// confirmation before converting.
pub fn requires_confirmation(kind: Option<MediaKind>, format: &str) -> bool {
    preset_panel_visible(kind, format) || ocr_panel_visible(format)
}

/// Reads the currently relevant controls into a sparse payload. A hidden
/// control's value is never included, even if previously set.
pub fn capture_options(
    kind: Option<MediaKind>,
    format: &str,
    inputs: &OptionInputs,
) -> ConvertOptions {
    let mut options = ConvertOptions::default();

    if preset_panel_visible(kind, format) {
        options.preset = Some(inputs.preset.clone());
    }

    if ocr_panel_visible(format) {
        options.ocr_engine = Some(inputs.ocr_engine.clone());
        if theme_panel_visible(format, &inputs.ocr_engine) {
            options.ocr_theme = Some(inputs.ocr_theme.clone());
        }
        if inputs.limit_length {
            options.limit_css_length = Some(true);
            options.css_max_length = Some(inputs.max_length_px);
        }
    }

    if inputs.ai_enhanced {
        options.ai_enhanced = Some(true);
    }

    options
}

fn contains_ignore_case(tokens: &[&str], candidate: &str) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(candidate))
}
