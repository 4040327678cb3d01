use omniconv_core::{
    update, Effect, MediaKind, Msg, Phase, SessionState, StagedFile,
};

fn staged_document() -> StagedFile {
    StagedFile {
        file_id: "f-7".to_string(),
        media_kind: MediaKind::Document,
        source_name: "scan.pdf".to_string(),
        output_formats: vec![
            "docx".to_string(),
            "html".to_string(),
            "md".to_string(),
            "txt".to_string(),
        ],
    }
}

fn stage(staged: StagedFile) -> SessionState {
    let (state, _) = update(
        SessionState::new(),
        Msg::FilePicked {
            path: "/tmp/scan.pdf".to_string(),
            size_bytes: 4096,
        },
    );
    let (state, _) = update(state, Msg::UploadFinished(Ok(staged)));
    state
}

fn start_options(state: SessionState) -> Vec<Effect> {
    let (_, effects) = update(state, Msg::OptionsConfirmed);
    effects
}

fn captured_options(effects: &[Effect]) -> &omniconv_core::ConvertOptions {
    match effects {
        [Effect::StartConversion { options, .. }] => options,
        other => panic!("expected a start effect, got {other:?}"),
    }
}

#[test]
fn ocr_target_captures_engine() {
    let state = stage(staged_document());
    let (state, _) = update(state, Msg::FormatSelected("md".to_string()));
    assert_eq!(state.phase(), Phase::OptionsPending);

    let effects = start_options(state);
    let options = captured_options(&effects);
    assert_eq!(options.ocr_engine.as_deref(), Some("tesseract"));
    assert_eq!(options.ocr_theme, None);
    assert_eq!(options.preset, None);
}

#[test]
fn theme_is_captured_only_while_its_panel_is_visible() {
    let state = stage(staged_document());
    let (state, _) = update(state, Msg::FormatSelected("html".to_string()));
    let (state, _) = update(state, Msg::OcrEngineChanged("paddle".to_string()));
    let (state, _) = update(state, Msg::OcrThemeChanged("dark".to_string()));
    assert!(state.view().theme_panel);

    // Switching back to tesseract hides the theme sub-panel; the previously
    // selected theme must not leak into the payload.
    let (state, _) = update(state, Msg::OcrEngineChanged("tesseract".to_string()));
    assert!(!state.view().theme_panel);

    let effects = start_options(state);
    let options = captured_options(&effects);
    assert_eq!(options.ocr_engine.as_deref(), Some("tesseract"));
    assert_eq!(options.ocr_theme, None);
}

#[test]
fn theme_rides_along_for_paddle_html() {
    let state = stage(staged_document());
    let (state, _) = update(state, Msg::FormatSelected("html".to_string()));
    let (state, _) = update(state, Msg::OcrEngineChanged("paddle".to_string()));
    let (state, _) = update(state, Msg::OcrThemeChanged("dark".to_string()));

    let effects = start_options(state);
    let options = captured_options(&effects);
    assert_eq!(options.ocr_engine.as_deref(), Some("paddle"));
    assert_eq!(options.ocr_theme.as_deref(), Some("dark"));
}

#[test]
fn length_limit_requires_the_checkbox() {
    let state = stage(staged_document());
    let (state, _) = update(state, Msg::FormatSelected("md".to_string()));
    let (state, _) = update(state, Msg::LengthLimitChanged(640));

    // Value set but checkbox unchecked: nothing captured.
    let effects = start_options(state.clone());
    let options = captured_options(&effects);
    assert_eq!(options.limit_css_length, None);
    assert_eq!(options.css_max_length, None);

    let (state, _) = update(state, Msg::LengthLimitToggled(true));
    let effects = start_options(state);
    let options = captured_options(&effects);
    assert_eq!(options.limit_css_length, Some(true));
    assert_eq!(options.css_max_length, Some(640));
}

#[test]
fn ai_toggle_is_captured_independently_of_format() {
    let state = stage(staged_document());
    let (state, _) = update(state, Msg::AiToggled(true));
    let (state, _) = update(state, Msg::FormatSelected("docx".to_string()));

    let effects = start_options(state);
    let options = captured_options(&effects);
    assert_eq!(options.ai_enhanced, Some(true));
    assert_eq!(options.ocr_engine.as_deref(), Some("tesseract"));
}
