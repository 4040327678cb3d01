use chrono::DateTime;
use omniconv_core::{
    status_message, HistoryEntry, Phase, SessionView, OCR_ENGINES, OCR_THEMES, VIDEO_PRESETS,
};

const BAR_WIDTH: usize = 24;

/// Renders the session view into terminal lines. One frame per dirty update.
pub fn render(view: &SessionView, theme: &str) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("── omniconv [{theme}] ──"));

    if let Some(error) = &view.error {
        lines.push(format!("! {error}"));
    }

    match view.phase {
        Phase::Idle => {
            if view.uploading {
                lines.push("Uploading...".to_string());
            } else {
                lines.push("Drop a file with `open <path>` or fetch one with `url <link>`.".to_string());
            }
        }
        Phase::FileStaged => {
            push_file_info(&mut lines, view);
            lines.push(format!("Convert to: {}", view.formats.join("  ")));
            lines.push("Pick one with `pick <format>`.".to_string());
        }
        Phase::FormatChosen => {
            push_file_info(&mut lines, view);
            if let Some(format) = &view.chosen_format {
                lines.push(format!("Starting {format} conversion..."));
            }
        }
        Phase::OptionsPending => {
            push_file_info(&mut lines, view);
            if let Some(format) = &view.chosen_format {
                lines.push(format!("Options for {format}:"));
            }
            if view.preset_panel {
                lines.push(format!(
                    "  preset: {}  (choices: {})",
                    view.options.preset,
                    VIDEO_PRESETS.join(", ")
                ));
            }
            if view.ocr_panel {
                lines.push(format!(
                    "  engine: {}  (choices: {})",
                    view.options.ocr_engine,
                    OCR_ENGINES.join(", ")
                ));
                if view.theme_panel {
                    lines.push(format!(
                        "  ocr-theme: {}  (choices: {})",
                        view.options.ocr_theme,
                        OCR_THEMES.join(", ")
                    ));
                }
                lines.push(format!(
                    "  limit: {} ({}px)",
                    if view.options.limit_length { "on" } else { "off" },
                    view.options.max_length_px
                ));
            }
            lines.push(format!(
                "  ai: {}",
                if view.options.ai_enhanced { "on" } else { "off" }
            ));
            lines.push("Confirm with `start`.".to_string());
        }
        Phase::Converting => {
            lines.push(format!(
                "{} {:>3}%  {}",
                progress_bar(view.progress),
                view.progress,
                status_message(view.progress)
            ));
        }
        Phase::Done => {
            if let Some(filename) = &view.output_filename {
                lines.push(format!("Done: {filename}"));
            }
            lines.push("Save it with `download`, or `reset` to convert another.".to_string());
        }
        Phase::Failed => {
            lines.push("Conversion failed. `reset` to try again.".to_string());
        }
    }

    lines
}

fn push_file_info(lines: &mut Vec<String>, view: &SessionView) {
    if let (Some(name), Some(kind)) = (&view.source_name, view.media_kind) {
        lines.push(format!("File: {} ({})", name, kind.as_str()));
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    bar.push('[');
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}

pub fn render_history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No conversions yet.".to_string()];
    }
    entries
        .iter()
        .map(|entry| {
            let when = DateTime::from_timestamp_millis(entry.timestamp_ms as i64)
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "?".to_string());
            format!(
                "{}  {} -> {}  {} ({})",
                when, entry.input_format, entry.output_format, entry.output_filename, entry.input_name
            )
        })
        .collect()
}

pub fn help() -> Vec<String> {
    [
        "Commands:",
        "  open <path>        upload a local file",
        "  url <link>         upload by URL",
        "  pick <format>      choose an output format",
        "  preset <value>     video preset",
        "  engine <value>     OCR engine",
        "  ocr-theme <value>  OCR output theme",
        "  limit on|off|<px>  cap CSS length in OCR output",
        "  ai on|off          enhanced conversion",
        "  start              confirm options and convert",
        "  download           save the finished output",
        "  chat <message>     ask the assistant",
        "  history            show completed conversions",
        "  theme              toggle dark/light preference",
        "  reset              discard the session",
        "  quit               exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniconv_core::MediaKind;

    #[test]
    fn bar_scales_with_percent() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert!(progress_bar(50).contains("##"));
    }

    #[test]
    fn history_lines_show_format_transition() {
        let entry =
            HistoryEntry::from_completion("clip.avi", MediaKind::Video, "out.mp4", 1_700_000_000_000);
        let lines = render_history(&[entry]);
        assert!(lines[0].contains("AVI -> MP4"));
        assert!(lines[0].contains("out.mp4"));
    }
}
