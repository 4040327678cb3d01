use crate::formats::source_extension;
use crate::state::MediaKind;

/// History is bounded; the oldest entries fall off the end.
pub const MAX_HISTORY: usize = 50;

/// One completed conversion, most-recent-first in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub input_name: String,
    pub input_format: String,
    pub output_format: String,
    pub output_filename: String,
    pub kind: MediaKind,
    pub timestamp_ms: u64,
}

impl HistoryEntry {
    /// Builds an entry from a terminal success. Formats are the uppercased
    /// extensions of the input and output names, `?` when absent.
    pub fn from_completion(
        input_name: &str,
        kind: MediaKind,
        output_filename: &str,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            input_name: input_name.to_string(),
            input_format: format_label(input_name),
            output_format: format_label(output_filename),
            output_filename: output_filename.to_string(),
            kind,
            timestamp_ms,
        }
    }
}

fn format_label(name: &str) -> String {
    source_extension(name)
        .map(|ext| ext.to_ascii_uppercase())
        .unwrap_or_else(|| "?".to_string())
}

/// Prepends `entry` and enforces the cap.
pub(crate) fn record(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.insert(0, entry);
    history.truncate(MAX_HISTORY);
}
