use std::fs;
use std::path::{Path, PathBuf};

use conv_logging::{conv_error, conv_info, conv_warn};
use omniconv_core::{HistoryEntry, MediaKind, MAX_HISTORY};
use omniconv_engine::AtomicFileWriter;
use serde::{Deserialize, Serialize};

const HISTORY_FILENAME: &str = ".omniconv_history.ron";
const THEME_FILENAME: &str = ".omniconv_theme.ron";

pub(crate) const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    input_name: String,
    input_format: String,
    output_format: String,
    output_filename: String,
    kind: String,
    timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedHistory {
    completed: Vec<PersistedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedTheme {
    theme: String,
}

/// Best-effort load; a missing or unreadable file degrades to an empty log.
pub(crate) fn load_history(store_dir: &Path) -> Vec<HistoryEntry> {
    let path = store_dir.join(HISTORY_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            conv_warn!("Failed to read history from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let persisted: PersistedHistory = match ron::from_str(&content) {
        Ok(history) => history,
        Err(err) => {
            conv_warn!("Failed to parse history from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let mut entries: Vec<HistoryEntry> = persisted
        .completed
        .into_iter()
        .map(|entry| HistoryEntry {
            input_name: entry.input_name,
            input_format: entry.input_format,
            output_format: entry.output_format,
            output_filename: entry.output_filename,
            kind: MediaKind::parse(&entry.kind),
            timestamp_ms: entry.timestamp_ms,
        })
        .collect();
    entries.truncate(MAX_HISTORY);

    conv_info!("Loaded {} history entries from {:?}", entries.len(), path);
    entries
}

pub(crate) fn save_history(store_dir: &Path, entries: &[HistoryEntry]) {
    let persisted = PersistedHistory {
        completed: entries
            .iter()
            .map(|entry| PersistedEntry {
                input_name: entry.input_name.clone(),
                input_format: entry.input_format.clone(),
                output_format: entry.output_format.clone(),
                output_filename: entry.output_filename.clone(),
                kind: entry.kind.as_str().to_string(),
                timestamp_ms: entry.timestamp_ms,
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            conv_error!("Failed to serialize history: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(PathBuf::from(store_dir));
    if let Err(err) = writer.write(HISTORY_FILENAME, &content) {
        conv_error!("Failed to write history to {:?}: {}", store_dir, err);
    }
}

pub(crate) fn load_theme(store_dir: &Path) -> String {
    let path = store_dir.join(THEME_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => return DEFAULT_THEME.to_string(),
    };
    match ron::from_str::<PersistedTheme>(&content) {
        Ok(persisted) => persisted.theme,
        Err(err) => {
            conv_warn!("Failed to parse theme from {:?}: {}", path, err);
            DEFAULT_THEME.to_string()
        }
    }
}

pub(crate) fn save_theme(store_dir: &Path, theme: &str) {
    let persisted = PersistedTheme {
        theme: theme.to_string(),
    };
    let content = match ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::new()) {
        Ok(text) => text,
        Err(err) => {
            conv_error!("Failed to serialize theme: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(PathBuf::from(store_dir));
    if let Err(err) = writer.write(THEME_FILENAME, &content) {
        conv_error!("Failed to write theme to {:?}: {}", store_dir, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry::from_completion(name, MediaKind::Document, "out.docx", 1_700_000_000_000)
    }

    #[test]
    fn history_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry("b.pdf"), entry("a.pdf")];

        save_history(dir.path(), &entries);
        let loaded = load_history(dir.path());

        assert_eq!(loaded, entries);
    }

    #[test]
    fn missing_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_history(dir.path()).is_empty());
    }

    #[test]
    fn corrupt_history_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HISTORY_FILENAME), "not ron at all (").unwrap();
        assert!(load_history(dir.path()).is_empty());
    }

    #[test]
    fn theme_round_trips_with_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_theme(dir.path()), DEFAULT_THEME);

        save_theme(dir.path(), "light");
        assert_eq!(load_theme(dir.path()), "light");
    }
}
