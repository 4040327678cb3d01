use crate::history::HistoryEntry;
use crate::options::OptionInputs;
use crate::view_model::SessionView;
use crate::{filter_formats, view_model};

/// Local uploads larger than this are rejected before any network call.
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// The media family the service assigned to the staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Document,
}

impl MediaKind {
    /// Parses the service's `file_type` token. Unknown tokens fall back to
    /// `Document`, matching how the presentation layer treats them.
    pub fn parse(token: &str) -> MediaKind {
        match token {
            "audio" => MediaKind::Audio,
            "video" => MediaKind::Video,
            "image" => MediaKind::Image,
            _ => MediaKind::Document,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Image => "image",
            MediaKind::Document => "document",
        }
    }
}

/// One upload-to-download attempt's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    FileStaged,
    FormatChosen,
    OptionsPending,
    Converting,
    Done,
    Failed,
}

/// Result of a successful upload (local file or by-URL fetch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_id: String,
    pub media_kind: MediaKind,
    pub source_name: String,
    pub output_formats: Vec<String>,
}

/// The single active conversion session.
///
/// Mutated exclusively through [`crate::update`]; the platform loop owns the
/// value and threads it through each message dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    phase: Phase,
    file_id: Option<String>,
    job_id: Option<String>,
    media_kind: Option<MediaKind>,
    source_name: Option<String>,
    available_formats: Vec<String>,
    chosen_format: Option<String>,
    converting: bool,
    uploading: bool,
    // Incremented on every reset; scheduled callbacks carry the epoch they
    // were issued under and are dropped on mismatch.
    epoch: u64,
    progress: u8,
    output_filename: Option<String>,
    error: Option<String>,
    option_inputs: OptionInputs,
    history: Vec<HistoryEntry>,
    dirty: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            file_id: None,
            job_id: None,
            media_kind: None,
            source_name: None,
            available_formats: Vec::new(),
            chosen_format: None,
            converting: false,
            uploading: false,
            epoch: 0,
            progress: 0,
            output_filename: None,
            error: None,
            option_inputs: OptionInputs::default(),
            history: Vec::new(),
            dirty: false,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.media_kind
    }

    pub fn chosen_format(&self) -> Option<&str> {
        self.chosen_format.as_deref()
    }

    pub fn converting(&self) -> bool {
        self.converting
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Output-format tokens with the source extension excluded.
    pub fn presented_formats(&self) -> Vec<String> {
        filter_formats(self.source_name.as_deref(), &self.available_formats)
    }

    pub fn view(&self) -> SessionView {
        view_model::build(self)
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub(crate) fn uploading(&self) -> bool {
        self.uploading
    }

    pub(crate) fn progress(&self) -> u8 {
        self.progress
    }

    pub(crate) fn output_filename(&self) -> Option<&str> {
        self.output_filename.as_deref()
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn option_inputs(&self) -> &OptionInputs {
        &self.option_inputs
    }

    pub(crate) fn option_inputs_mut(&mut self) -> &mut OptionInputs {
        &mut self.option_inputs
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_uploading(&mut self, uploading: bool) {
        self.uploading = uploading;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn stage(&mut self, staged: StagedFile) {
        self.phase = Phase::FileStaged;
        self.file_id = Some(staged.file_id);
        self.media_kind = Some(staged.media_kind);
        self.source_name = Some(staged.source_name);
        self.available_formats = staged.output_formats;
        self.chosen_format = None;
        self.job_id = None;
        self.uploading = false;
        self.error = None;
    }

    pub(crate) fn choose_format(&mut self, format: String) {
        self.chosen_format = Some(format);
    }

    pub(crate) fn begin_converting(&mut self) {
        self.converting = true;
        self.phase = Phase::Converting;
        self.progress = 0;
        self.error = None;
    }

    pub(crate) fn record_job(&mut self, job_id: String) {
        self.job_id = Some(job_id);
    }

    pub(crate) fn apply_progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
    }

    pub(crate) fn complete(&mut self, filename: String, entry: HistoryEntry) {
        self.phase = Phase::Done;
        self.converting = false;
        self.progress = 100;
        self.output_filename = Some(filename);
        crate::history::record(&mut self.history, entry);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = Phase::Failed;
        self.converting = false;
        self.error = Some(message);
    }

    pub(crate) fn restore_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = entries;
        self.history.truncate(crate::history::MAX_HISTORY);
    }

    /// Hard reset: back to a fresh `Idle` session. History and the option
    /// control values survive; they belong to the frontend, not the session.
    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.file_id = None;
        self.job_id = None;
        self.media_kind = None;
        self.source_name = None;
        self.available_formats = Vec::new();
        self.chosen_format = None;
        self.converting = false;
        self.uploading = false;
        self.epoch += 1;
        self.progress = 0;
        self.output_filename = None;
        self.error = None;
    }
}
