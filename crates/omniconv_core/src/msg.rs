use crate::history::HistoryEntry;
use crate::state::StagedFile;

/// A status update for a job, delivered by either the poll or the push
/// channel. Admissibility is decided by `job_id` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub job_id: String,
    pub body: UpdateBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateBody {
    Progress { percent: u8 },
    Completed { filename: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a local file. Size is checked before any network call.
    FilePicked { path: String, size_bytes: u64 },
    /// User submitted a URL for by-URL upload.
    UrlSubmitted(String),
    /// Upload request finished (local or by-URL).
    UploadFinished(Result<StagedFile, String>),
    /// User selected one entry from the presented format list.
    FormatSelected(String),
    /// User edited the video preset control.
    PresetChanged(String),
    /// User edited the OCR engine control.
    OcrEngineChanged(String),
    /// User edited the OCR theme control.
    OcrThemeChanged(String),
    /// User toggled the CSS length-limit checkbox.
    LengthLimitToggled(bool),
    /// User edited the CSS length-limit value.
    LengthLimitChanged(u32),
    /// User toggled the enhanced/AI switch.
    AiToggled(bool),
    /// User confirmed the options panel ("start" action).
    OptionsConfirmed,
    /// The UI-settle delay after a no-options format selection elapsed.
    StartDelayElapsed { epoch: u64 },
    /// Start-conversion request finished; carries the job id on success.
    ConvertStarted(Result<String, String>),
    /// Poll or push delivered a job update. `at_ms` is the wall-clock time
    /// the platform received it, used to stamp history entries.
    JobUpdate { update: JobUpdate, at_ms: u64 },
    /// "Remove file" / "try again" / "convert another".
    ResetRequested,
    /// Restore previously persisted history entries.
    HistoryRestored(Vec<HistoryEntry>),
    /// Fallback for placeholder wiring.
    NoOp,
}
