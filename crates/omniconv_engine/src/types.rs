use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque job identifier issued by the conversion service.
pub type JobId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered with a non-success envelope.
    Service,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The response body did not match the expected envelope.
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Service => write!(f, "service error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// `{success, data, error}` envelope every endpoint responds with.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceError {
    pub message: Option<String>,
}

/// Payload of a successful upload (local or by-URL).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadData {
    pub file_id: String,
    /// Set by the by-URL endpoint, where the client has no local name.
    pub filename: Option<String>,
    pub file_type: String,
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvertData {
    pub job_id: JobId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusData {
    pub status: String,
    pub progress: Option<f64>,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl StatusData {
    /// Collapses a status poll into the update shape shared with the push
    /// channel. Progress is rounded for display.
    pub fn into_update_body(self) -> JobUpdateBody {
        match self.status.as_str() {
            "completed" => JobUpdateBody::Completed {
                filename: self.filename.unwrap_or_default(),
            },
            "failed" => JobUpdateBody::Failed {
                error: self.error.unwrap_or_else(|| "Conversion failed".to_string()),
            },
            _ => JobUpdateBody::Progress {
                percent: round_percent(self.progress.unwrap_or(0.0)),
            },
        }
    }
}

pub(crate) fn round_percent(progress: f64) -> u8 {
    progress.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatData {
    pub response: Option<String>,
    pub response_id: Option<String>,
}

/// Sparse options payload for the start-conversion call. `None` fields are
/// omitted from the serialized request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConvertOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_css_length: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
}

/// A job-lifecycle update from either channel. The session decides
/// admissibility by job id; the engine only tags and forwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub job_id: JobId,
    pub body: JobUpdateBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdateBody {
    Progress { percent: u8 },
    Completed { filename: String },
    Failed { error: String },
}

impl JobUpdateBody {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobUpdateBody::Completed { .. } | JobUpdateBody::Failed { .. }
        )
    }
}

/// Events delivered to the platform loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadFinished(Result<UploadData, ApiError>),
    ConvertStarted(Result<JobId, ApiError>),
    Job(JobUpdate),
    ChatReply(Result<ChatData, ApiError>),
    DownloadFinished(Result<PathBuf, ApiError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_update_body() {
        let processing = StatusData {
            status: "processing".to_string(),
            progress: Some(41.6),
            filename: None,
            error: None,
        };
        assert_eq!(
            processing.into_update_body(),
            JobUpdateBody::Progress { percent: 42 }
        );

        let completed = StatusData {
            status: "completed".to_string(),
            progress: Some(100.0),
            filename: Some("out.docx".to_string()),
            error: None,
        };
        assert_eq!(
            completed.into_update_body(),
            JobUpdateBody::Completed {
                filename: "out.docx".to_string(),
            }
        );

        let failed = StatusData {
            status: "failed".to_string(),
            progress: None,
            filename: None,
            error: None,
        };
        assert_eq!(
            failed.into_update_body(),
            JobUpdateBody::Failed {
                error: "Conversion failed".to_string(),
            }
        );
    }

    #[test]
    fn sparse_options_serialize_without_padding() {
        let options = ConvertOptions {
            preset: Some("fast".to_string()),
            ..ConvertOptions::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({ "preset": "fast" }));
    }

    #[test]
    fn percent_is_rounded_and_clamped() {
        assert_eq!(round_percent(-3.0), 0);
        assert_eq!(round_percent(99.5), 100);
        assert_eq!(round_percent(250.0), 100);
    }
}
