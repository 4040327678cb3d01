use conv_logging::{conv_debug, conv_warn};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::types::{EngineEvent, JobUpdate, JobUpdateBody};
use crate::watch::EventSink;

// Event names the service emits on its push channel, one per lifecycle
// transition.
const EVENT_PROGRESS: &str = "conversion_progress";
const EVENT_COMPLETE: &str = "conversion_complete";
const EVENT_ERROR: &str = "conversion_error";

#[derive(Debug, Deserialize)]
struct PushFrame {
    event: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ProgressData {
    job_id: String,
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct CompleteData {
    job_id: String,
    filename: String,
}

#[derive(Debug, Deserialize)]
struct ErrorData {
    job_id: String,
    error: String,
}

/// Subscribes to the push channel and forwards job updates until a terminal
/// event for the watched job, a closed connection, or cancellation.
///
/// Events for other jobs are forwarded too; the session's job-id filter is
/// the single source of truth for admissibility.
pub async fn listen_push(
    ws_url: String,
    job_id: String,
    sink: &dyn EventSink,
    cancel: CancellationToken,
) {
    let mut stream = match connect_async(ws_url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(err) => {
            conv_warn!("push channel connect failed: {}", err);
            sink.emit(EngineEvent::Job(JobUpdate {
                job_id,
                body: JobUpdateBody::Failed {
                    error: format!("Push channel unavailable: {err}"),
                },
            }));
            return;
        }
    };

    loop {
        let frame = tokio::select! {
            // Check cancellation ahead of the next frame.
            biased;
            _ = cancel.cancelled() => {
                conv_debug!("push listener for job {} cancelled", job_id);
                return;
            }
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                let Some(update) = parse_push_frame(&text) else {
                    continue;
                };
                let ends_watch = update.job_id == job_id && update.body.is_terminal();
                sink.emit(EngineEvent::Job(update));
                if ends_watch {
                    return;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                sink.emit(EngineEvent::Job(JobUpdate {
                    job_id,
                    body: JobUpdateBody::Failed {
                        error: "Push channel closed before the job finished".to_string(),
                    },
                }));
                return;
            }
            Some(Ok(_)) => {} // ping/pong/binary: nothing to forward
            Some(Err(err)) => {
                conv_warn!("push channel read failed: {}", err);
                sink.emit(EngineEvent::Job(JobUpdate {
                    job_id,
                    body: JobUpdateBody::Failed {
                        error: format!("Push channel failed: {err}"),
                    },
                }));
                return;
            }
        }
    }
}

/// Parses one push frame. Unknown event names and malformed payloads yield
/// `None` and are skipped by the listener.
fn parse_push_frame(text: &str) -> Option<JobUpdate> {
    let frame: PushFrame = serde_json::from_str(text).ok()?;
    match frame.event.as_str() {
        EVENT_PROGRESS => {
            let data: ProgressData = serde_json::from_value(frame.data).ok()?;
            Some(JobUpdate {
                job_id: data.job_id,
                body: JobUpdateBody::Progress {
                    percent: crate::types::round_percent(data.progress),
                },
            })
        }
        EVENT_COMPLETE => {
            let data: CompleteData = serde_json::from_value(frame.data).ok()?;
            Some(JobUpdate {
                job_id: data.job_id,
                body: JobUpdateBody::Completed {
                    filename: data.filename,
                },
            })
        }
        EVENT_ERROR => {
            let data: ErrorData = serde_json::from_value(frame.data).ok()?;
            Some(JobUpdate {
                job_id: data.job_id,
                body: JobUpdateBody::Failed { error: data.error },
            })
        }
        _ => None,
    }
}
