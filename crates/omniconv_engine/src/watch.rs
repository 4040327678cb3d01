use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use conv_logging::conv_debug;
use tokio_util::sync::CancellationToken;

use crate::client::ConversionApi;
use crate::types::{EngineEvent, JobUpdate, JobUpdateBody};

/// Receives engine events as they are produced. The channel impl feeds the
/// platform loop; tests substitute their own.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Periodically polls job status until a terminal update or cancellation.
///
/// Every update is tagged with the polled job id; the session applies its own
/// admissibility check, so a cancellation that races an in-flight poll is
/// harmless.
pub async fn poll_job(
    api: Arc<dyn ConversionApi>,
    job_id: String,
    interval: Duration,
    sink: &dyn EventSink,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Check cancellation ahead of the next tick.
            biased;
            _ = cancel.cancelled() => {
                conv_debug!("poll for job {} cancelled", job_id);
                break;
            }
            _ = ticker.tick() => {}
        }

        let body = match api.job_status(&job_id).await {
            Ok(status) => status.into_update_body(),
            Err(err) => JobUpdateBody::Failed {
                error: err.to_string(),
            },
        };
        let terminal = body.is_terminal();
        sink.emit(EngineEvent::Job(JobUpdate {
            job_id: job_id.clone(),
            body,
        }));
        if terminal {
            break;
        }
    }
}
