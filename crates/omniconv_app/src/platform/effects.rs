use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use conv_logging::conv_info;
use omniconv_core::{Effect, JobUpdate, MediaKind, Msg, StagedFile, UpdateBody};
use omniconv_engine::{self as engine, EngineEvent, EngineHandle};

/// Executes core effects against the engine and turns engine events back
/// into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self { engine, msg_tx }
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::UploadFile { path } => {
                conv_info!("uploading {}", path);
                self.engine.upload(path);
            }
            Effect::UploadUrl { url } => {
                conv_info!("uploading by url {}", url);
                self.engine.upload_url(url);
            }
            Effect::ScheduleStart { epoch, delay_ms } => {
                let tx = self.msg_tx.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(delay_ms));
                    let _ = tx.send(Msg::StartDelayElapsed { epoch });
                });
            }
            Effect::StartConversion {
                file_id,
                output_format,
                options,
            } => {
                conv_info!("starting conversion of {} to {}", file_id, output_format);
                self.engine
                    .convert(file_id, output_format, map_options(options));
            }
            Effect::WatchJob { job_id } => self.engine.watch(job_id),
            Effect::StopWatch => self.engine.stop_watch(),
            // Persistence needs the session's history; the app loop handles it.
            Effect::PersistHistory => {}
        }
    }

    pub fn chat(&self, message: String, response_id: Option<String>) {
        self.engine.chat(message, response_id);
    }

    pub fn download(&self, job_id: String, filename: String) {
        self.engine.download(job_id, filename);
    }

    pub fn poll_events(&self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Session message for an engine event, if it concerns the session. Chat and
/// download completions are frontend concerns and stay with the caller.
pub fn session_msg(event: &EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::UploadFinished(result) => Some(Msg::UploadFinished(
            result
                .clone()
                .map(staged_from_upload)
                .map_err(|err| err.to_string()),
        )),
        EngineEvent::ConvertStarted(result) => Some(Msg::ConvertStarted(
            result.clone().map_err(|err| err.to_string()),
        )),
        EngineEvent::Job(update) => Some(Msg::JobUpdate {
            update: map_job_update(update.clone()),
            at_ms: Utc::now().timestamp_millis().max(0) as u64,
        }),
        EngineEvent::ChatReply(_) | EngineEvent::DownloadFinished(_) => None,
    }
}

fn staged_from_upload(data: engine::UploadData) -> StagedFile {
    StagedFile {
        file_id: data.file_id,
        media_kind: MediaKind::parse(&data.file_type),
        source_name: data.filename.unwrap_or_else(|| "upload".to_string()),
        output_formats: data.output_formats,
    }
}

fn map_job_update(update: engine::JobUpdate) -> JobUpdate {
    JobUpdate {
        job_id: update.job_id,
        body: match update.body {
            engine::JobUpdateBody::Progress { percent } => UpdateBody::Progress { percent },
            engine::JobUpdateBody::Completed { filename } => UpdateBody::Completed { filename },
            engine::JobUpdateBody::Failed { error } => UpdateBody::Failed { error },
        },
    }
}

fn map_options(options: omniconv_core::ConvertOptions) -> engine::ConvertOptions {
    engine::ConvertOptions {
        preset: options.preset,
        ocr_engine: options.ocr_engine,
        ocr_theme: options.ocr_theme,
        limit_css_length: options.limit_css_length,
        css_max_length: options.css_max_length,
        ai_enhanced: options.ai_enhanced,
    }
}
