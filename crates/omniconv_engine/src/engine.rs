use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use conv_logging::conv_info;
use tokio_util::sync::CancellationToken;

use crate::client::{ApiSettings, ConversionApi, ReqwestApi};
use crate::push::listen_push;
use crate::types::{ConvertOptions, EngineEvent};
use crate::watch::{poll_job, ChannelEventSink};

/// How job-lifecycle updates reach the client. Exactly one channel is wired
/// per engine; a configured push channel fully supersedes polling.
#[derive(Debug, Clone)]
pub enum ChannelMode {
    Poll { interval: Duration },
    Push { ws_url: String },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub channel: ChannelMode,
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            api: ApiSettings::default(),
            channel: ChannelMode::Poll {
                interval: Duration::from_secs(1),
            },
            download_dir,
        }
    }
}

enum EngineCommand {
    Upload {
        path: PathBuf,
    },
    UploadUrl {
        url: String,
    },
    Convert {
        file_id: String,
        output_format: String,
        options: ConvertOptions,
    },
    Watch {
        job_id: String,
    },
    StopWatch,
    Chat {
        message: String,
        response_id: Option<String>,
    },
    Download {
        job_id: String,
        filename: String,
    },
}

/// Bridge between the synchronous platform loop and the async transport.
/// Commands go in over an mpsc channel; events come back the same way and
/// are drained with [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_commands(config, cmd_rx, event_tx));

        Self { cmd_tx, event_rx }
    }

    pub fn upload(&self, path: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { path: path.into() });
    }

    pub fn upload_url(&self, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::UploadUrl { url: url.into() });
    }

    pub fn convert(&self, file_id: String, output_format: String, options: ConvertOptions) {
        let _ = self.cmd_tx.send(EngineCommand::Convert {
            file_id,
            output_format,
            options,
        });
    }

    pub fn watch(&self, job_id: String) {
        let _ = self.cmd_tx.send(EngineCommand::Watch { job_id });
    }

    pub fn stop_watch(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopWatch);
    }

    pub fn chat(&self, message: String, response_id: Option<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Chat {
            message,
            response_id,
        });
    }

    pub fn download(&self, job_id: String, filename: String) {
        let _ = self.cmd_tx.send(EngineCommand::Download { job_id, filename });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn run_commands(
    config: EngineConfig,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let api: Arc<dyn ConversionApi> = Arc::new(ReqwestApi::new(config.api.clone()));
    // Cancellation handle for the currently watched job, if any.
    let mut watch_cancel: Option<CancellationToken> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Upload { path } => {
                let api = api.clone();
                let tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = api.upload(&path).await;
                    let _ = tx.send(EngineEvent::UploadFinished(result));
                });
            }
            EngineCommand::UploadUrl { url } => {
                let api = api.clone();
                let tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = api.upload_url(&url).await;
                    let _ = tx.send(EngineEvent::UploadFinished(result));
                });
            }
            EngineCommand::Convert {
                file_id,
                output_format,
                options,
            } => {
                let api = api.clone();
                let tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = api
                        .start_conversion(&file_id, &output_format, &options)
                        .await
                        .map(|data| data.job_id);
                    let _ = tx.send(EngineEvent::ConvertStarted(result));
                });
            }
            EngineCommand::Watch { job_id } => {
                if let Some(token) = watch_cancel.take() {
                    token.cancel();
                }
                let token = CancellationToken::new();
                watch_cancel = Some(token.clone());
                let sink = ChannelEventSink::new(event_tx.clone());

                match config.channel.clone() {
                    ChannelMode::Poll { interval } => {
                        conv_info!("watching job {} via status polls", job_id);
                        let api = api.clone();
                        runtime.spawn(async move {
                            poll_job(api, job_id, interval, &sink, token).await;
                        });
                    }
                    ChannelMode::Push { ws_url } => {
                        conv_info!("watching job {} via push channel", job_id);
                        runtime.spawn(async move {
                            listen_push(ws_url, job_id, &sink, token).await;
                        });
                    }
                }
            }
            EngineCommand::StopWatch => {
                if let Some(token) = watch_cancel.take() {
                    token.cancel();
                }
            }
            EngineCommand::Chat {
                message,
                response_id,
            } => {
                let api = api.clone();
                let tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = api.chat(&message, response_id.as_deref()).await;
                    let _ = tx.send(EngineEvent::ChatReply(result));
                });
            }
            EngineCommand::Download { job_id, filename } => {
                let api = api.clone();
                let tx = event_tx.clone();
                let dest = config.download_dir.join(filename);
                runtime.spawn(async move {
                    let result = api.download_to(&job_id, &dest).await;
                    let _ = tx.send(EngineEvent::DownloadFinished(result));
                });
            }
        }
    }
}
