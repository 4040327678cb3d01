//! OmniConv engine: transport to the conversion service and job watching.
mod client;
mod engine;
mod push;
mod store;
mod types;
mod watch;

pub use client::{ApiSettings, ConversionApi, ReqwestApi};
pub use engine::{ChannelMode, EngineConfig, EngineHandle};
pub use push::listen_push;
pub use store::{ensure_dir, AtomicFileWriter, StoreError};
pub use types::{
    ApiError, ChatData, ConvertData, ConvertOptions, EngineEvent, FailureKind, JobId, JobUpdate,
    JobUpdateBody, StatusData, UploadData,
};
pub use watch::{poll_job, ChannelEventSink, EventSink};
