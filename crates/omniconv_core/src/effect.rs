use crate::options::ConvertOptions;

/// Side effects requested by [`crate::update`], executed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadFile {
        path: String,
    },
    UploadUrl {
        url: String,
    },
    /// Fire `Msg::StartDelayElapsed { epoch }` after `delay_ms`. The epoch
    /// makes an already-scheduled callback inert after a reset.
    ScheduleStart {
        epoch: u64,
        delay_ms: u64,
    },
    StartConversion {
        file_id: String,
        output_format: String,
        options: ConvertOptions,
    },
    WatchJob {
        job_id: String,
    },
    StopWatch,
    PersistHistory,
}
