//! Video generation: long-running job poller, rotating status and on-disk cache.

mod cache;
mod poller;
mod status;

pub use cache::{CacheError, VideoCache};
pub use poller::{
    CancelHandle, GeneratedVideo, JobPhase, PollPolicy, VideoError, VideoPoller,
    DEFAULT_POLL_INTERVAL,
};
pub use status::{
    read_status, set_status, StatusSlot, StatusTicker, DEFAULT_STATUS_INTERVAL,
    DOWNLOADING_MESSAGE, MIN_STATUS_INTERVAL, VIDEO_STATUS_MESSAGES,
};
