//! Long-running video job: start, poll until done, fetch the artifact.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::gemini::{GatewayError, GeminiClient, VideoOperation};

/// Default wait between status queries (10 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How often and for how long a job is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Deadline for the polling phase. `None` polls until the job finishes.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Caller-side cancellation for a running job.
///
/// Clones share the same signal. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Observable state of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    Started { operation: String },
    Polling { attempt: u32 },
    /// The job finished with a download locator; the fetch follows.
    Done { uri: String },
    Failed,
}

/// A downloaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub operation: String,
    pub uri: String,
    pub bytes: Vec<u8>,
}

/// Errors that can occur while running a video job.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Video generation failed: {0}")]
    JobFailed(String),

    #[error("Video generation completed, but no download link was provided.")]
    MissingArtifact,

    #[error("Failed to download video: HTTP {status}")]
    Download { status: u16 },

    #[error("Video generation cancelled")]
    Cancelled,

    #[error("Video generation timed out")]
    Timeout,
}

/// Drives one video job through Started → Polling → Done/Failed.
pub struct VideoPoller<'a> {
    client: &'a GeminiClient,
    policy: PollPolicy,
    cancel: CancelHandle,
}

impl<'a> VideoPoller<'a> {
    pub fn new(client: &'a GeminiClient, policy: PollPolicy) -> Self {
        Self {
            client,
            policy,
            cancel: CancelHandle::new(),
        }
    }

    /// Use an externally owned cancel handle.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the whole job without observing phases.
    pub async fn run(&self, prompt: &str) -> Result<GeneratedVideo, VideoError> {
        self.run_observed(prompt, |_| {}).await
    }

    /// Run the whole job, reporting each phase transition to `observer`.
    ///
    /// Exactly one artifact fetch is made, and only when the job reports a locator.
    pub async fn run_observed<F>(&self, prompt: &str, mut observer: F) -> Result<GeneratedVideo, VideoError>
    where
        F: FnMut(JobPhase),
    {
        let result = self.drive(prompt, &mut observer).await;
        if let Err(e) = &result {
            log::error!("Video job failed: {}", e);
            observer(JobPhase::Failed);
        }
        result
    }

    async fn drive<F>(&self, prompt: &str, observer: &mut F) -> Result<GeneratedVideo, VideoError>
    where
        F: FnMut(JobPhase),
    {
        log::info!("Submitting video generation request...");
        let operation = self
            .race(None, self.client.start_video(prompt))
            .await??;
        observer(JobPhase::Started {
            operation: operation.name.clone(),
        });

        let operation = self.poll_until_done(operation, observer).await?;

        if let Some(error) = operation.error {
            return Err(VideoError::JobFailed(error));
        }
        let uri = operation.video_uri.ok_or(VideoError::MissingArtifact)?;
        observer(JobPhase::Done { uri: uri.clone() });

        let bytes = self.download(&uri).await?;
        Ok(GeneratedVideo {
            operation: operation.name,
            uri,
            bytes,
        })
    }

    /// Wait an interval, re-query, repeat until the job reports done.
    pub async fn poll_until_done<F>(
        &self,
        mut operation: VideoOperation,
        observer: &mut F,
    ) -> Result<VideoOperation, VideoError>
    where
        F: FnMut(JobPhase),
    {
        let deadline = self.policy.timeout.map(|t| Instant::now() + t);
        let mut attempt = 0u32;

        while !operation.done {
            attempt += 1;
            observer(JobPhase::Polling { attempt });
            self.race(deadline, tokio::time::sleep(self.policy.interval))
                .await?;
            log::debug!("Polling video operation {} (attempt {})", operation.name, attempt);
            operation = self
                .race(deadline, self.client.get_video_operation(&operation))
                .await??;
        }

        log::info!("Video operation {} done after {} polls", operation.name, attempt);
        Ok(operation)
    }

    /// Fetch the artifact bytes behind a download locator.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, VideoError> {
        log::info!("Downloading video...");
        let response = self.race(None, self.client.fetch_artifact(uri)).await??;

        if !response.status().is_success() {
            return Err(VideoError::Download {
                status: response.status().as_u16(),
            });
        }

        let collect = async {
            let mut bytes = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                bytes.extend_from_slice(&chunk.map_err(GatewayError::from)?);
            }
            Ok::<_, VideoError>(bytes)
        };
        let bytes = self.race(None, collect).await??;

        log::info!("Downloaded {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Race `fut` against cancellation and an optional deadline.
    async fn race<T, Fut>(&self, deadline: Option<Instant>, fut: Fut) -> Result<T, VideoError>
    where
        Fut: Future<Output = T>,
    {
        let expiry = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VideoError::Cancelled),
            _ = expiry => Err(VideoError::Timeout),
            out = fut => Ok(out),
        }
    }
}
