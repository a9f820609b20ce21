//! AppController - owns the session state and runs user actions.

use std::path::PathBuf;
use std::time::Duration;

use super::busy::{is_set, BusyFlag, BusyGuard};
use super::session::Session;
use crate::content::{ContentPart, OptimizedPart, PostAnalysis, UserInputs, ViralContent};
use crate::export::{file_stem, ExportArtifact, ExportError, ExportKind, Exporter, Rasterize, Rasterizer, Stage};
use crate::gemini::{GatewayError, GeminiClient};
use crate::prompt::build_video_prompt;
use crate::video::{
    read_status, set_status, CancelHandle, GeneratedVideo, JobPhase, PollPolicy, StatusSlot,
    StatusTicker, VideoCache, VideoPoller, DEFAULT_STATUS_INTERVAL, DOWNLOADING_MESSAGE,
};

const GENERATE_NO_RESULT: &str = "Failed to generate content. The AI returned an unexpected response.";
const ANALYZE_NO_RESULT: &str = "Failed to analyze content. The AI returned an unexpected response.";
const OPTIMIZE_NO_RESULT: &str =
    "Failed to generate optimizations. The AI returned an unexpected response.";

/// Which workflow the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Create,
    Analyze,
}

/// Session state plus the actions that change it.
///
/// Each action clears its busy flag on every exit path and stores failures as
/// a user-readable message instead of returning them.
pub struct AppController<R = Rasterizer> {
    client: GeminiClient,
    exporter: Exporter<R>,
    video_cache: Option<(VideoCache, u64)>,
    poll_policy: PollPolicy,
    status_interval: Duration,

    mode: AppMode,
    inputs: UserInputs,
    post_url: String,

    content: Option<ViralContent>,
    analysis: Option<PostAnalysis>,
    optimized: Option<Vec<OptimizedPart>>,
    video: Option<GeneratedVideo>,
    video_path: Option<PathBuf>,
    error: Option<String>,
    current_part: usize,

    loading: BusyFlag,
    optimizing: BusyFlag,
    generating_video: BusyFlag,
    exporting: BusyFlag,
    video_status: StatusSlot,
}

impl AppController<Rasterizer> {
    pub fn new(client: GeminiClient) -> Self {
        Self::with_exporter(client, Exporter::default())
    }
}

impl<R: Rasterize> AppController<R> {
    pub fn with_exporter(client: GeminiClient, exporter: Exporter<R>) -> Self {
        Self {
            client,
            exporter,
            video_cache: None,
            poll_policy: PollPolicy::default(),
            status_interval: DEFAULT_STATUS_INTERVAL,
            mode: AppMode::default(),
            inputs: UserInputs::default(),
            post_url: String::new(),
            content: None,
            analysis: None,
            optimized: None,
            video: None,
            video_path: None,
            error: None,
            current_part: 0,
            loading: BusyFlag::default(),
            optimizing: BusyFlag::default(),
            generating_video: BusyFlag::default(),
            exporting: BusyFlag::default(),
            video_status: StatusSlot::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Store every downloaded video, keeping the cache under `max_size_mb`.
    /// Each request still starts a new job; lookups are left to the caller.
    pub fn with_video_cache(mut self, cache: VideoCache, max_size_mb: u64) -> Self {
        self.video_cache = Some((cache, max_size_mb));
        self
    }

    // State accessors

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn inputs(&self) -> &UserInputs {
        &self.inputs
    }

    /// Mutable create-mode draft.
    pub fn inputs_mut(&mut self) -> &mut UserInputs {
        &mut self.inputs
    }

    pub fn post_url(&self) -> &str {
        &self.post_url
    }

    pub fn set_post_url(&mut self, url: impl Into<String>) {
        self.post_url = url.into();
    }

    pub fn content(&self) -> Option<&ViralContent> {
        self.content.as_ref()
    }

    /// Load an earlier result, e.g. a saved session.
    pub fn set_content(&mut self, content: ViralContent) {
        self.content = Some(content);
        self.current_part = 0;
    }

    /// Restore the inputs and result of a saved session.
    pub fn load_session(&mut self, session: Session) {
        self.inputs = session.inputs;
        self.inputs.normalize_colors();
        self.set_content(session.content);
    }

    /// The current inputs and result, when there is a result.
    pub fn session(&self) -> Option<Session> {
        self.content.as_ref().map(|content| Session {
            inputs: self.inputs.clone(),
            content: content.clone(),
        })
    }

    pub fn analysis(&self) -> Option<&PostAnalysis> {
        self.analysis.as_ref()
    }

    pub fn optimized(&self) -> Option<&[OptimizedPart]> {
        self.optimized.as_deref()
    }

    pub fn video(&self) -> Option<&GeneratedVideo> {
        self.video.as_ref()
    }

    /// Where the last video is stored on disk, when the cache is enabled.
    pub fn video_path(&self) -> Option<&PathBuf> {
        self.video_path.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        is_set(&self.loading)
    }

    pub fn is_optimizing(&self) -> bool {
        is_set(&self.optimizing)
    }

    pub fn is_generating_video(&self) -> bool {
        is_set(&self.generating_video)
    }

    pub fn is_exporting(&self) -> bool {
        is_set(&self.exporting)
    }

    /// Shared exporting flag, for observers outside the controller.
    pub fn exporting_flag(&self) -> BusyFlag {
        self.exporting.clone()
    }

    /// Current rotating video status; empty when no video job runs.
    pub fn video_status(&self) -> String {
        read_status(&self.video_status)
    }

    /// Shared status slot, for observers outside the controller.
    pub fn video_status_slot(&self) -> StatusSlot {
        self.video_status.clone()
    }

    // Mode

    /// Switch mode. Results, the optimisation view, the video and the error
    /// are cleared; both drafts are kept.
    pub fn set_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.content = None;
        self.analysis = None;
        self.optimized = None;
        self.video = None;
        self.video_path = None;
        self.error = None;
        self.current_part = 0;
    }

    fn fail(&mut self, message: String) {
        log::error!("{}", message);
        self.error = Some(message);
    }

    fn gateway_message(error: GatewayError, no_result: &str) -> String {
        if error.is_no_result() {
            log::warn!("No usable result: {}", error);
            no_result.to_string()
        } else {
            error.to_string()
        }
    }

    // Actions

    /// Generate content from the create draft.
    pub async fn generate(&mut self) {
        let _busy = BusyGuard::acquire(&self.loading);
        self.clear_results();

        match self.client.generate_content(&self.inputs).await {
            Ok(content) => {
                log::info!("Generated {} content", self.inputs.format);
                self.content = Some(content);
            }
            Err(e) => self.fail(Self::gateway_message(e, GENERATE_NO_RESULT)),
        }
    }

    /// Analyse the post at the analyze draft's URL.
    pub async fn analyze(&mut self) {
        let _busy = BusyGuard::acquire(&self.loading);
        self.clear_results();

        match self.client.analyze_post(&self.post_url).await {
            Ok(analysis) => self.analysis = Some(analysis),
            Err(e) => self.fail(Self::gateway_message(e, ANALYZE_NO_RESULT)),
        }
    }

    /// A/B-test the hook. Does nothing without a first part.
    pub async fn start_optimization(&mut self) {
        let Some(hook) = self.hook().cloned() else {
            return;
        };
        let _busy = BusyGuard::acquire(&self.optimizing);
        self.error = None;

        match self.client.optimize_hook(&hook, &self.inputs).await {
            Ok(parts) => self.optimized = Some(parts),
            Err(e) => self.fail(Self::gateway_message(e, OPTIMIZE_NO_RESULT)),
        }
    }

    fn hook(&self) -> Option<&ContentPart> {
        self.content.as_ref()?.parts()?.first()
    }

    /// Replace the hook with the alternative at `index` and leave the optimisation view.
    ///
    /// Returns false, changing nothing, when there is no such alternative or no part to replace.
    pub fn select_optimized(&mut self, index: usize) -> bool {
        let Some(selected) = self
            .optimized
            .as_ref()
            .and_then(|parts| parts.get(index))
            .map(|p| p.part.clone())
        else {
            return false;
        };
        let Some(content) = self.content.as_mut() else {
            return false;
        };
        if !content.replace_hook(selected) {
            return false;
        }
        self.optimized = None;
        true
    }

    pub fn cancel_optimization(&mut self) {
        self.optimized = None;
    }

    /// Generate a video from the current script.
    pub async fn generate_video(&mut self) {
        self.generate_video_with_cancel(CancelHandle::new()).await
    }

    /// Generate a video, stopping early when `cancel` fires. Does nothing without a script.
    pub async fn generate_video_with_cancel(&mut self, cancel: CancelHandle) {
        let Some(script) = self.content.as_ref().and_then(|c| c.script()) else {
            return;
        };
        let prompt = build_video_prompt(script);
        let _busy = BusyGuard::acquire(&self.generating_video);
        self.video = None;
        self.video_path = None;
        self.error = None;

        let slot = self.video_status.clone();
        let result = {
            let ticker = StatusTicker::start(slot.clone(), self.status_interval);
            let poller = VideoPoller::new(&self.client, self.poll_policy).with_cancel(cancel);
            poller
                .run_observed(&prompt, |phase| {
                    if let JobPhase::Done { .. } = phase {
                        ticker.stop();
                        set_status(&slot, DOWNLOADING_MESSAGE);
                    }
                })
                .await
        };
        set_status(&slot, "");

        match result {
            Ok(video) => {
                if let Some((cache, max_size_mb)) = &self.video_cache {
                    match cache.store_with_cleanup(&prompt, &video.bytes, *max_size_mb) {
                        Ok(path) => self.video_path = Some(path),
                        Err(e) => log::warn!("Failed to cache video: {}", e),
                    }
                }
                self.video = Some(video);
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    // Viewer

    pub fn current_part(&self) -> usize {
        self.current_part
    }

    fn part_count(&self) -> usize {
        self.content
            .as_ref()
            .and_then(|c| c.parts())
            .map_or(0, <[ContentPart]>::len)
    }

    /// Advance to the next part, wrapping to the first.
    pub fn next_part(&mut self) {
        let total = self.part_count();
        if total > 0 {
            self.current_part = (self.current_part + 1) % total;
        }
    }

    /// Step back to the previous part, wrapping to the last.
    pub fn prev_part(&mut self) {
        let total = self.part_count();
        if total > 0 {
            self.current_part = (self.current_part + total - 1) % total;
        }
    }

    pub fn go_to_part(&mut self, index: usize) -> bool {
        if index < self.part_count() {
            self.current_part = index;
            true
        } else {
            false
        }
    }

    /// The rendered slides of the current result.
    pub fn stage(&self) -> Stage {
        match &self.content {
            Some(content) => Stage::from_content(content, &self.inputs, self.current_part),
            None => Stage::new(self.inputs.aspect_ratio),
        }
    }

    // Export

    /// Export the current result.
    pub fn export(&mut self, kind: ExportKind) -> Result<ExportArtifact, ExportError> {
        let stage = self.stage();
        self.export_stage(kind, &stage)
    }

    /// Export an explicit stage, e.g. pre-rendered frames.
    ///
    /// A trigger while another export runs is rejected with `Busy` and leaves
    /// the running export and the error untouched.
    pub fn export_stage(&mut self, kind: ExportKind, stage: &Stage) -> Result<ExportArtifact, ExportError> {
        let Some(_busy) = BusyGuard::try_acquire(&self.exporting) else {
            log::warn!("Export requested while another export is running");
            return Err(ExportError::Busy);
        };
        self.error = None;

        let stem = file_stem(&self.inputs);
        let result = match kind {
            ExportKind::Png => self.exporter.export_png(stage, &stem),
            ExportKind::Pdf => self.exporter.export_pdf(stage, &stem),
            ExportKind::Zip => self.exporter.export_zip(stage, &stem, self.content.as_ref()),
        };

        match &result {
            Ok(artifact) => log::info!("Export finished: {}", artifact.file_name),
            Err(e) => {
                log::error!("{} export failed: {}", kind.label(), e);
                self.error = Some(e.user_message(kind));
            }
        }
        result
    }
}
