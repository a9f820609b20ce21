//! GeminiClient - handles communication with the Gemini generative-language API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{analysis_schema, content_schema, optimization_schema};
use crate::content::{
    ContentBody, ContentPart, Format, OptimizedPart, PostAnalysis, UserInputs, ViralContent,
};
use crate::prompt::{build_analysis_prompt, build_generation_prompt, build_optimization_prompt};

/// The environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for structured text generation.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for video generation.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

/// Default timeout for HTTP requests (120 seconds, structured generation is slow).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for downloading a finished video.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Explicit gateway configuration handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub video_model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEMINI_API_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Default configuration with the API key read from `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self::default().with_api_key_from(GEMINI_API_KEY_ENV)
    }

    /// Read the API key from the named environment variable. Empty values count as unset.
    pub fn with_api_key_from(mut self, env_var: &str) -> Self {
        self.api_key = std::env::var(env_var).ok().filter(|k| !k.is_empty());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Request body for generateContent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

/// Response from generateContent.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, trimmed.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Generation result as it comes over the wire, with mutually exclusive optional bodies.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawViralContent {
    #[serde(default)]
    content_parts: Option<Vec<ContentPart>>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    post_body: Option<String>,
    #[serde(default)]
    captions: Vec<String>,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default)]
    next_topic_suggestion: String,
}

impl RawViralContent {
    /// Pick the body matching `format`, falling back to whichever body is populated.
    fn into_content(self, format: Format) -> Option<ViralContent> {
        let parts = self
            .content_parts
            .filter(|p| !p.is_empty())
            .map(ContentBody::Carousel);
        let script = self
            .script
            .filter(|s| !s.is_empty())
            .map(ContentBody::Script);
        let post = self
            .post_body
            .filter(|s| !s.is_empty())
            .map(ContentBody::Post);

        let body = match format {
            Format::Carousel | Format::Thread | Format::Story => parts.or(script).or(post),
            Format::VideoScript => script.or(parts).or(post),
            Format::Post => post.or(parts).or(script),
        }?;

        Some(ViralContent {
            body,
            captions: self.captions,
            hashtags: self.hashtags,
            next_topic_suggestion: self.next_topic_suggestion,
        })
    }
}

/// Request body for starting a long-running video job.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
}

/// Long-running operation as returned by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

/// Snapshot of an asynchronous video-generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    /// Operation resource name, e.g. `models/veo-2.0-generate-001/operations/abc`.
    pub name: String,
    pub done: bool,
    /// Job-level error reported by the service.
    pub error: Option<String>,
    /// Download locator of the first generated video, once done.
    pub video_uri: Option<String>,
}

impl From<OperationResponse> for VideoOperation {
    fn from(op: OperationResponse) -> Self {
        let video_uri = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri)
            .filter(|uri| !uri.is_empty());
        let error = op
            .error
            .map(|e| format!("{} (code {})", e.message, e.code));
        Self {
            name: op.name,
            done: op.done,
            error,
            video_uri,
        }
    }
}

/// Client for the Gemini API.
///
/// Holds an explicit [`GatewayConfig`]; there is no process-wide client.
pub struct GeminiClient {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from explicit configuration.
    ///
    /// A missing API key is not an error here; every call checks it instead.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The API key, or `MissingApiKey` when none is configured.
    pub fn api_key(&self) -> Result<&str, GatewayError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)
    }

    /// Send a prompt with a declared output shape and return the response text.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MissingApiKey` without touching the network when
    /// no key is configured, `GatewayError::EmptyResponse` when the service
    /// answers with no text, `GatewayError::ApiError` for a non-2xx status, or
    /// `GatewayError::HttpError` if the request fails.
    pub async fn generate_json(&self, prompt: &str, schema: Value) -> Result<String, GatewayError> {
        let api_key = self.api_key()?;
        if prompt.trim().is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.text_model
        );
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        log::debug!("POST {} ({} prompt chars)", url, prompt.len());
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        let text = body.text();
        if text.is_empty() {
            log::error!("Gemini API returned an empty response.");
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }

    /// Generate viral content for the given inputs.
    ///
    /// The result must carry at least one of `contentParts`, `script` or `postBody`.
    pub async fn generate_content(&self, inputs: &UserInputs) -> Result<ViralContent, GatewayError> {
        let prompt = build_generation_prompt(inputs);
        let text = self.generate_json(&prompt, content_schema()).await?;

        let raw: RawViralContent = serde_json::from_str(&text).map_err(|e| {
            log::error!("Could not parse generation response: {}", e);
            GatewayError::Parse(e.to_string())
        })?;
        raw.into_content(inputs.format).ok_or_else(|| {
            log::error!("Parsed JSON does not contain any main content");
            GatewayError::Parse("response has no contentParts, script or postBody".to_string())
        })
    }

    /// Analyse a published post.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` before any network call when `url`
    /// does not start with `http`.
    pub async fn analyze_post(&self, url: &str) -> Result<PostAnalysis, GatewayError> {
        if url.is_empty() || !url.starts_with("http") {
            return Err(GatewayError::InvalidUrl);
        }
        let prompt = build_analysis_prompt(url);
        let text = self.generate_json(&prompt, analysis_schema()).await?;

        let value: Value =
            serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;
        if value.get("viralPotentialScore").is_none() || value.get("growthOpportunities").is_none()
        {
            log::error!("Parsed JSON does not match the expected analysis structure");
            return Err(GatewayError::Parse(
                "response is missing viralPotentialScore or growthOpportunities".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Ask for three alternative hooks plus a re-score of the original.
    ///
    /// The first returned entry is the re-scored original.
    pub async fn optimize_hook(
        &self,
        hook: &ContentPart,
        inputs: &UserInputs,
    ) -> Result<Vec<OptimizedPart>, GatewayError> {
        let prompt = build_optimization_prompt(hook, inputs);
        let text = self.generate_json(&prompt, optimization_schema()).await?;

        let parts: Vec<OptimizedPart> =
            serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;
        if parts.is_empty() {
            log::error!("Optimization response contained no hooks");
            return Err(GatewayError::Parse("empty optimization array".to_string()));
        }
        Ok(parts)
    }

    /// Start a video-generation job.
    pub async fn start_video(&self, prompt: &str) -> Result<VideoOperation, GatewayError> {
        let api_key = self.api_key()?;
        if prompt.trim().is_empty() {
            return Err(GatewayError::EmptyPrompt);
        }

        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.config.base_url, self.config.video_model
        );
        let request_body = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters { sample_count: 1 },
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;
        let operation = Self::read_operation(response).await?;
        log::info!("Video job started: {}", operation.name);
        Ok(operation)
    }

    /// Re-fetch the status of a video job.
    pub async fn get_video_operation(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1beta/{}", self.config.base_url, operation.name);

        let response = self
            .http_client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .send()
            .await?;
        Self::read_operation(response).await
    }

    /// Issue the authenticated fetch for a finished video.
    ///
    /// The status is not checked here; the caller decides what a failed fetch means.
    pub async fn fetch_artifact(&self, uri: &str) -> Result<reqwest::Response, GatewayError> {
        let api_key = self.api_key()?;
        let response = self
            .http_client
            .get(uri)
            .query(&[("key", api_key)])
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        Ok(response)
    }

    async fn read_operation(response: reqwest::Response) -> Result<VideoOperation, GatewayError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }
        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        Ok(operation.into())
    }
}

/// Errors that can occur during gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("API key not configured. Set {} in the environment or .env file.", GEMINI_API_KEY_ENV)]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("The AI returned an empty response")]
    EmptyResponse,

    #[error("The AI returned an unexpected response: {0}")]
    Parse(String),

    #[error("A valid Post URL is required for analysis.")]
    InvalidUrl,

    #[error("Empty prompt")]
    EmptyPrompt,
}

impl GatewayError {
    /// True for errors meaning "no usable result" rather than a failure to reach the service.
    pub fn is_no_result(&self) -> bool {
        matches!(self, GatewayError::EmptyResponse | GatewayError::Parse(_))
    }
}
