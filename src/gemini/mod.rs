//! Gemini integration: structured text generation and Veo video jobs.

mod client;
pub mod schema;

pub use client::{
    GatewayConfig, GatewayError, GeminiClient, VideoOperation, DEFAULT_TEXT_MODEL,
    DEFAULT_VIDEO_MODEL, GEMINI_API_BASE_URL, GEMINI_API_KEY_ENV,
};
