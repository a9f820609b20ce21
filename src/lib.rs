//! viralflow library crate.
//!
//! Prompt construction, the Gemini gateway, video job polling, slide export
//! and the session controller that ties them together.

pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod export;
pub mod gemini;
pub mod prompt;
pub mod video;
