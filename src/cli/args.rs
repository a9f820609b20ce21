//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{AspectArg, ExportFormat, FormatArg, GoalArg, PlatformArg, ToneArg};

/// Turn a topic into platform-ready social content with Gemini
#[derive(Parser, Debug)]
#[command(name = "viralflow")]
#[command(version, about = "AI-assisted viral content generator", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available playbooks
    Playbooks,
    /// Generate content
    Generate(GenerateArgs),
    /// Analyse a published post
    Analyze {
        /// Post URL
        url: String,
    },
    /// A/B-test the hook of a saved carousel
    Optimize {
        /// Session file written by `generate --save`
        session: PathBuf,
        /// Replace the hook with this alternative (0-based) and save the session
        #[arg(long)]
        select: Option<usize>,
    },
    /// Generate a video from a saved video script
    Video {
        /// Session file written by `generate --save`
        session: PathBuf,
        /// Stop polling after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Reuse a previously downloaded video for the same script instead of starting a job
        #[arg(long)]
        reuse: bool,
        /// Output file (default: <topic>.mp4 in the export directory)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Export a saved carousel as PNG, PDF or ZIP
    Export {
        /// Session file written by `generate --save`
        session: PathBuf,
        /// Artifact to produce
        #[arg(long = "as", value_name = "KIND")]
        kind: ExportFormat,
        /// Use pre-rendered slide images from this directory
        #[arg(long)]
        frames: Option<PathBuf>,
        /// Slide to export as PNG (1-based)
        #[arg(long)]
        part: Option<usize>,
        /// Output directory
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct GenerateArgs {
    /// Target platform
    #[arg(long)]
    pub platform: Option<PlatformArg>,

    /// Content format
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Tone of voice
    #[arg(long)]
    pub tone: Option<ToneArg>,

    /// Goal of the post
    #[arg(long)]
    pub goal: Option<GoalArg>,

    /// Number of parts for carousels, threads and stories (3-10)
    #[arg(long)]
    pub parts: Option<u32>,

    /// Slide aspect ratio (defaults to the format's)
    #[arg(long)]
    pub aspect: Option<AspectArg>,

    /// Playbook id (see `viralflow playbooks`)
    #[arg(long)]
    pub playbook: Option<String>,

    /// Topic for the default generator
    #[arg(long, short)]
    pub topic: Option<String>,

    /// Playbook input as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Watermark shown on every slide
    #[arg(long)]
    pub watermark: Option<String>,

    /// Save the session as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Export the result right away
    #[arg(long)]
    pub export: Option<ExportFormat>,

    /// Output directory for exports
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse `KEY=VALUE`. The key may contain spaces; the value may contain `=`.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not in KEY=VALUE form", s))?;
    if key.trim().is_empty() {
        return Err(format!("Empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
