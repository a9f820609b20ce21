//! CLI enum types mirroring the content model's choices.

use clap::ValueEnum;

use crate::content::{AspectRatio, Format, Goal, Platform, Tone};
use crate::export::ExportKind;

/// Target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Instagram,
    Tiktok,
    Linkedin,
    Twitter,
    Youtube,
}

impl From<PlatformArg> for Platform {
    fn from(p: PlatformArg) -> Self {
        match p {
            PlatformArg::Instagram => Platform::Instagram,
            PlatformArg::Tiktok => Platform::TikTok,
            PlatformArg::Linkedin => Platform::LinkedIn,
            PlatformArg::Twitter => Platform::TwitterX,
            PlatformArg::Youtube => Platform::YouTube,
        }
    }
}

/// Content format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Carousel,
    Story,
    VideoScript,
    Thread,
    Post,
}

impl From<FormatArg> for Format {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Carousel => Format::Carousel,
            FormatArg::Story => Format::Story,
            FormatArg::VideoScript => Format::VideoScript,
            FormatArg::Thread => Format::Thread,
            FormatArg::Post => Format::Post,
        }
    }
}

/// Voice of the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToneArg {
    Bold,
    Friendly,
    Inspiring,
    Storytelling,
    Professional,
}

impl From<ToneArg> for Tone {
    fn from(t: ToneArg) -> Self {
        match t {
            ToneArg::Bold => Tone::Bold,
            ToneArg::Friendly => Tone::Friendly,
            ToneArg::Inspiring => Tone::Inspiring,
            ToneArg::Storytelling => Tone::Storytelling,
            ToneArg::Professional => Tone::Professional,
        }
    }
}

/// Goal of the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GoalArg {
    Virality,
    Engagement,
    LeadGeneration,
    Sales,
}

impl From<GoalArg> for Goal {
    fn from(g: GoalArg) -> Self {
        match g {
            GoalArg::Virality => Goal::Virality,
            GoalArg::Engagement => Goal::Engagement,
            GoalArg::LeadGeneration => Goal::LeadGeneration,
            GoalArg::Sales => Goal::Sales,
        }
    }
}

/// Slide aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AspectArg {
    /// 1:1
    Square,
    /// 9:16
    Tall,
}

impl From<AspectArg> for AspectRatio {
    fn from(a: AspectArg) -> Self {
        match a {
            AspectArg::Square => AspectRatio::Square,
            AspectArg::Tall => AspectRatio::Tall,
        }
    }
}

/// Export artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Png,
    Pdf,
    Zip,
}

impl From<ExportFormat> for ExportKind {
    fn from(e: ExportFormat) -> Self {
        match e {
            ExportFormat::Png => ExportKind::Png,
            ExportFormat::Pdf => ExportKind::Pdf,
            ExportFormat::Zip => ExportKind::Zip,
        }
    }
}
