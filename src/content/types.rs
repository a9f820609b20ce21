//! Core content types shared by the prompt builder, gateway, exporter and controller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of parts for multi-part formats.
pub const MIN_PART_COUNT: u32 = 3;

/// Maximum number of parts for multi-part formats.
pub const MAX_PART_COUNT: u32 = 10;

/// Social platform the content is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    LinkedIn,
    #[serde(rename = "Twitter/X")]
    TwitterX,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::TikTok,
        Platform::LinkedIn,
        Platform::TwitterX,
        Platform::YouTube,
    ];

    /// Formats offered for this platform, in menu order.
    pub fn formats(self) -> &'static [Format] {
        match self {
            Platform::Instagram => &[
                Format::Carousel,
                Format::Story,
                Format::VideoScript,
                Format::Post,
            ],
            Platform::TikTok => &[Format::VideoScript],
            Platform::LinkedIn => &[Format::Carousel, Format::Post, Format::Thread],
            Platform::TwitterX => &[Format::Thread, Format::Post],
            Platform::YouTube => &[Format::VideoScript],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::LinkedIn => "LinkedIn",
            Platform::TwitterX => "Twitter/X",
            Platform::YouTube => "YouTube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Voice of the generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Bold,
    Friendly,
    Inspiring,
    Storytelling,
    Professional,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Bold => "Bold",
            Tone::Friendly => "Friendly",
            Tone::Inspiring => "Inspiring",
            Tone::Storytelling => "Storytelling",
            Tone::Professional => "Professional",
        };
        f.write_str(label)
    }
}

/// Output format of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Carousel,
    Story,
    #[serde(rename = "Video Script")]
    VideoScript,
    Thread,
    Post,
}

impl Format {
    /// Carousel, Thread and Story are delivered as a sequence of parts.
    pub fn is_multi_part(self) -> bool {
        matches!(self, Format::Carousel | Format::Thread | Format::Story)
    }

    /// Aspect ratio selected automatically when the user picks this format.
    pub fn default_aspect_ratio(self) -> AspectRatio {
        match self {
            Format::Story | Format::VideoScript => AspectRatio::Tall,
            _ => AspectRatio::Square,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Format::Carousel => "Carousel",
            Format::Story => "Story",
            Format::VideoScript => "Video Script",
            Format::Thread => "Thread",
            Format::Post => "Post",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the creator wants the post to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    Virality,
    Engagement,
    #[serde(rename = "Lead Generation")]
    LeadGeneration,
    Sales,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Goal::Virality => "Virality",
            Goal::Engagement => "Engagement",
            Goal::LeadGeneration => "Lead Generation",
            Goal::Sales => "Sales",
        };
        f.write_str(label)
    }
}

/// Slide aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub fn is_square(self) -> bool {
        self == AspectRatio::Square
    }
}

/// Everything the user has entered on the create form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputs {
    pub platform: Platform,
    pub tone: Tone,
    pub format: Format,
    pub goal: Goal,
    #[serde(rename = "slideCount")]
    pub part_count: u32,
    pub aspect_ratio: AspectRatio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
    pub text_color: String,
    pub highlight_color: String,
    pub title_color: String,
    pub playbook_id: String,
    #[serde(default)]
    pub playbook_inputs: BTreeMap<String, String>,
}

impl Default for UserInputs {
    fn default() -> Self {
        let mut playbook_inputs = BTreeMap::new();
        playbook_inputs.insert("topic".to_string(), "Why most diets fail".to_string());
        Self {
            platform: Platform::Instagram,
            tone: Tone::Bold,
            format: Format::Carousel,
            goal: Goal::Engagement,
            part_count: 7,
            aspect_ratio: AspectRatio::Square,
            watermark: None,
            text_color: "#1E293B".to_string(),
            highlight_color: "#FF7A00".to_string(),
            title_color: "#0F172A".to_string(),
            playbook_id: crate::content::DEFAULT_PLAYBOOK_ID.to_string(),
            playbook_inputs,
        }
    }
}

impl UserInputs {
    /// Switch platform, falling back to the platform's first format when the
    /// current one is not offered there.
    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
        let allowed = platform.formats();
        if !allowed.contains(&self.format) {
            self.format = allowed[0];
        }
    }

    /// Switch format; the aspect ratio follows the format.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
        self.aspect_ratio = format.default_aspect_ratio();
    }

    pub fn set_part_count(&mut self, count: u32) {
        self.part_count = count.clamp(MIN_PART_COUNT, MAX_PART_COUNT);
    }

    /// Select a playbook and reset its inputs to empty strings.
    ///
    /// Unknown ids are ignored and return false.
    pub fn set_playbook(&mut self, id: &str) -> bool {
        match crate::content::find_playbook(id) {
            Some(playbook) => {
                self.playbook_id = playbook.id.to_string();
                self.playbook_inputs = playbook.empty_inputs();
                true
            }
            None => false,
        }
    }

    pub fn set_playbook_input(&mut self, key: &str, value: &str) {
        self.playbook_inputs
            .insert(key.to_string(), value.to_string());
    }

    /// The watermark, treating an empty string as absent.
    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref().filter(|w| !w.is_empty())
    }

    /// Replace colours that are not `#` plus up to six hex digits with the
    /// defaults, and pad the rest to `#RRGGBB`.
    pub fn normalize_colors(&mut self) {
        let defaults = UserInputs::default();
        self.text_color = crate::content::sanitize_color(&self.text_color, &defaults.text_color);
        self.highlight_color =
            crate::content::sanitize_color(&self.highlight_color, &defaults.highlight_color);
        self.title_color = crate::content::sanitize_color(&self.title_color, &defaults.title_color);
    }

    /// Look up a playbook input, treating empty values as missing.
    pub fn input(&self, key: &str) -> Option<&str> {
        self.playbook_inputs
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// One unit of a multi-part format (a slide or thread entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPart {
    pub part_number: u32,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

/// The format-specific main content of a generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ContentBody {
    Carousel(Vec<ContentPart>),
    Script(String),
    Post(String),
}

/// A complete generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViralContent {
    pub body: ContentBody,
    #[serde(default)]
    pub captions: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub next_topic_suggestion: String,
}

impl ViralContent {
    pub fn parts(&self) -> Option<&[ContentPart]> {
        match &self.body {
            ContentBody::Carousel(parts) => Some(parts),
            _ => None,
        }
    }

    pub fn script(&self) -> Option<&str> {
        match &self.body {
            ContentBody::Script(script) => Some(script),
            _ => None,
        }
    }

    pub fn post_body(&self) -> Option<&str> {
        match &self.body {
            ContentBody::Post(post) => Some(post),
            _ => None,
        }
    }

    /// Replace the first part (the hook). Returns false when there is no part to replace.
    pub fn replace_hook(&mut self, hook: ContentPart) -> bool {
        match &mut self.body {
            ContentBody::Carousel(parts) if !parts.is_empty() => {
                parts[0] = hook;
                true
            }
            _ => false,
        }
    }
}

/// A scored hook alternative produced by an optimisation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPart {
    #[serde(flatten)]
    pub part: ContentPart,
    pub viral_score: i64,
    pub rationale: String,
}

/// Coarse band of a 0-100 viral score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 80 => ScoreBand::Strong,
            s if s >= 60 => ScoreBand::Fair,
            s if s >= 40 => ScoreBand::Weak,
            _ => ScoreBand::Poor,
        }
    }
}

/// Rating of a post's hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HookEffectiveness {
    Poor,
    Average,
    Good,
    Excellent,
    #[default]
    #[serde(other)]
    Unrated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViralPotentialScore {
    pub score: i64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookAnalysis {
    pub effectiveness: HookEffectiveness,
    pub feedback: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentBreakdown {
    pub storytelling: String,
    pub value_proposition: String,
    pub call_to_action: String,
}

/// Sentiment shares as reported. The percentages are independent and are
/// never normalised to sum to 100.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudienceSentiment {
    pub summary: String,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    pub questions: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XFactor {
    pub identified: bool,
    pub description: String,
}

impl XFactor {
    /// The description, only when an X-factor was actually identified.
    pub fn description(&self) -> Option<&str> {
        self.identified.then_some(self.description.as_str())
    }
}

/// Report produced by analysing a published post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalysis {
    pub viral_potential_score: ViralPotentialScore,
    #[serde(default)]
    pub hook_analysis: HookAnalysis,
    #[serde(default)]
    pub content_breakdown: ContentBreakdown,
    #[serde(default)]
    pub audience_sentiment: AudienceSentiment,
    pub growth_opportunities: Vec<String>,
    #[serde(default)]
    pub x_factor: XFactor,
}
