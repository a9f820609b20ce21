//! Content model: user inputs, generation results, analysis reports and playbooks.

mod playbook;
mod slide;
mod types;

pub use playbook::{
    find_playbook, playbook_or_default, InputKind, Playbook, PlaybookInput, DEFAULT_PLAYBOOK_ID,
    PLAYBOOKS,
};
pub use slide::{Segment, SlideRole};
pub use types::{
    AspectRatio, AudienceSentiment, ContentBody, ContentBreakdown, ContentPart, Format, Goal,
    HookAnalysis, HookEffectiveness, OptimizedPart, Platform, PostAnalysis, ScoreBand, Tone,
    UserInputs, ViralContent, ViralPotentialScore, XFactor, MAX_PART_COUNT, MIN_PART_COUNT,
};

/// Normalise a colour being typed: `#` followed by at most six hex digits.
///
/// Returns `None` when the edit should be rejected.
pub fn accept_color_edit(value: &str) -> Option<String> {
    let digits = value.strip_prefix('#')?;
    if digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(value.to_string())
}

/// Commit a colour edit by right-padding it with `0` to `#RRGGBB`.
pub fn commit_color(value: &str) -> String {
    let mut committed = value.to_string();
    while committed.chars().count() < 7 {
        committed.push('0');
    }
    committed
}

/// Accept and commit a complete colour value, or return `fallback` when it is rejected.
pub fn sanitize_color(value: &str, fallback: &str) -> String {
    match accept_color_edit(value.trim()) {
        Some(accepted) => commit_color(&accepted),
        None => fallback.to_string(),
    }
}
