//! Plain-text rendering of results for the terminal.

use std::fmt::Write;

use crate::content::{
    ContentBody, OptimizedPart, Playbook, PostAnalysis, ScoreBand, SlideRole, ViralContent,
};

fn band_label(score: i64) -> &'static str {
    match ScoreBand::from_score(score) {
        ScoreBand::Strong => "strong",
        ScoreBand::Fair => "fair",
        ScoreBand::Weak => "weak",
        ScoreBand::Poor => "poor",
    }
}

pub fn render_playbook(playbook: &Playbook) -> String {
    let mut out = format!(
        "{} ({})\n  {}\n  Category: {}\n",
        playbook.name, playbook.id, playbook.description, playbook.category
    );
    if !playbook.inputs.is_empty() {
        let keys: Vec<&str> = playbook.inputs.iter().map(|i| i.id).collect();
        let _ = writeln!(out, "  Inputs: {}", keys.join(", "));
    }
    out
}

pub fn render_content(content: &ViralContent) -> String {
    let mut out = String::new();
    match &content.body {
        ContentBody::Carousel(parts) => {
            for (i, part) in parts.iter().enumerate() {
                let tag = match SlideRole::for_position(i + 1, parts.len()) {
                    SlideRole::Cover => " [hook]",
                    SlideRole::CallToAction => " [cta]",
                    SlideRole::Body => "",
                };
                let _ = writeln!(out, "--- {}/{}{} ---", i + 1, parts.len(), tag);
                let _ = writeln!(out, "{}", part.title);
                let _ = writeln!(out, "{}", part.body);
                if let Some(highlight) = part.highlight.as_deref().filter(|h| !h.is_empty()) {
                    let _ = writeln!(out, "(highlight: {})", highlight);
                }
                out.push('\n');
            }
        }
        ContentBody::Script(script) => {
            let _ = writeln!(out, "Script:\n{}\n", script);
        }
        ContentBody::Post(post) => {
            let _ = writeln!(out, "{}\n", post);
        }
    }

    for (i, caption) in content.captions.iter().enumerate() {
        let _ = writeln!(out, "Caption {}: {}", i + 1, caption);
    }
    if !content.hashtags.is_empty() {
        let _ = writeln!(out, "Hashtags: {}", crate::export::hashtags_text(&content.hashtags));
    }
    if !content.next_topic_suggestion.is_empty() {
        let _ = writeln!(out, "Next topic: {}", content.next_topic_suggestion);
    }
    out
}

pub fn render_analysis(analysis: &PostAnalysis) -> String {
    let mut out = String::new();
    let score = &analysis.viral_potential_score;
    let _ = writeln!(
        out,
        "Viral potential: {}/100 ({})\n  {}",
        score.score,
        band_label(score.score),
        score.justification
    );

    let hook = &analysis.hook_analysis;
    let _ = writeln!(out, "\nHook: {:?}\n  {}", hook.effectiveness, hook.feedback);
    if !hook.suggestion.is_empty() {
        let _ = writeln!(out, "  Try: {}", hook.suggestion);
    }

    let breakdown = &analysis.content_breakdown;
    let _ = writeln!(
        out,
        "\nStorytelling: {}\nValue: {}\nCall to action: {}",
        breakdown.storytelling, breakdown.value_proposition, breakdown.call_to_action
    );

    let sentiment = &analysis.audience_sentiment;
    let _ = writeln!(
        out,
        "\nAudience: {}\n  positive {}%, neutral {}%, negative {}%, questions {}%",
        sentiment.summary,
        sentiment.positive,
        sentiment.neutral,
        sentiment.negative,
        sentiment.questions
    );

    let _ = writeln!(out, "\nGrowth opportunities:");
    for item in &analysis.growth_opportunities {
        let _ = writeln!(out, "  - {}", item);
    }
    if let Some(x) = analysis.x_factor.description() {
        let _ = writeln!(out, "\nX-factor: {}", x);
    }
    out
}

pub fn render_optimized(parts: &[OptimizedPart]) -> String {
    let mut out = String::new();
    for (i, option) in parts.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}] score {} ({})\n    {}\n    {}\n    Why: {}",
            i,
            option.viral_score,
            band_label(option.viral_score),
            option.part.title,
            option.part.body,
            option.rationale
        );
    }
    out
}
