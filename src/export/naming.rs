//! Artifact file names and the text entries bundled next to slides.

use crate::content::UserInputs;

/// File stem used when no primary input is filled in.
pub const DEFAULT_FILE_STEM: &str = "ViralFlow_Content";

/// Separator between captions in `captions.txt`.
pub const CAPTION_SEPARATOR: &str = "\n\n---\n\n";

const MAX_STEM_CHARS: usize = 50;

/// Playbook inputs tried, in order, as the file name source.
const PRIMARY_INPUT_KEYS: [&str; 3] = ["topic", "YOUR NICHE", "TRENDING TOPIC"];

/// Stem for exported files: the first non-empty primary input, cut to 50
/// characters, with every whitespace run turned into `_`.
pub fn file_stem(inputs: &UserInputs) -> String {
    let primary = PRIMARY_INPUT_KEYS
        .iter()
        .find_map(|key| inputs.input(key))
        .unwrap_or(DEFAULT_FILE_STEM);
    let truncated: String = primary.chars().take(MAX_STEM_CHARS).collect();

    let mut stem = String::with_capacity(truncated.len());
    let mut in_whitespace = false;
    for c in truncated.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(c);
            in_whitespace = false;
        }
    }
    stem
}

/// Strip every `#` from a tag and prefix exactly one.
pub fn normalize_hashtag(tag: &str) -> String {
    format!("#{}", tag.replace('#', ""))
}

/// Contents of `hashtags.txt`: normalised tags joined by single spaces.
pub fn hashtags_text(hashtags: &[String]) -> String {
    hashtags
        .iter()
        .map(|tag| normalize_hashtag(tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Contents of `captions.txt`.
pub fn captions_text(captions: &[String]) -> String {
    captions.join(CAPTION_SEPARATOR)
}

pub fn png_file_name(stem: &str) -> String {
    format!("{}_slide.png", stem)
}

pub fn pdf_file_name(stem: &str) -> String {
    format!("{}.pdf", stem)
}

pub fn zip_file_name(stem: &str) -> String {
    format!("{}.zip", stem)
}

/// Entry name of the n-th slide (0-based position) inside a bundle.
pub fn slide_entry_name(position: usize) -> String {
    format!("slide_{}.png", position + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn inputs_with(pairs: &[(&str, &str)]) -> UserInputs {
        UserInputs {
            playbook_inputs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..UserInputs::default()
        }
    }

    #[test]
    fn test_file_stem_from_topic() {
        let inputs = inputs_with(&[("topic", "Why most   diets\tfail")]);
        assert_eq!(file_stem(&inputs), "Why_most_diets_fail");
    }

    #[test]
    fn test_file_stem_falls_through_empty_inputs() {
        let inputs = inputs_with(&[("topic", ""), ("YOUR NICHE", "home baking")]);
        assert_eq!(file_stem(&inputs), "home_baking");

        let inputs = inputs_with(&[("TRENDING TOPIC", "AI agents")]);
        assert_eq!(file_stem(&inputs), "AI_agents");
    }

    #[test]
    fn test_file_stem_default() {
        assert_eq!(file_stem(&inputs_with(&[])), DEFAULT_FILE_STEM);
    }

    #[test]
    fn test_file_stem_truncates_before_replacing() {
        let long = "a".repeat(49) + " bcd";
        let stem = file_stem(&inputs_with(&[("topic", &long)]));
        assert_eq!(stem, "a".repeat(49) + "_");
    }

    #[test]
    fn test_hashtags_text() {
        let tags = vec!["x".to_string(), "#y".to_string(), "##z#".to_string()];
        assert_eq!(hashtags_text(&tags), "#x #y #z");
    }

    #[test]
    fn test_hashtag_normalisation_is_idempotent() {
        let tags = vec!["growth".to_string(), "#viral".to_string(), "#a#b".to_string()];
        let once: Vec<String> = tags.iter().map(|t| normalize_hashtag(t)).collect();
        let twice: Vec<String> = once.iter().map(|t| normalize_hashtag(t)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_captions_text() {
        let captions = vec!["A".to_string(), "B".to_string()];
        assert_eq!(captions_text(&captions), "A\n\n---\n\nB");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(png_file_name("x"), "x_slide.png");
        assert_eq!(pdf_file_name("x"), "x.pdf");
        assert_eq!(zip_file_name("x"), "x.zip");
        assert_eq!(slide_entry_name(0), "slide_1.png");
    }
}
