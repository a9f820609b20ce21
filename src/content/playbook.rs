//! Built-in playbook catalogue.
//!
//! A playbook is a named creative brief with declared input variables. Its
//! template refers to inputs as `[INPUT ID]` placeholders.

use std::collections::BTreeMap;

/// Id of the playbook that uses the standard (template-less) prompt.
pub const DEFAULT_PLAYBOOK_ID: &str = "default-generator";

/// How an input is presented on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
}

/// A variable a playbook asks the user for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookInput {
    /// Placeholder key, e.g. `YOUR NICHE`.
    pub id: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playbook {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub inputs: &'static [PlaybookInput],
    pub template: Option<&'static str>,
}

impl Playbook {
    /// Fresh, empty input map for this playbook.
    pub fn empty_inputs(&self) -> BTreeMap<String, String> {
        self.inputs
            .iter()
            .map(|input| (input.id.to_string(), String::new()))
            .collect()
    }
}

pub static PLAYBOOKS: &[Playbook] = &[
    Playbook {
        id: DEFAULT_PLAYBOOK_ID,
        name: "Standard Content Generator",
        description: "A general-purpose generator for a variety of content types.",
        category: "General",
        inputs: &[PlaybookInput {
            id: "topic",
            label: "Topic",
            kind: InputKind::TextArea,
            placeholder: "e.g., The truth about money",
        }],
        template: None,
    },
    Playbook {
        id: "infinite-idea-machine",
        name: "The Infinite Idea Machine",
        description: "Generate a unique, engaging content idea that resonates with your audience.",
        category: "Ideation",
        inputs: &[
            PlaybookInput {
                id: "YOUR NICHE",
                label: "Your Niche",
                kind: InputKind::Text,
                placeholder: "e.g., Personal Finance for Millennials",
            },
            PlaybookInput {
                id: "YOUR AUDIENCE",
                label: "Your Audience",
                kind: InputKind::Text,
                placeholder: "e.g., Young professionals new to investing",
            },
        ],
        template: Some(
            "You are a content strategist specializing in [YOUR NICHE]. Your task is to generate the single best and most unique, engaging content idea that will resonate with [YOUR AUDIENCE]. The idea should focus on problems my audience faces daily, trending topics in [YOUR NICHE], and actionable advice they can implement immediately. Avoid generic advice - make each idea specific and valuable.",
        ),
    },
    Playbook {
        id: "viral-content-creator",
        name: "The Viral Content Concept Creator",
        description: "Generate a concept with viral potential by tapping into strong emotions.",
        category: "Virality",
        inputs: &[PlaybookInput {
            id: "YOUR NICHE",
            label: "Your Niche",
            kind: InputKind::Text,
            placeholder: "e.g., Tech startups",
        }],
        template: Some(
            "Generate the single best content concept with viral potential for [YOUR NICHE]. The concept should:
1. Tap into a strong emotion (surprise, inspiration, controversy, humor)
2. Be highly shareable and discussion-worthy
3. Include a clear hook for the first 3 seconds
4. Have broad appeal while staying relevant to your niche",
        ),
    },
    Playbook {
        id: "contrarian-take-generator",
        name: "The Contrarian Take Generator",
        description: "Challenge conventional wisdom in your niche with a thoughtful, contrarian content idea.",
        category: "Creativity",
        inputs: &[
            PlaybookInput {
                id: "YOUR NICHE",
                label: "Your Niche",
                kind: InputKind::Text,
                placeholder: "e.g., Fitness and nutrition",
            },
            PlaybookInput {
                id: "POPULAR OPINION",
                label: "Popular Opinion",
                kind: InputKind::Text,
                placeholder: "e.g., \"Cardio is the best way to lose weight\"",
            },
        ],
        template: Some(
            "Take this popular opinion in [YOUR NICHE] and create a contrarian piece of content that challenges it: \"[POPULAR OPINION]\". For this, provide: a well-reasoned contrarian perspective, evidence or examples that support this view, a provocative title, and potential objections and how to address them. Ensure the contrarian take is thoughtful, not just controversial for attention.",
        ),
    },
];

/// Find a playbook by id.
pub fn find_playbook(id: &str) -> Option<&'static Playbook> {
    PLAYBOOKS.iter().find(|p| p.id == id)
}

/// Find a playbook by id, falling back to the first entry of the catalogue.
pub fn playbook_or_default(id: &str) -> &'static Playbook {
    find_playbook(id).unwrap_or(&PLAYBOOKS[0])
}
