//! The in-memory page: rendered slides addressable by id, class and index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::content::{AspectRatio, ContentPart, SlideRole, UserInputs, ViralContent};

use super::ExportError;

/// Id carried by the slide currently shown in the viewer.
pub const ACTIVE_SLIDE_ID: &str = "active-slide-container";

/// Class carried by every slide that multi-page exports pick up.
pub const EXPORTABLE_CLASS: &str = "slide-for-capture";

/// Attribute holding a slide's numeric position.
pub const PART_INDEX_ATTR: &str = "data-part-index";

/// Colours a slide is painted with, as `#RRGGBB` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePalette {
    pub text: String,
    pub highlight: String,
    pub title: String,
}

impl SlidePalette {
    pub fn from_inputs(inputs: &UserInputs) -> Self {
        Self {
            text: inputs.text_color.clone(),
            highlight: inputs.highlight_color.clone(),
            title: inputs.title_color.clone(),
        }
    }
}

/// A laid-out slide for one content part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideCard {
    pub part: ContentPart,
    /// 1-based position within the sequence.
    pub position: usize,
    pub total: usize,
    pub watermark: Option<String>,
    pub palette: SlidePalette,
    pub aspect_ratio: AspectRatio,
}

impl SlideCard {
    pub fn role(&self) -> SlideRole {
        SlideRole::for_position(self.position, self.total)
    }
}

/// What an element shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSource {
    Card(SlideCard),
    /// A pre-rendered frame on disk.
    Frame(PathBuf),
}

/// One addressable visual element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureElement {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub source: ElementSource,
}

impl CaptureElement {
    pub fn new(source: ElementSource) -> Self {
        Self {
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            source,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// The numeric part index; missing or unparseable means 0.
    pub fn part_index(&self) -> i64 {
        self.attributes
            .get(PART_INDEX_ATTR)
            .and_then(|v| parse_leading_int(v))
            .unwrap_or(0)
    }
}

/// Parse an optionally signed run of leading digits, ignoring what follows.
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// The set of elements currently rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    elements: Vec<CaptureElement>,
    aspect_ratio: AspectRatio,
}

impl Stage {
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self {
            elements: Vec::new(),
            aspect_ratio,
        }
    }

    pub fn push(&mut self, element: CaptureElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[CaptureElement] {
        &self.elements
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Lay out one slide per content part. The slide at `active` carries the active id.
    ///
    /// Non-carousel content produces an empty stage.
    pub fn from_content(content: &ViralContent, inputs: &UserInputs, active: usize) -> Self {
        let mut stage = Self::new(inputs.aspect_ratio);
        let Some(parts) = content.parts() else {
            return stage;
        };

        let palette = SlidePalette::from_inputs(inputs);
        let watermark = inputs.watermark().map(str::to_string);
        for (index, part) in parts.iter().enumerate() {
            let card = SlideCard {
                part: part.clone(),
                position: index + 1,
                total: parts.len(),
                watermark: watermark.clone(),
                palette: palette.clone(),
                aspect_ratio: inputs.aspect_ratio,
            };
            let mut element = CaptureElement::new(ElementSource::Card(card))
                .with_class(EXPORTABLE_CLASS)
                .with_attribute(PART_INDEX_ATTR, &index.to_string());
            if index == active {
                element = element.with_id(ACTIVE_SLIDE_ID);
            }
            stage.push(element);
        }
        stage
    }

    /// Build a stage from pre-rendered PNG/JPEG frames in `dir`.
    ///
    /// The index of each frame comes from the digits in its file stem
    /// (`slide_3.png` → 3), or 0. The frame with the lowest index is active.
    pub fn load_frames(dir: &Path, aspect_ratio: AspectRatio) -> Result<Self, ExportError> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if !is_image || !path.is_file() {
                continue;
            }
            let index = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(stem_index)
                .unwrap_or(0);
            frames.push((index, path));
        }
        frames.sort();
        log::debug!("Loaded {} frames from {}", frames.len(), dir.display());

        let mut stage = Self::new(aspect_ratio);
        for (position, (index, path)) in frames.into_iter().enumerate() {
            let mut element = CaptureElement::new(ElementSource::Frame(path))
                .with_class(EXPORTABLE_CLASS)
                .with_attribute(PART_INDEX_ATTR, &index.to_string());
            if position == 0 {
                element = element.with_id(ACTIVE_SLIDE_ID);
            }
            stage.push(element);
        }
        Ok(stage)
    }

    /// Move the active id to the element at `position` in stage order.
    pub fn set_active(&mut self, position: usize) -> bool {
        if position >= self.elements.len() {
            return false;
        }
        for element in &mut self.elements {
            if element.id.as_deref() == Some(ACTIVE_SLIDE_ID) {
                element.id = None;
            }
        }
        self.elements[position].id = Some(ACTIVE_SLIDE_ID.to_string());
        true
    }

    /// The single element with `id`.
    pub fn find_by_id(&self, id: &str) -> Result<&CaptureElement, ExportError> {
        self.elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| ExportError::ElementNotFound(id.to_string()))
    }

    /// Every element with `class`, ascending by part index. Ties keep stage order.
    pub fn select_ordered(&self, class: &str) -> Result<Vec<&CaptureElement>, ExportError> {
        let mut selected: Vec<&CaptureElement> =
            self.elements.iter().filter(|e| e.has_class(class)).collect();
        if selected.is_empty() {
            return Err(ExportError::NoElements);
        }
        selected.sort_by_key(|e| e.part_index());
        Ok(selected)
    }
}

/// Concatenated digits of a file stem, or 0.
fn stem_index(stem: &str) -> i64 {
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentBody;

    fn content(n: usize) -> ViralContent {
        ViralContent {
            body: ContentBody::Carousel(
                (1..=n)
                    .map(|i| ContentPart {
                        part_number: i as u32,
                        title: format!("Title {}", i),
                        body: format!("Body {}", i),
                        highlight: None,
                    })
                    .collect(),
            ),
            captions: vec![],
            hashtags: vec![],
            next_topic_suggestion: String::new(),
        }
    }

    #[test]
    fn test_from_content_tags_elements() {
        let stage = Stage::from_content(&content(3), &UserInputs::default(), 1);
        assert_eq!(stage.elements().len(), 3);
        assert!(stage.elements().iter().all(|e| e.has_class(EXPORTABLE_CLASS)));

        let active = stage.find_by_id(ACTIVE_SLIDE_ID).unwrap();
        assert_eq!(active.part_index(), 1);
    }

    #[test]
    fn test_from_content_roles() {
        let stage = Stage::from_content(&content(3), &UserInputs::default(), 0);
        let roles: Vec<SlideRole> = stage
            .elements()
            .iter()
            .map(|e| match &e.source {
                ElementSource::Card(card) => card.role(),
                ElementSource::Frame(_) => panic!("expected cards"),
            })
            .collect();
        assert_eq!(
            roles,
            vec![SlideRole::Cover, SlideRole::Body, SlideRole::CallToAction]
        );
    }

    #[test]
    fn test_from_content_without_parts_is_empty() {
        let script = ViralContent {
            body: ContentBody::Script("s".to_string()),
            ..content(0)
        };
        let stage = Stage::from_content(&script, &UserInputs::default(), 0);
        assert!(stage.is_empty());
        assert!(matches!(stage.find_by_id(ACTIVE_SLIDE_ID), Err(ExportError::ElementNotFound(_))));
        assert!(matches!(stage.select_ordered(EXPORTABLE_CLASS), Err(ExportError::NoElements)));
    }

    #[test]
    fn test_part_index_parsing() {
        let el = |v: Option<&str>| {
            let e = CaptureElement::new(ElementSource::Frame(PathBuf::from("x.png")));
            match v {
                Some(v) => e.with_attribute(PART_INDEX_ATTR, v),
                None => e,
            }
        };
        assert_eq!(el(Some("4")).part_index(), 4);
        assert_eq!(el(Some("12px")).part_index(), 12);
        assert_eq!(el(Some("-2")).part_index(), -2);
        assert_eq!(el(Some("abc")).part_index(), 0);
        assert_eq!(el(None).part_index(), 0);
    }

    #[test]
    fn test_select_ordered_sorts_by_index() {
        let mut stage = Stage::new(AspectRatio::Square);
        for (name, index) in [("c", Some("2")), ("a", None), ("b", Some("1")), ("z", Some("x"))] {
            let mut e = CaptureElement::new(ElementSource::Frame(PathBuf::from(name)))
                .with_class(EXPORTABLE_CLASS);
            if let Some(index) = index {
                e = e.with_attribute(PART_INDEX_ATTR, index);
            }
            stage.push(e);
        }
        stage.push(CaptureElement::new(ElementSource::Frame(PathBuf::from("untagged"))));

        let order: Vec<PathBuf> = stage
            .select_ordered(EXPORTABLE_CLASS)
            .unwrap()
            .into_iter()
            .map(|e| match &e.source {
                ElementSource::Frame(p) => p.clone(),
                ElementSource::Card(_) => unreachable!(),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("a"),
                PathBuf::from("z"),
                PathBuf::from("b"),
                PathBuf::from("c")
            ]
        );
    }

    #[test]
    fn test_stem_index() {
        assert_eq!(stem_index("slide_3"), 3);
        assert_eq!(stem_index("frame-10"), 10);
        assert_eq!(stem_index("cover"), 0);
    }
}
