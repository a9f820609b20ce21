//! Slide layout helpers: role of a part within a sequence and highlight segmentation.

use super::types::ContentPart;

/// Position-dependent layout role of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideRole {
    /// First part, the hook.
    Cover,
    Body,
    /// Last part, the call to action.
    CallToAction,
}

impl SlideRole {
    /// Role for the 1-based `position` within `total` parts.
    ///
    /// A single-part sequence is rendered as a cover.
    pub fn for_position(position: usize, total: usize) -> Self {
        if position <= 1 {
            SlideRole::Cover
        } else if position >= total {
            SlideRole::CallToAction
        } else {
            SlideRole::Body
        }
    }
}

/// A run of body text, either plain or emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Emphasis(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(s) | Segment::Emphasis(s) => *s,
        }
    }
}

impl ContentPart {
    /// The highlight, only when it literally occurs in the body.
    pub fn effective_highlight(&self) -> Option<&str> {
        self.highlight
            .as_deref()
            .filter(|h| !h.is_empty() && self.body.contains(h))
    }

    /// Split the body into plain runs separated by every occurrence of the highlight.
    ///
    /// Concatenating the segment texts always reproduces the body.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let Some(highlight) = self.effective_highlight() else {
            return vec![Segment::Plain(&self.body)];
        };

        let mut segments = Vec::new();
        let mut pieces = self.body.split(highlight).peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                segments.push(Segment::Plain(piece));
            }
            if pieces.peek().is_some() {
                segments.push(Segment::Emphasis(highlight));
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(body: &str, highlight: Option<&str>) -> ContentPart {
        ContentPart {
            part_number: 2,
            title: "t".to_string(),
            body: body.to_string(),
            highlight: highlight.map(str::to_string),
        }
    }

    fn rejoin(segments: &[Segment<'_>]) -> String {
        segments.iter().map(Segment::text).collect()
    }

    #[test]
    fn test_roles_by_position() {
        assert_eq!(SlideRole::for_position(1, 5), SlideRole::Cover);
        assert_eq!(SlideRole::for_position(3, 5), SlideRole::Body);
        assert_eq!(SlideRole::for_position(5, 5), SlideRole::CallToAction);
        assert_eq!(SlideRole::for_position(1, 1), SlideRole::Cover);
    }

    #[test]
    fn test_segments_without_highlight() {
        let p = part("plain body", None);
        assert_eq!(p.segments(), vec![Segment::Plain("plain body")]);
    }

    #[test]
    fn test_segments_with_missing_highlight() {
        let p = part("plain body", Some("absent"));
        assert_eq!(p.effective_highlight(), None);
        assert_eq!(p.segments(), vec![Segment::Plain("plain body")]);
    }

    #[test]
    fn test_segments_with_empty_highlight() {
        let p = part("plain body", Some(""));
        assert_eq!(p.segments(), vec![Segment::Plain("plain body")]);
    }

    #[test]
    fn test_segments_emphasise_every_occurrence() {
        let p = part("eat less, eat better, eat less", Some("eat less"));
        assert_eq!(
            p.segments(),
            vec![
                Segment::Emphasis("eat less"),
                Segment::Plain(", eat better, "),
                Segment::Emphasis("eat less"),
            ]
        );
    }

    #[test]
    fn test_segments_rejoin_to_body() {
        let cases = [
            ("Diets fail because willpower fails.", "willpower"),
            ("aaa", "a"),
            ("x marks the spot", "spot"),
            ("unicode ✨ sparkle ✨ twice", "✨"),
            ("highlight is whole", "highlight is whole"),
        ];
        for (body, highlight) in cases {
            let p = part(body, Some(highlight));
            assert_eq!(rejoin(&p.segments()), body, "body: {}", body);
        }
    }
}
