//! Rasterisation of capture elements into opaque RGB images.

use image::imageops::FilterType;
use image::{Rgb, RgbImage, RgbaImage};

use super::stage::{CaptureElement, ElementSource, SlideCard};
use super::ExportError;
use crate::content::{Segment, SlideRole};

/// Upscale applied to every rasterised element.
pub const SCALE_FACTOR: u32 = 4;
/// Largest accepted upscale. Larger values are clamped.
pub const MAX_SCALE_FACTOR: u32 = 8;

/// Logical slide width before scaling.
pub const BASE_WIDTH: u32 = 270;
/// Logical height of a square slide.
pub const BASE_HEIGHT_SQUARE: u32 = 270;
/// Logical height of a tall slide.
pub const BASE_HEIGHT_TALL: u32 = 480;

const BACKGROUND: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
/// slate-400, used for the counter and the swipe marker.
const MUTED: Rgb<u8> = Rgb([0x94, 0xa3, 0xb8]);

/// Turns a capture element into pixels.
pub trait Rasterize {
    fn rasterize(&self, element: &CaptureElement) -> Result<RgbImage, ExportError>;
}

/// Built-in rasteriser: paints slide cards as a layout preview and loads frames from disk.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    scale: u32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            scale: SCALE_FACTOR,
        }
    }
}

impl Rasterizer {
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale: scale.clamp(1, MAX_SCALE_FACTOR),
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn rasterize_frame(&self, path: &std::path::Path) -> Result<RgbImage, ExportError> {
        let frame = image::open(path)?.to_rgba8();
        let flat = flatten_onto(&frame, BACKGROUND);
        if self.scale == 1 {
            return Ok(flat);
        }
        let (width, height) = scaled_dimensions(flat.width(), flat.height(), self.scale)?;
        Ok(image::imageops::resize(&flat, width, height, FilterType::Lanczos3))
    }
}

impl Rasterize for Rasterizer {
    fn rasterize(&self, element: &CaptureElement) -> Result<RgbImage, ExportError> {
        match &element.source {
            ElementSource::Card(card) => Ok(paint_card(card, self.scale)),
            ElementSource::Frame(path) => self.rasterize_frame(path),
        }
    }
}

/// `width` and `height` multiplied by `scale`, or a dimension error on overflow.
fn scaled_dimensions(width: u32, height: u32, scale: u32) -> Result<(u32, u32), ExportError> {
    match (width.checked_mul(scale), height.checked_mul(scale)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ExportError::Image(image::ImageError::Limits(
            image::error::LimitError::from_kind(image::error::LimitErrorKind::DimensionError),
        ))),
    }
}

/// Composite an RGBA image over an opaque background colour.
pub fn flatten_onto(image: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// Parse `#RGB` or `#RRGGBB`. Anything else falls back to black.
pub fn parse_color(value: &str) -> Rgb<u8> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Rgb([0, 0, 0]);
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        _ => hex.to_string(),
    };
    if expanded.len() != 6 {
        return Rgb([0, 0, 0]);
    }
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0);
    Rgb([channel(0), channel(2), channel(4)])
}

/// Logical (unscaled) size of a slide.
pub fn base_size(square: bool) -> (u32, u32) {
    if square {
        (BASE_WIDTH, BASE_HEIGHT_SQUARE)
    } else {
        (BASE_WIDTH, BASE_HEIGHT_TALL)
    }
}

/// A word-level text run: `chars` glyphs painted in `color`.
#[derive(Debug, Clone, Copy)]
struct Word {
    chars: u32,
    color: Rgb<u8>,
}

/// Text block geometry in logical units.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    glyph_width: u32,
    line_height: u32,
}

const TITLE_COVER: TextStyle = TextStyle { glyph_width: 9, line_height: 16 };
const TITLE_CTA: TextStyle = TextStyle { glyph_width: 8, line_height: 14 };
const TITLE_BODY: TextStyle = TextStyle { glyph_width: 7, line_height: 12 };
const BODY_TEXT: TextStyle = TextStyle { glyph_width: 4, line_height: 8 };
const BODY_TEXT_CTA: TextStyle = TextStyle { glyph_width: 5, line_height: 9 };

const PADDING: u32 = 20;
const HEADER_HEIGHT: u32 = 16;
const FOOTER_HEIGHT: u32 = 16;
const BLOCK_GAP: u32 = 8;

/// Scaled drawing surface.
struct Canvas {
    image: RgbImage,
    scale: u32,
}

impl Canvas {
    fn new(width: u32, height: u32, scale: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width * scale, height * scale, BACKGROUND),
            scale,
        }
    }

    /// Fill a logical rectangle, clipped to the canvas.
    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let (x0, y0) = (x * self.scale, y * self.scale);
        let x1 = ((x + w) * self.scale).min(self.image.width());
        let y1 = ((y + h) * self.scale).min(self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, color);
            }
        }
    }
}

/// Break words into lines no wider than `max_width`.
fn wrap(words: &[Word], style: TextStyle, max_width: u32) -> Vec<Vec<Word>> {
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut width = 0;
    for word in words {
        let word_width = (word.chars * style.glyph_width).min(max_width);
        let needed = if current.is_empty() {
            word_width
        } else {
            width + style.glyph_width + word_width
        };
        if needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            width = word_width;
        } else {
            width = needed;
        }
        current.push(*word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn line_width(line: &[Word], style: TextStyle, max_width: u32) -> u32 {
    let glyphs: u32 = line
        .iter()
        .map(|w| (w.chars * style.glyph_width).min(max_width))
        .sum();
    let gaps = line.len().saturating_sub(1) as u32 * style.glyph_width;
    (glyphs + gaps).min(max_width)
}

fn words_of(text: &str, color: Rgb<u8>) -> impl Iterator<Item = Word> + '_ {
    text.split_whitespace().map(move |w| Word {
        chars: w.chars().count() as u32,
        color,
    })
}

/// Laid-out text block ready to paint.
struct Block {
    lines: Vec<Vec<Word>>,
    style: TextStyle,
}

impl Block {
    fn new(words: Vec<Word>, style: TextStyle, max_width: u32) -> Self {
        Self {
            lines: wrap(&words, style, max_width),
            style,
        }
    }

    fn height(&self) -> u32 {
        self.lines.len() as u32 * self.style.line_height
    }

    fn paint(&self, canvas: &mut Canvas, left: u32, top: u32, max_width: u32, centered: bool) {
        let ink = (self.style.line_height * 2 / 3).max(1);
        for (row, line) in self.lines.iter().enumerate() {
            let offset = if centered {
                (max_width - line_width(line, self.style, max_width)) / 2
            } else {
                0
            };
            let mut x = left + offset;
            let y = top + row as u32 * self.style.line_height;
            for word in line {
                let w = (word.chars * self.style.glyph_width).min(max_width);
                canvas.fill(x, y, w, ink, word.color);
                x += w + self.style.glyph_width;
            }
        }
    }
}

/// Paint a slide card as a layout preview at `scale`.
pub fn paint_card(card: &SlideCard, scale: u32) -> RgbImage {
    let (width, height) = base_size(card.aspect_ratio.is_square());
    let mut canvas = Canvas::new(width, height, scale.clamp(1, MAX_SCALE_FACTOR));
    let text_color = parse_color(&card.palette.text);
    let highlight_color = parse_color(&card.palette.highlight);
    let title_color = parse_color(&card.palette.title);
    let role = card.role();
    let content_width = width - 2 * PADDING;

    if role != SlideRole::Cover {
        canvas.fill(width - 40, 16, 40, 2, highlight_color);
    }

    // Header: watermark on the left, "n / total" counter on the right.
    if let Some(watermark) = card.watermark.as_deref() {
        let w = (watermark.chars().count() as u32 * 4).min(content_width / 2);
        canvas.fill(PADDING, PADDING, w, 5, text_color);
    }
    let counter = format!("{} / {}", card.position, card.total);
    let counter_width = counter.chars().count() as u32 * 4;
    canvas.fill(width - PADDING - counter_width, PADDING, counter_width, 5, MUTED);

    let (title_style, body_style) = match role {
        SlideRole::Cover => (TITLE_COVER, BODY_TEXT),
        SlideRole::CallToAction => (TITLE_CTA, BODY_TEXT_CTA),
        SlideRole::Body => (TITLE_BODY, BODY_TEXT),
    };
    let title = Block::new(
        words_of(&card.part.title, title_color).collect(),
        title_style,
        content_width,
    );
    let body_words: Vec<Word> = if role == SlideRole::Body {
        card.part
            .segments()
            .into_iter()
            .flat_map(|segment| {
                let color = match segment {
                    Segment::Plain(_) => text_color,
                    Segment::Emphasis(_) => highlight_color,
                };
                words_of(segment.text(), color)
            })
            .collect()
    } else {
        words_of(&card.part.body, text_color).collect()
    };
    let body = Block::new(body_words, body_style, content_width);

    // Main area is vertically centred between header and footer.
    let main_top = PADDING + HEADER_HEIGHT;
    let main_bottom = height - PADDING - FOOTER_HEIGHT;
    let main_height = main_bottom.saturating_sub(main_top);
    let block_height = title.height() + BLOCK_GAP + body.height();
    let top = main_top + main_height.saturating_sub(block_height) / 2;
    let centered = role == SlideRole::CallToAction;
    title.paint(&mut canvas, PADDING, top, content_width, centered);
    body.paint(
        &mut canvas,
        PADDING,
        top + title.height() + BLOCK_GAP,
        content_width,
        centered,
    );

    if role != SlideRole::CallToAction {
        let y = height - PADDING - FOOTER_HEIGHT / 2;
        canvas.fill(PADDING, y, 20, 3, MUTED);
        // Chevron
        for step in 0..3 {
            canvas.fill(PADDING + 24 + step, y - 2 + step, 1, 7 - 2 * step, MUTED);
        }
    }

    canvas.image
}
