//! PNG, PDF and ZIP artifacts built from a stage.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::naming::{
    captions_text, hashtags_text, pdf_file_name, png_file_name, slide_entry_name, zip_file_name,
};
use super::raster::{Rasterize, Rasterizer};
use super::stage::{Stage, ACTIVE_SLIDE_ID, EXPORTABLE_CLASS};
use super::ExportError;
use crate::content::{AspectRatio, ViralContent};

/// PDF page width in points, for both aspect ratios.
pub const PDF_PAGE_WIDTH: i64 = 810;
/// PDF page height in points for a square slide.
pub const PDF_PAGE_HEIGHT_SQUARE: i64 = 810;
/// PDF page height in points for a tall slide.
pub const PDF_PAGE_HEIGHT_TALL: i64 = 1440;

/// Page size in points for an aspect ratio.
pub fn pdf_page_size(aspect_ratio: AspectRatio) -> (i64, i64) {
    if aspect_ratio.is_square() {
        (PDF_PAGE_WIDTH, PDF_PAGE_HEIGHT_SQUARE)
    } else {
        (PDF_PAGE_WIDTH, PDF_PAGE_HEIGHT_TALL)
    }
}

/// A finished, named artifact held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Encode an image as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Builds artifacts from a stage with a pluggable rasteriser.
///
/// Elements are rasterised one at a time and encoded before the next one starts.
pub struct Exporter<R = Rasterizer> {
    rasterizer: R,
}

impl Default for Exporter<Rasterizer> {
    fn default() -> Self {
        Self::new(Rasterizer::default())
    }
}

impl<R: Rasterize> Exporter<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// `{stem}_slide.png` of the active slide.
    pub fn export_png(&self, stage: &Stage, stem: &str) -> Result<ExportArtifact, ExportError> {
        let element = stage.find_by_id(ACTIVE_SLIDE_ID)?;
        log::info!("Exporting active slide as PNG");
        let image = self.rasterizer.rasterize(element)?;
        Ok(ExportArtifact {
            file_name: png_file_name(stem),
            bytes: encode_png(&image)?,
        })
    }

    /// `{stem}.pdf` with one full-bleed page per exportable slide.
    pub fn export_pdf(&self, stage: &Stage, stem: &str) -> Result<ExportArtifact, ExportError> {
        let elements = stage.select_ordered(EXPORTABLE_CLASS)?;
        let (page_width, page_height) = pdf_page_size(stage.aspect_ratio());
        log::info!(
            "Exporting {} slides as PDF ({}x{} pt)",
            elements.len(),
            page_width,
            page_height
        );

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(elements.len());

        for element in elements {
            let image = self.rasterizer.rasterize(element)?;
            let (width, height) = image.dimensions();
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8i64,
                },
                image.into_raw(),
            ));

            // Stretch the unit-square image over the whole page.
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            page_width.into(),
                            0i64.into(),
                            0i64.into(),
                            page_height.into(),
                            0i64.into(),
                            0i64.into(),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let encoded = content
                .encode()
                .map_err(|e| ExportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im1" => image_id },
                },
                "MediaBox" => vec![0i64.into(), 0i64.into(), page_width.into(), page_height.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(ExportArtifact {
            file_name: pdf_file_name(stem),
            bytes,
        })
    }

    /// `{stem}.zip` holding `slide_<n>.png` plus the caption and hashtag texts.
    pub fn export_zip(
        &self,
        stage: &Stage,
        stem: &str,
        content: Option<&ViralContent>,
    ) -> Result<ExportArtifact, ExportError> {
        let elements = stage.select_ordered(EXPORTABLE_CLASS)?;
        let content = content.ok_or(ExportError::NoContent)?;
        log::info!("Exporting {} slides as ZIP", elements.len());

        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (position, element) in elements.into_iter().enumerate() {
            let image = self.rasterizer.rasterize(element)?;
            let png = encode_png(&image)?;
            zip.start_file(slide_entry_name(position), options)?;
            zip.write_all(&png)?;
        }

        if !content.captions.is_empty() {
            zip.start_file("captions.txt", options)?;
            zip.write_all(captions_text(&content.captions).as_bytes())?;
        }
        if !content.hashtags.is_empty() {
            zip.start_file("hashtags.txt", options)?;
            zip.write_all(hashtags_text(&content.hashtags).as_bytes())?;
        }

        let bytes = zip.finish()?.into_inner();
        Ok(ExportArtifact {
            file_name: zip_file_name(stem),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::stage::{CaptureElement, ElementSource, PART_INDEX_ATTR};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Paints each frame a flat 2x2 image and records the order it was asked for.
    #[derive(Default)]
    struct RecordingRasterizer {
        seen: RefCell<Vec<PathBuf>>,
    }

    impl Rasterize for RecordingRasterizer {
        fn rasterize(&self, element: &CaptureElement) -> Result<RgbImage, ExportError> {
            if let ElementSource::Frame(path) = &element.source {
                self.seen.borrow_mut().push(path.clone());
            }
            Ok(RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])))
        }
    }

    fn stage_of(indices: &[&str]) -> Stage {
        let mut stage = Stage::new(AspectRatio::Square);
        for (i, index) in indices.iter().enumerate() {
            let mut element = CaptureElement::new(ElementSource::Frame(PathBuf::from(index)))
                .with_class(EXPORTABLE_CLASS)
                .with_attribute(PART_INDEX_ATTR, index);
            if i == 0 {
                element = element.with_id(ACTIVE_SLIDE_ID);
            }
            stage.push(element);
        }
        stage
    }

    #[test]
    fn test_pdf_page_sizes() {
        assert_eq!(pdf_page_size(AspectRatio::Square), (810, 810));
        assert_eq!(pdf_page_size(AspectRatio::Tall), (810, 1440));
    }

    #[test]
    fn test_png_export_names_and_encodes() {
        let exporter = Exporter::new(RecordingRasterizer::default());
        let artifact = exporter.export_png(&stage_of(&["0"]), "topic").unwrap();
        assert_eq!(artifact.file_name, "topic_slide.png");
        assert_eq!(&artifact.bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_pdf_rasterizes_in_index_order() {
        let exporter = Exporter::new(RecordingRasterizer::default());
        let artifact = exporter.export_pdf(&stage_of(&["2", "0", "1"]), "deck").unwrap();

        assert_eq!(artifact.file_name, "deck.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(
            *exporter.rasterizer.seen.borrow(),
            vec![PathBuf::from("0"), PathBuf::from("1"), PathBuf::from("2")]
        );
    }

    #[test]
    fn test_zip_requires_content() {
        let exporter = Exporter::new(RecordingRasterizer::default());
        let result = exporter.export_zip(&stage_of(&["0"]), "x", None);
        assert!(matches!(result, Err(ExportError::NoContent)));
    }

    #[test]
    fn test_empty_stage_errors() {
        let exporter = Exporter::new(RecordingRasterizer::default());
        let stage = Stage::new(AspectRatio::Square);
        assert!(matches!(
            exporter.export_png(&stage, "x"),
            Err(ExportError::ElementNotFound(_))
        ));
        assert!(matches!(exporter.export_pdf(&stage, "x"), Err(ExportError::NoElements)));
    }
}
