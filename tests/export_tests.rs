//! End-to-end tests for the export pipeline.
//!
//! Slides are laid out from content, rasterised and packed into real
//! PNG, PDF and ZIP artifacts, which are then read back.

use std::io::{Cursor, Read};

use tempfile::TempDir;

use viralflow::content::{AspectRatio, ContentBody, ContentPart, UserInputs, ViralContent};
use viralflow::export::{
    file_stem, ExportError, Exporter, Rasterizer, Stage, ACTIVE_SLIDE_ID,
};

fn content(parts: usize, captions: &[&str], hashtags: &[&str]) -> ViralContent {
    ViralContent {
        body: ContentBody::Carousel(
            (1..=parts)
                .map(|i| ContentPart {
                    part_number: i as u32,
                    title: format!("Slide {}", i),
                    body: format!("Body text for slide {}", i),
                    highlight: Some("text".to_string()),
                })
                .collect(),
        ),
        captions: captions.iter().map(|s| s.to_string()).collect(),
        hashtags: hashtags.iter().map(|s| s.to_string()).collect(),
        next_topic_suggestion: String::new(),
    }
}

fn exporter() -> Exporter {
    Exporter::new(Rasterizer::with_scale(1))
}

fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

#[test]
fn test_zip_bundle_contents() {
    let inputs = UserInputs::default();
    let content = content(3, &["A", "B"], &["x", "#y"]);
    let stage = Stage::from_content(&content, &inputs, 0);

    let artifact = exporter()
        .export_zip(&stage, &file_stem(&inputs), Some(&content))
        .unwrap();
    assert_eq!(artifact.file_name, "Why_most_diets_fail.zip");

    let entries = zip_entries(&artifact.bytes);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["slide_1.png", "slide_2.png", "slide_3.png", "captions.txt", "hashtags.txt"]
    );
    assert_eq!(entries[3].1, b"A\n\n---\n\nB");
    assert_eq!(entries[4].1, b"#x #y");

    let slide = image::load_from_memory(&entries[0].1).unwrap();
    assert_eq!((slide.width(), slide.height()), (270, 270));
}

#[test]
fn test_zip_omits_empty_texts() {
    let inputs = UserInputs::default();
    let content = content(2, &[], &[]);
    let stage = Stage::from_content(&content, &inputs, 0);

    let artifact = exporter().export_zip(&stage, "x", Some(&content)).unwrap();
    let names: Vec<String> = zip_entries(&artifact.bytes).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["slide_1.png", "slide_2.png"]);
}

#[test]
fn test_zip_without_content_fails() {
    let inputs = UserInputs::default();
    let stage = Stage::from_content(&content(2, &[], &[]), &inputs, 0);
    let err = exporter().export_zip(&stage, "x", None).unwrap_err();
    assert!(matches!(err, ExportError::NoContent));
}

#[test]
fn test_pdf_has_one_page_per_slide() {
    let mut inputs = UserInputs::default();
    inputs.aspect_ratio = AspectRatio::Tall;
    let content = content(4, &[], &[]);
    let stage = Stage::from_content(&content, &inputs, 0);

    let artifact = exporter().export_pdf(&stage, "deck").unwrap();
    assert_eq!(artifact.file_name, "deck.pdf");

    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}

#[test]
fn test_png_of_active_slide() {
    let inputs = UserInputs::default();
    let stage = Stage::from_content(&content(3, &[], &[]), &inputs, 2);

    let artifact = exporter().export_png(&stage, "deck").unwrap();
    assert_eq!(artifact.file_name, "deck_slide.png");
    let image = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((image.width(), image.height()), (270, 270));
}

#[test]
fn test_png_default_scale_is_1080() {
    let mut inputs = UserInputs::default();
    inputs.aspect_ratio = AspectRatio::Tall;
    let stage = Stage::from_content(&content(3, &[], &[]), &inputs, 0);

    let artifact = Exporter::default().export_png(&stage, "deck").unwrap();
    let image = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((image.width(), image.height()), (1080, 1920));
}

#[test]
fn test_export_from_frames_directory() {
    let temp = TempDir::new().unwrap();
    for (name, shade) in [("slide_2.png", 200u8), ("slide_1.png", 10u8), ("notes.txt", 0)] {
        let path = temp.path().join(name);
        if name.ends_with(".png") {
            image::RgbImage::from_pixel(30, 30, image::Rgb([shade, shade, shade]))
                .save(&path)
                .unwrap();
        } else {
            std::fs::write(&path, "ignore me").unwrap();
        }
    }

    let stage = Stage::load_frames(temp.path(), AspectRatio::Square).unwrap();
    assert_eq!(stage.elements().len(), 2);
    assert!(stage.find_by_id(ACTIVE_SLIDE_ID).is_ok());

    let artifact = exporter().export_png(&stage, "frames").unwrap();
    let image = image::load_from_memory(&artifact.bytes).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (30, 30));
    // slide_1 (dark) is first and therefore active.
    assert!(image.get_pixel(15, 15).0[0] < 100);

    let artifact = exporter().export_pdf(&stage, "frames").unwrap();
    let doc = lopdf::Document::load_mem(&artifact.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[test]
fn test_empty_stage_errors() {
    let stage = Stage::new(AspectRatio::Square);
    assert!(matches!(
        exporter().export_png(&stage, "x"),
        Err(ExportError::ElementNotFound(_))
    ));
    assert!(matches!(
        exporter().export_pdf(&stage, "x"),
        Err(ExportError::NoElements)
    ));
}

#[test]
fn test_artifact_written_to_disk() {
    let temp = TempDir::new().unwrap();
    let inputs = UserInputs::default();
    let stage = Stage::from_content(&content(3, &[], &[]), &inputs, 0);

    let artifact = exporter().export_png(&stage, "deck").unwrap();
    let path = artifact.write_to(&temp.path().join("out")).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), artifact.bytes);
}

#[test]
fn test_unparseable_colors_paint_black() {
    let mut inputs = UserInputs::default();
    inputs.text_color = "#a\u{e9}bcd".to_string();
    inputs.highlight_color = "#\u{e9}\u{e9}\u{e9}".to_string();
    let stage = Stage::from_content(&content(3, &[], &[]), &inputs, 1);

    let artifact = exporter().export_png(&stage, "deck").unwrap();
    let image = image::load_from_memory(&artifact.bytes).unwrap().to_rgb8();
    assert!(image.pixels().any(|p| p.0 == [0, 0, 0]));
}
