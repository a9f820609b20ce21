//! Capture/export pipeline: turn rendered slides into PNG, PDF or ZIP artifacts.

mod exporter;
mod naming;
mod raster;
mod stage;

pub use exporter::{
    encode_png, pdf_page_size, ExportArtifact, Exporter, PDF_PAGE_HEIGHT_SQUARE,
    PDF_PAGE_HEIGHT_TALL, PDF_PAGE_WIDTH,
};
pub use naming::{
    captions_text, file_stem, hashtags_text, normalize_hashtag, CAPTION_SEPARATOR,
    DEFAULT_FILE_STEM,
};
pub use raster::{
    base_size, flatten_onto, paint_card, parse_color, Rasterize, Rasterizer, MAX_SCALE_FACTOR,
    SCALE_FACTOR,
};
pub use stage::{
    CaptureElement, ElementSource, SlideCard, SlidePalette, Stage, ACTIVE_SLIDE_ID,
    EXPORTABLE_CLASS, PART_INDEX_ATTR,
};

/// Artifact kinds a user can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png,
    Pdf,
    Zip,
}

impl ExportKind {
    pub fn label(self) -> &'static str {
        match self {
            ExportKind::Png => "PNG",
            ExportKind::Pdf => "PDF",
            ExportKind::Zip => "ZIP file",
        }
    }
}

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No element with id '{0}'")]
    ElementNotFound(String),

    #[error("No exportable slides found")]
    NoElements,

    #[error("No content to bundle")]
    NoContent,

    #[error("An export is already running")]
    Busy,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// The message shown to the user for a failed export of `kind`.
    pub fn user_message(&self, kind: ExportKind) -> String {
        match (self, kind) {
            (ExportError::ElementNotFound(_), _) => {
                "Could not find the active slide to download.".to_string()
            }
            (ExportError::NoElements | ExportError::NoContent, ExportKind::Zip) => {
                "Could not find slides or content to download.".to_string()
            }
            (ExportError::NoElements | ExportError::NoContent, _) => {
                "Could not find slides to download.".to_string()
            }
            (ExportError::Busy, _) => "An export is already in progress.".to_string(),
            (_, kind) => format!("Failed to create {}. Please try again.", kind.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ExportError::ElementNotFound(ACTIVE_SLIDE_ID.to_string()).user_message(ExportKind::Png),
            "Could not find the active slide to download."
        );
        assert_eq!(
            ExportError::NoElements.user_message(ExportKind::Pdf),
            "Could not find slides to download."
        );
        assert_eq!(
            ExportError::NoContent.user_message(ExportKind::Zip),
            "Could not find slides or content to download."
        );
        assert_eq!(
            ExportError::Pdf("bad".to_string()).user_message(ExportKind::Pdf),
            "Failed to create PDF. Please try again."
        );
        assert_eq!(
            ExportError::Io(std::io::Error::other("disk")).user_message(ExportKind::Zip),
            "Failed to create ZIP file. Please try again."
        );
    }
}
