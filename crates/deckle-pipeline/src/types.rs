//! Shared types for the deckle ingestion and layout pipeline.

use serde::{Deserialize, Serialize};

use crate::dedup::DuplicateCandidate;
use crate::fingerprint::FingerprintAlgorithm;
use crate::record::RecordId;

/// Millimetres per inch, used to express the inch-based page defaults in
/// the millimetre unit the rest of the geometry uses.
pub const MM_PER_INCH: f64 = 25.4;

/// Default page width: 13.33 inches, a 16:9 slide.
const DEFAULT_PAGE_WIDTH_MM: f64 = 13.33 * MM_PER_INCH;

/// Default page height: 7.5 inches.
const DEFAULT_PAGE_HEIGHT_MM: f64 = 7.5 * MM_PER_INCH;

/// Configuration for one ingestion session.
///
/// All parameters have sensible defaults; every value is overridable by
/// the caller before the session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum Hamming distance between two perceptual fingerprints for
    /// the pair to be reported as a near-duplicate. Smaller is stricter.
    pub threshold: u32,

    /// Which perceptual hash algorithm to fingerprint images with.
    pub algorithm: FingerprintAlgorithm,

    /// Per-file input size ceiling in bytes. Larger payloads are rejected
    /// before any decoding is attempted.
    pub max_input_bytes: u64,

    /// Longest edge of the downscaled preview kept on each record, pixels.
    pub preview_max_edge: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            algorithm: FingerprintAlgorithm::default(),
            max_input_bytes: 1024 * 1024 * 1024,
            preview_max_edge: 260,
        }
    }
}

/// Page geometry for the layout engine, all values in millimetres.
///
/// Defaults describe a 16:9 slide (13.33 × 7.5 inches) with images
/// rendered 40 mm tall, no left margin, a 10 mm top margin, and 2.5 mm
/// between items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Usable page width. There is no right margin: a row is full once the
    /// next item would cross the page's right edge.
    pub page_width: f64,

    /// Page height. The bottom boundary for rows is `page_height - top_margin`.
    pub page_height: f64,

    /// Horizontal start position of every row.
    pub left_margin: f64,

    /// Vertical start position of the first row on every page.
    pub top_margin: f64,

    /// Gap between items in a row, and between rows.
    pub spacing: f64,

    /// Rendered height of every item. Width varies with aspect ratio.
    pub item_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH_MM,
            page_height: DEFAULT_PAGE_HEIGHT_MM,
            left_margin: 0.0,
            top_margin: 10.0,
            spacing: 2.5,
            item_height: 40.0,
        }
    }
}

/// Errors that reject a single file during ingestion.
///
/// A rejection never aborts the batch: the offending file is skipped and
/// reported, and ingestion of the remaining files continues.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The payload could not be decoded as a raster image.
    #[error("failed to decode image: {0}")]
    UnreadableImage(#[from] image::ImageError),

    /// The payload decoded to an image with zero width or height.
    #[error("decoded image has zero width or height")]
    EmptyImage,

    /// The payload exceeds the configured per-file size ceiling.
    #[error("input is {actual} bytes, over the {limit}-byte ceiling")]
    OversizeInput {
        /// Size of the offending payload.
        actual: u64,
        /// The configured ceiling it crossed.
        limit: u64,
    },
}

/// Terminal state of the per-file ingestion state machine.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was accepted and appended to the session.
    ///
    /// `collision` carries the perceptual near-duplicate candidate found
    /// against the previously accepted set, if any. The record is in the
    /// accepted set either way; resolution is a separate, later step.
    Inserted {
        /// Id of the newly created record.
        id: RecordId,
        /// Near-duplicate pair proposed by the resolver, if one was found.
        collision: Option<DuplicateCandidate>,
    },

    /// Byte-identical content was already processed this session; the file
    /// was silently skipped. Not an error.
    SkippedExactDuplicate,

    /// The file was rejected and skipped.
    Rejected(IngestError),
}

/// One file's name paired with its terminal ingestion outcome.
#[derive(Debug)]
pub struct FileReport {
    /// Original filename, for user-facing reporting only.
    pub name: String,
    /// How ingestion of this file ended.
    pub outcome: FileOutcome,
}
