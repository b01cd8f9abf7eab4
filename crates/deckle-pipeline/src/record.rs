//! The accepted-image record model.
//!
//! An [`ImageRecord`] is created once a file survives validation and
//! exact-duplicate suppression, and is never mutated afterwards: the
//! only lifecycle event after creation is removal from the accepted set
//! by an explicit duplicate-resolution decision.

use std::fmt;
use std::io::Cursor;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fingerprint::Fingerprint;
use crate::types::IngestError;

/// Opaque identifier of one accepted image, unique within a session and
/// stable for the record's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RecordId(u64);

impl RecordId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// SHA-256 digest of a file's raw byte content, used to suppress exact
/// duplicates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest the given payload.
    #[must_use]
    pub fn compute(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Lowercase hex rendering of the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full digests are noise in debug output; eight hex chars identify.
        write!(f, "ContentDigest({}..)", &self.to_hex()[..8])
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One accepted image: identity, derived geometry, fingerprint, and the
/// owned payloads.
///
/// Fields are private; nothing outside record construction can alter a
/// record once it is in the accepted set.
pub struct ImageRecord {
    id: RecordId,
    display_name: String,
    digest: ContentDigest,
    width: u32,
    height: u32,
    aspect_ratio: f64,
    fingerprint: Fingerprint,
    raw: Vec<u8>,
    preview: Vec<u8>,
}

impl ImageRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: RecordId,
        display_name: String,
        digest: ContentDigest,
        width: u32,
        height: u32,
        fingerprint: Fingerprint,
        raw: Vec<u8>,
        preview: Vec<u8>,
    ) -> Self {
        Self {
            id,
            display_name,
            digest,
            width,
            height,
            aspect_ratio: f64::from(width) / f64::from(height),
            fingerprint,
            raw,
            preview,
        }
    }

    /// Session-unique identifier, assigned at ingestion.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Original filename, for user-facing messages only (not unique).
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Digest of the raw byte content.
    #[must_use]
    pub const fn digest(&self) -> ContentDigest {
        self.digest
    }

    /// Natural pixel width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Natural pixel height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `width * height`, the resolution proxy used to break duplicate
    /// ties in favor of the sharper copy.
    #[must_use]
    pub const fn pixel_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// `width / height`, computed once at creation and preserved through
    /// every resize.
    #[must_use]
    pub const fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// The perceptual fingerprint computed at ingestion.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The original byte payload, required for export. Never mutated.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// PNG-encoded downscaled rendering for UI use; never exported.
    #[must_use]
    pub fn preview(&self) -> &[u8] {
        &self.preview
    }
}

impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Omit the payloads: raw content can run to hundreds of megabytes.
        f.debug_struct("ImageRecord")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("digest", &self.digest)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("aspect_ratio", &self.aspect_ratio)
            .finish_non_exhaustive()
    }
}

/// Downscale a decoded image so its longest edge fits `max_edge` and
/// encode the result as PNG. The aspect ratio is preserved, and images
/// already within the bound are re-encoded without upscaling.
///
/// # Errors
///
/// Returns [`IngestError::UnreadableImage`] if PNG encoding fails.
pub(crate) fn encode_preview(
    image: &DynamicImage,
    max_edge: u32,
) -> Result<Vec<u8>, IngestError> {
    let mut buffer = Cursor::new(Vec::new());
    if image.width() <= max_edge && image.height() <= max_edge {
        image.write_to(&mut buffer, image::ImageFormat::Png)?;
    } else {
        image
            .thumbnail(max_edge, max_edge)
            .write_to(&mut buffer, image::ImageFormat::Png)?;
    }
    Ok(buffer.into_inner())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_record(id: u64, width: u32, height: u32) -> ImageRecord {
        ImageRecord::new(
            RecordId::new(id),
            format!("img-{id}.png"),
            ContentDigest::compute(&id.to_le_bytes()),
            width,
            height,
            Fingerprint::from_bytes(&[0u8; 8]).unwrap(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let record = sample_record(1, 800, 600);
        assert!((record.aspect_ratio() - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn pixel_area_is_width_times_height() {
        let record = sample_record(2, 800, 600);
        assert_eq!(record.pixel_area(), 480_000);
    }

    #[test]
    fn digest_matches_content_not_name() {
        let a = ContentDigest::compute(b"same bytes");
        let b = ContentDigest::compute(b"same bytes");
        let c = ContentDigest::compute(b"other bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn digest_hex_is_64_chars() {
        let digest = ContentDigest::compute(b"payload");
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn record_id_display_is_numbered() {
        assert_eq!(RecordId::new(7).to_string(), "#7");
    }

    #[test]
    fn preview_fits_within_max_edge_and_decodes() {
        let source = DynamicImage::ImageRgba8(image::RgbaImage::from_fn(
            400,
            300,
            |x, y| image::Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255]),
        ));
        let preview = encode_preview(&source, 260).unwrap();
        let decoded = image::load_from_memory(&preview).unwrap();
        assert!(decoded.width() <= 260);
        assert!(decoded.height() <= 260);
        // Ratio preserved through the downscale.
        let ratio = f64::from(decoded.width()) / f64::from(decoded.height());
        assert!((ratio - 400.0 / 300.0).abs() < 0.05);
    }

    #[test]
    fn preview_of_small_image_is_not_upscaled() {
        let source = DynamicImage::ImageRgba8(image::RgbaImage::from_fn(40, 30, |_, _| {
            image::Rgba([10, 20, 30, 255])
        }));
        let preview = encode_preview(&source, 260).unwrap();
        let decoded = image::load_from_memory(&preview).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
