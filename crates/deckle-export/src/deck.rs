//! The export driver: walks placements, feeds an abstract picture sink,
//! and reports progress.
//!
//! The driver does not know what document format it is producing: it
//! only needs a [`PictureSink`]'s "open a page" and "place this picture
//! at (x, y) with this size" capabilities. Serializers implement the
//! trait; `SvgDeck` in this crate is the reference implementation.

use std::time::Instant;

use log::info;
use thiserror::Error;

use deckle_pipeline::{DeckSession, Placement, RecordId};

/// How often the progress callback fires, in placed items.
pub const PROGRESS_CADENCE: usize = 5;

/// Fraction of the progress range reserved for the final serialization
/// step inside [`PictureSink::finish`].
const FINAL_STEP_RESERVE: f64 = 0.95;

/// Errors raised while serializing a deck.
///
/// Export failure is terminal for the attempt only: the session and its
/// placements remain valid and a retry is always possible.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A placement references a record that is not in the session,
    /// typically a layout computed before discards were applied.
    #[error("placement references unknown record {0}")]
    UnknownRecord(RecordId),

    /// A picture was placed before any page was opened.
    #[error("picture placed before any page was opened")]
    MissingPage,

    /// A page was opened out of sequence.
    #[error("page {got} opened out of order (expected {expected})")]
    PageOrder {
        /// The index the sink expected next.
        expected: usize,
        /// The index it was given.
        got: usize,
    },

    /// A raw payload is not in a raster format the sink can embed.
    #[error("payload is not a supported raster format")]
    UnsupportedImage,

    /// An image operation inside a sink failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// An abstract document being assembled one page and one picture at a
/// time.
///
/// The driver calls [`begin_page`](Self::begin_page) with strictly
/// increasing indices starting at 0, places every picture for that page,
/// and finally calls [`finish`](Self::finish) exactly once to obtain the
/// serialized blob.
pub trait PictureSink {
    /// Open page `index` (0-based).
    ///
    /// # Errors
    ///
    /// Implementations reject out-of-order indices with
    /// [`ExportError::PageOrder`].
    fn begin_page(&mut self, index: usize) -> Result<(), ExportError>;

    /// Place one picture on the most recently opened page. Position and
    /// size come from the placement, in millimetres; `raw` is the
    /// image's original byte payload.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingPage`] if no page is open, or a
    /// format error if `raw` cannot be embedded.
    fn place_picture(&mut self, placement: &Placement, raw: &[u8]) -> Result<(), ExportError>;

    /// Serialize the accumulated document into a single blob.
    ///
    /// # Errors
    ///
    /// Any serialization failure of the concrete format.
    fn finish(self) -> Result<Vec<u8>, ExportError>;
}

/// Serialize `placements` through `sink` and return the document blob.
///
/// `placements` must be in layout order (non-decreasing page indices);
/// pages are opened lazily as the page index advances. The optional
/// `progress` callback receives `(fraction_complete,
/// estimated_seconds_remaining)` every [`PROGRESS_CADENCE`] items (the
/// fraction is scaled by 0.95 to reserve the final serialization step)
/// and a final `(1.0, 0.0)` once the blob exists. Progress is advisory
/// only.
///
/// # Errors
///
/// Returns [`ExportError::UnknownRecord`] if a placement's record is no
/// longer in the session, or whatever the sink raises. A failed export
/// leaves the session untouched.
#[allow(clippy::cast_precision_loss)]
pub fn render_deck<S: PictureSink>(
    session: &DeckSession,
    placements: &[Placement],
    mut sink: S,
    mut progress: Option<&mut dyn FnMut(f64, f64)>,
) -> Result<Vec<u8>, ExportError> {
    let total = placements.len();
    let started = Instant::now();
    let mut open_page: Option<usize> = None;

    for (index, placement) in placements.iter().enumerate() {
        loop {
            let next = open_page.map_or(0, |page| page + 1);
            if next > placement.page {
                break;
            }
            sink.begin_page(next)?;
            open_page = Some(next);
        }

        let record = session
            .record(placement.id)
            .ok_or(ExportError::UnknownRecord(placement.id))?;
        sink.place_picture(placement, record.raw())?;

        if index % PROGRESS_CADENCE == 0 {
            if let Some(callback) = progress.as_mut() {
                let elapsed = started.elapsed().as_secs_f64();
                let average = elapsed / (index + 1) as f64;
                let remaining = average * (total - index - 1) as f64;
                callback(index as f64 / total as f64 * FINAL_STEP_RESERVE, remaining);
            }
        }
    }

    let blob = sink.finish()?;
    if let Some(callback) = progress.as_mut() {
        callback(1.0, 0.0);
    }

    info!(
        "exported {total} placement(s) across {} page(s), {} bytes",
        open_page.map_or(0, |page| page + 1),
        blob.len(),
    );
    Ok(blob)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use deckle_pipeline::{FileOutcome, SessionConfig, ingest_file};

    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sink that records the call sequence into a shared log (the driver
    /// consumes the sink in `finish`, so the log lives outside it).
    #[derive(Default)]
    struct RecordingSink {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingSink {
        fn with_log(events: Rc<RefCell<Vec<String>>>) -> Self {
            Self { events }
        }
    }

    impl PictureSink for RecordingSink {
        fn begin_page(&mut self, index: usize) -> Result<(), ExportError> {
            self.events.borrow_mut().push(format!("page {index}"));
            Ok(())
        }

        fn place_picture(
            &mut self,
            placement: &Placement,
            raw: &[u8],
        ) -> Result<(), ExportError> {
            self.events
                .borrow_mut()
                .push(format!("place {} ({} bytes)", placement.id, raw.len()));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, ExportError> {
            self.events.borrow_mut().push("finish".to_owned());
            Ok(b"blob".to_vec())
        }
    }

    fn noise_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            let v = x
                .wrapping_mul(31)
                .wrapping_add(y.wrapping_mul(17))
                .wrapping_add(seed.wrapping_mul(97));
            image::Rgba([(v % 251) as u8, (v % 241) as u8, (v % 239) as u8, 255])
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn session_with(count: u32) -> DeckSession {
        let mut session = DeckSession::new(SessionConfig {
            threshold: 0,
            ..SessionConfig::default()
        });
        for seed in 0..count {
            let outcome =
                ingest_file(&mut session, &format!("img-{seed}.png"), noise_png(64, 48, seed));
            assert!(matches!(outcome, FileOutcome::Inserted { .. }));
        }
        session
    }

    #[test]
    fn pages_open_lazily_and_in_order() {
        let session = session_with(3);
        let placements = session.layout(&deckle_pipeline::LayoutConfig::default());

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink::with_log(Rc::clone(&log));
        render_deck(&session, &placements, sink, None).unwrap();

        let events = log.borrow();
        assert_eq!(events.first().map(String::as_str), Some("page 0"));
        assert_eq!(events.last().map(String::as_str), Some("finish"));
        assert_eq!(events.iter().filter(|e| e.starts_with("place")).count(), 3);
        // Three small images need only one page.
        assert_eq!(events.iter().filter(|e| e.starts_with("page")).count(), 1);
    }

    #[test]
    fn progress_fires_on_cadence_and_finishes_at_one() {
        let session = session_with(7);
        let placements = session.layout(&deckle_pipeline::LayoutConfig::default());

        let mut calls: Vec<(f64, f64)> = Vec::new();
        let mut callback = |fraction: f64, eta: f64| calls.push((fraction, eta));
        render_deck(
            &session,
            &placements,
            RecordingSink::default(),
            Some(&mut callback),
        )
        .unwrap();

        // Items 0 and 5 report, plus the final completion call.
        assert_eq!(calls.len(), 3);
        assert!((calls[0].0 - 0.0).abs() < f64::EPSILON);
        assert!((calls[1].0 - 5.0 / 7.0 * 0.95).abs() < 1e-9);
        assert_eq!(calls[2], (1.0, 0.0));
        // Fractions never regress.
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn empty_deck_still_produces_a_blob_and_completes() {
        let session = session_with(0);
        let mut calls: Vec<(f64, f64)> = Vec::new();
        let mut callback = |fraction: f64, eta: f64| calls.push((fraction, eta));
        let blob = render_deck(&session, &[], RecordingSink::default(), Some(&mut callback))
            .unwrap();
        assert_eq!(blob, b"blob");
        assert_eq!(calls, vec![(1.0, 0.0)]);
    }

    #[test]
    fn discarded_record_surfaces_as_unknown() {
        let mut session = session_with(2);
        // Lay out first, then remove a record: the stale placement must
        // be detected instead of silently skipped.
        let placements = session.layout(&deckle_pipeline::LayoutConfig::default());
        let discard = std::collections::HashSet::from([session.accepted()[1].id()]);
        session.apply_discards(&discard);

        let result = render_deck(&session, &placements, RecordingSink::default(), None);
        assert!(matches!(result, Err(ExportError::UnknownRecord(_))));
    }
}
