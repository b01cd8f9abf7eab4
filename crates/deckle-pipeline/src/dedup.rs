//! Near-duplicate detection and discard recommendation.
//!
//! The resolver only proposes: it reports perceptual collisions as
//! [`DuplicateCandidate`] pairs and recommends which side to drop, but
//! never removes anything itself. Removal is a separate, caller-driven
//! step (see [`crate::session::DeckSession::apply_discards`]), so
//! colliding images coexist in the accepted set until the caller
//! resolves them.

use serde::{Deserialize, Serialize};

use crate::record::{ImageRecord, RecordId};

/// A perceptual collision between a newly ingested image and one already
/// in the accepted set.
///
/// Transient: created during ingestion, queued until the caller supplies
/// a resolution decision, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    /// The earlier-accepted side of the pair.
    pub existing: RecordId,
    /// The just-ingested side of the pair.
    pub incoming: RecordId,
    /// Hamming distance between the two fingerprints.
    pub distance: u32,
}

/// Scan `accepted` in insertion order for the first record within
/// `threshold` bits of `incoming`'s fingerprint.
///
/// At most one collision is reported per incoming image: an image that
/// collides with several accepted images is only paired with the first
/// match found. Self-collision cannot occur as long as `incoming` has
/// not yet been appended to `accepted`.
#[must_use]
pub fn find_collision(
    accepted: &[ImageRecord],
    incoming: &ImageRecord,
    threshold: u32,
) -> Option<DuplicateCandidate> {
    accepted.iter().find_map(|existing| {
        let distance = existing.fingerprint().distance(incoming.fingerprint());
        (distance <= threshold).then_some(DuplicateCandidate {
            existing: existing.id(),
            incoming: incoming.id(),
            distance,
        })
    })
}

/// Recommend which side of a collision pair to discard: the record with
/// the smaller pixel area loses, and an exact tie discards `incoming` so
/// the earlier-accepted copy survives.
#[must_use]
pub fn recommend_discard(existing: &ImageRecord, incoming: &ImageRecord) -> RecordId {
    if existing.pixel_area() < incoming.pixel_area() {
        existing.id()
    } else {
        incoming.id()
    }
}
