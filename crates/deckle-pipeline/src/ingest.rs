//! Per-file ingestion: validation, exact-duplicate suppression,
//! fingerprinting, and optimistic insertion.
//!
//! Each file moves through a fixed sequence of gates (size ceiling,
//! decode, content digest, perceptual fingerprint) and ends in exactly
//! one terminal state: inserted, skipped as an exact duplicate, or
//! rejected. A rejection never aborts the batch.

use log::{debug, info, warn};

use crate::dedup;
use crate::record::{self, ContentDigest, ImageRecord};
use crate::session::DeckSession;
use crate::types::{FileOutcome, FileReport, IngestError};

/// Ingest one file into the session.
///
/// The digest check runs before perceptual hashing so byte-identical
/// re-uploads cost one hash lookup and nothing else. When a perceptual
/// collision is found the record is still appended (optimistic insert);
/// the collision is queued on the session for a later resolution
/// decision and echoed in the returned outcome.
pub fn ingest_file(session: &mut DeckSession, name: &str, bytes: Vec<u8>) -> FileOutcome {
    match ingest_inner(session, name, bytes) {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!("rejected {name}: {error}");
            FileOutcome::Rejected(error)
        }
    }
}

fn ingest_inner(
    session: &mut DeckSession,
    name: &str,
    bytes: Vec<u8>,
) -> Result<FileOutcome, IngestError> {
    let limit = session.config().max_input_bytes;
    let actual = bytes.len() as u64;
    if actual > limit {
        return Err(IngestError::OversizeInput { actual, limit });
    }

    let decoded = image::load_from_memory(&bytes)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(IngestError::EmptyImage);
    }

    // Exact duplicates are keyed on content alone: the same bytes under
    // a different filename are still the same upload.
    let digest = ContentDigest::compute(&bytes);
    if session.is_processed(digest) {
        debug!("skipping exact duplicate {name} ({digest:?})");
        return Ok(FileOutcome::SkippedExactDuplicate);
    }

    let fingerprint = session.engine().fingerprint(&decoded);
    let preview = record::encode_preview(&decoded, session.config().preview_max_edge)?;

    let id = session.next_record_id();
    let record = ImageRecord::new(
        id,
        name.to_owned(),
        digest,
        decoded.width(),
        decoded.height(),
        fingerprint,
        bytes,
        preview,
    );

    let collision = dedup::find_collision(session.accepted(), &record, session.config().threshold);
    debug!(
        "accepted {name} as {id}: {}x{}, fingerprint {}",
        record.width(),
        record.height(),
        record.fingerprint().to_base64(),
    );

    session.mark_processed(digest);
    session.push_record(record);
    if let Some(candidate) = collision {
        info!(
            "{name} collides with {} at distance {}",
            candidate.existing, candidate.distance,
        );
        session.push_pending(candidate);
    }

    Ok(FileOutcome::Inserted { id, collision })
}

/// Ingest a batch of `(name, bytes)` files in order.
///
/// Processing is strictly sequential: each file's duplicate checks run
/// against the session as mutated by the files before it, so input
/// order is an observable part of the contract.
pub fn ingest_batch<I>(session: &mut DeckSession, files: I) -> Vec<FileReport>
where
    I: IntoIterator<Item = (String, Vec<u8>)>,
{
    let reports: Vec<FileReport> = files
        .into_iter()
        .map(|(name, bytes)| {
            let outcome = ingest_file(session, &name, bytes);
            FileReport { name, outcome }
        })
        .collect();

    let inserted = reports
        .iter()
        .filter(|r| matches!(r.outcome, FileOutcome::Inserted { .. }))
        .count();
    let skipped = reports
        .iter()
        .filter(|r| matches!(r.outcome, FileOutcome::SkippedExactDuplicate))
        .count();
    let rejected = reports.len() - inserted - skipped;
    info!(
        "batch of {} file(s): {inserted} accepted, {skipped} exact-duplicate skip(s), \
         {rejected} rejection(s), {} unresolved collision(s)",
        reports.len(),
        session.pending_duplicates().len(),
    );
    reports
}
