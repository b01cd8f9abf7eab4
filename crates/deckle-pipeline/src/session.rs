//! The single-session context owning all mutable pipeline state.
//!
//! One [`DeckSession`] corresponds to one batch-processing session: it
//! owns the accepted records, the processed-digest set, and the queue of
//! unresolved duplicate candidates. Only the ingestion pipeline mutates
//! it; layout and export only read. There is no ambient global state.

use std::collections::HashSet;

use log::info;

use crate::dedup::{self, DuplicateCandidate};
use crate::fingerprint::FingerprintEngine;
use crate::layout::{self, Placement};
use crate::record::{ContentDigest, ImageRecord, RecordId};
use crate::types::{LayoutConfig, SessionConfig};

/// Session state for one batch of uploads.
#[derive(Debug)]
pub struct DeckSession {
    config: SessionConfig,
    engine: FingerprintEngine,
    accepted: Vec<ImageRecord>,
    processed: HashSet<ContentDigest>,
    pending: Vec<DuplicateCandidate>,
    next_id: u64,
}

impl DeckSession {
    /// Create an empty session with the given configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let engine = FingerprintEngine::new(config.algorithm);
        Self {
            config,
            engine,
            accepted: Vec::new(),
            processed: HashSet::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// The configuration this session was created with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The accepted records, in insertion order.
    #[must_use]
    pub fn accepted(&self) -> &[ImageRecord] {
        &self.accepted
    }

    /// Look up an accepted record by id.
    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<&ImageRecord> {
        self.accepted.iter().find(|record| record.id() == id)
    }

    /// Perceptual collisions awaiting a resolution decision, in the
    /// order they were detected.
    #[must_use]
    pub fn pending_duplicates(&self) -> &[DuplicateCandidate] {
        &self.pending
    }

    /// The resolver's default decision for every live pending pair: the
    /// lower-resolution side of each collision. Pairs whose records were
    /// already removed contribute nothing.
    #[must_use]
    pub fn recommended_discards(&self) -> HashSet<RecordId> {
        self.pending
            .iter()
            .filter_map(|pair| {
                let existing = self.record(pair.existing)?;
                let incoming = self.record(pair.incoming)?;
                Some(dedup::recommend_discard(existing, incoming))
            })
            .collect()
    }

    /// Apply a resolution decision: remove the given records from the
    /// accepted set and consume the whole pending queue (a decision
    /// answers the full proposed list, so kept pairs are not
    /// re-surfaced). The processed-digest set is left untouched:
    /// re-uploading discarded bytes stays a no-op for the session's
    /// lifetime.
    ///
    /// Returns the number of records removed.
    pub fn apply_discards(&mut self, discard: &HashSet<RecordId>) -> usize {
        let before = self.accepted.len();
        self.accepted.retain(|record| !discard.contains(&record.id()));
        let removed = before - self.accepted.len();
        let proposed = self.pending.len();
        self.pending.clear();
        info!("resolution removed {removed} record(s), settling {proposed} pending pair(s)");
        removed
    }

    /// Lay out the accepted sequence with this session's records.
    /// Convenience for [`layout::layout`].
    #[must_use]
    pub fn layout(&self, config: &LayoutConfig) -> Vec<Placement> {
        layout::layout(&self.accepted, config)
    }

    pub(crate) const fn engine(&self) -> &FingerprintEngine {
        &self.engine
    }

    pub(crate) fn next_record_id(&mut self) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn is_processed(&self, digest: ContentDigest) -> bool {
        self.processed.contains(&digest)
    }

    pub(crate) fn mark_processed(&mut self, digest: ContentDigest) {
        self.processed.insert(digest);
    }

    pub(crate) fn push_record(&mut self, record: ImageRecord) {
        self.accepted.push(record);
    }

    pub(crate) fn push_pending(&mut self, candidate: DuplicateCandidate) {
        self.pending.push(candidate);
    }
}
