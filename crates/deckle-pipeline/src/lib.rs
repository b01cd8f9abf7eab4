//! deckle-pipeline: batch image ingestion, perceptual de-duplication,
//! and slide layout (sans-IO).
//!
//! Turns a batch of in-memory image payloads into a laid-out deck:
//! validation -> exact-duplicate suppression (content digest) ->
//! perceptual fingerprinting -> collision detection -> greedy shelf
//! layout onto fixed-size pages.
//!
//! This crate has **no I/O dependencies** -- it operates on byte slices
//! and returns structured data. File handling, duplicate-resolution UI,
//! and document serialization live with the callers (see
//! `deckle-export` for the serializers).
//!
//! # Flow
//!
//! ```no_run
//! use deckle_pipeline::{DeckSession, LayoutConfig, SessionConfig, ingest_batch};
//!
//! let mut session = DeckSession::new(SessionConfig::default());
//! let files: Vec<(String, Vec<u8>)> = Vec::new(); // (name, bytes) pairs
//! let _reports = ingest_batch(&mut session, files);
//!
//! // Surface session.pending_duplicates() to the user, collect a
//! // decision, then:
//! let discards = session.recommended_discards();
//! session.apply_discards(&discards);
//!
//! let _placements = session.layout(&LayoutConfig::default());
//! ```

pub mod dedup;
pub mod fingerprint;
pub mod ingest;
pub mod layout;
pub mod record;
pub mod session;
pub mod types;

pub use dedup::{DuplicateCandidate, find_collision, recommend_discard};
pub use fingerprint::{Fingerprint, FingerprintAlgorithm, FingerprintEngine};
pub use ingest::{ingest_batch, ingest_file};
pub use layout::{Placement, layout};
pub use record::{ContentDigest, ImageRecord, RecordId};
pub use session::DeckSession;
pub use types::{FileOutcome, FileReport, IngestError, LayoutConfig, MM_PER_INCH, SessionConfig};
