//! deckle-export: document serializers and the export driver (sans-IO).
//!
//! Converts laid-out placements into a downloadable document blob. The
//! driver ([`render_deck`]) is format-agnostic: it walks placements and
//! talks to a [`PictureSink`]. [`SvgDeck`] is the bundled serializer;
//! other containers implement the same trait.

pub mod deck;
pub mod svg;

pub use deck::{ExportError, PROGRESS_CADENCE, PictureSink, render_deck};
pub use svg::SvgDeck;
