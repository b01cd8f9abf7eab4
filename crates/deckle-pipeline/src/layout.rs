//! Greedy shelf packing of accepted images onto fixed-size pages.
//!
//! Images are placed left-to-right at a fixed rendered height, wrapping
//! to a new row when the current row is full and to a new page when the
//! page runs out of vertical space. A single forward pass, O(n), with no
//! hidden state: the same input sequence and configuration always yield
//! the same placements.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::record::{ImageRecord, RecordId};
use crate::types::LayoutConfig;

/// One layout decision: where a single image lands in the deck.
///
/// Coordinates are top-left based and share the millimetre unit of
/// [`LayoutConfig`]. Produced once per accepted image, immutable,
/// consumed by the export driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The image this placement positions.
    pub id: RecordId,
    /// 0-based page index.
    pub page: usize,
    /// Left edge of the image on the page.
    pub x: f64,
    /// Top edge of the image on the page.
    pub y: f64,
    /// Rendered width: `item_height * aspect_ratio`.
    pub width: f64,
    /// Rendered height: always exactly `item_height`.
    pub height: f64,
}

/// Lay out `records` in order onto fixed-size pages.
///
/// The whole sequence is processed unconditionally; there is no
/// filtering at layout time. Row wrapping checks the page's right edge
/// (no right margin is reserved), page wrapping checks
/// `page_height - top_margin`. An image wider than the page after
/// scaling sits alone on its row and may overflow the right edge; that
/// overflow is accepted, not corrected.
#[must_use]
pub fn layout(records: &[ImageRecord], config: &LayoutConfig) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(records.len());
    let mut page = 0_usize;
    let mut x = config.left_margin;
    let mut y = config.top_margin;
    let max_y = config.page_height - config.top_margin;

    for record in records {
        let width = config.item_height * record.aspect_ratio();

        // Row full: wrap before placing.
        if x + width > config.page_width {
            x = config.left_margin;
            y += config.item_height + config.spacing;
        }

        // Page full: open the next one.
        if y + config.item_height > max_y {
            page += 1;
            x = config.left_margin;
            y = config.top_margin;
        }

        placements.push(Placement {
            id: record.id(),
            page,
            x,
            y,
            width,
            height: config.item_height,
        });

        x += width + config.spacing;
    }

    debug!(
        "laid out {} image(s) across {} page(s)",
        placements.len(),
        placements.last().map_or(0, |last| last.page + 1),
    );
    placements
}
