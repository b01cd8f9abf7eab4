//! SVG deck serializer.
//!
//! Renders the deck as a single SVG document with pages stacked
//! vertically: each page is a `<g>` group holding a white page rectangle
//! and one `<image>` element per placement. Raster payloads are embedded
//! as base64 data URIs, so the blob is fully self-contained.
//!
//! Coordinates and sizes are millimetres, carried through the document
//! `viewBox`. This is a pure serializer with no I/O -- it returns bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use svg::Document;
use svg::node::element::{Group, Image, Rectangle};

use deckle_pipeline::{LayoutConfig, Placement};

use crate::deck::{ExportError, PictureSink};

/// Vertical gap between stacked pages in the document, millimetres.
const PAGE_GAP_MM: f64 = 5.0;

/// A deck document under construction, one page group at a time.
pub struct SvgDeck {
    page_width: f64,
    page_height: f64,
    pages: Vec<Group>,
}

impl SvgDeck {
    /// Create an empty deck with the given page geometry (only the page
    /// dimensions are used; placements carry their own coordinates).
    #[must_use]
    pub fn new(geometry: &LayoutConfig) -> Self {
        Self {
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            pages: Vec::new(),
        }
    }

    /// Number of pages opened so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Wrap a raw raster payload in a base64 data URI with the right mime
/// type.
fn data_uri(raw: &[u8]) -> Result<String, ExportError> {
    let format = image::guess_format(raw).map_err(|_| ExportError::UnsupportedImage)?;
    let mime = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::WebP => "image/webp",
        image::ImageFormat::Bmp => "image/bmp",
        image::ImageFormat::Gif => "image/gif",
        _ => return Err(ExportError::UnsupportedImage),
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(raw)))
}

impl PictureSink for SvgDeck {
    fn begin_page(&mut self, index: usize) -> Result<(), ExportError> {
        let expected = self.pages.len();
        if index != expected {
            return Err(ExportError::PageOrder { expected, got: index });
        }

        #[allow(clippy::cast_precision_loss)]
        let offset = index as f64 * (self.page_height + PAGE_GAP_MM);
        let background = Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.page_width)
            .set("height", self.page_height)
            .set("fill", "white")
            .set("stroke", "#c8c8c8")
            .set("stroke-width", 0.5);
        let page = Group::new()
            .set("transform", format!("translate(0 {offset})"))
            .add(background);
        self.pages.push(page);
        Ok(())
    }

    fn place_picture(&mut self, placement: &Placement, raw: &[u8]) -> Result<(), ExportError> {
        let uri = data_uri(raw)?;
        let picture = Image::new()
            .set("x", placement.x)
            .set("y", placement.y)
            .set("width", placement.width)
            .set("height", placement.height)
            .set("href", uri);

        // Group::add consumes, so re-push the extended page.
        let page = self.pages.pop().ok_or(ExportError::MissingPage)?;
        self.pages.push(page.add(picture));
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let page_count = self.pages.len();
        #[allow(clippy::cast_precision_loss)]
        let total_height = if page_count == 0 {
            self.page_height
        } else {
            page_count as f64 * self.page_height + (page_count - 1) as f64 * PAGE_GAP_MM
        };

        let mut document = Document::new()
            .set("width", format!("{}mm", self.page_width))
            .set("height", format!("{total_height}mm"))
            .set("viewBox", (0.0, 0.0, self.page_width, total_height));
        for page in self.pages {
            document = document.add(page);
        }
        Ok(document.to_string().into_bytes())
    }
}
