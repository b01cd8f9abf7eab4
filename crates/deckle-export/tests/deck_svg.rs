//! Integration test: ingest a batch, lay it out, and serialize the deck
//! to SVG end to end.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use deckle_export::{SvgDeck, render_deck};
use deckle_pipeline::{DeckSession, LayoutConfig, SessionConfig, ingest_batch};

fn noise_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
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

#[test]
fn batch_to_svg_deck() {
    let mut session = DeckSession::new(SessionConfig::default());

    // Twenty 2:1 images: sixteen fill page 0, four spill onto page 1.
    let files: Vec<(String, Vec<u8>)> = (0..20)
        .map(|i| (format!("img-{i}.png"), noise_png(240, 120, i)))
        .collect();
    let reports = ingest_batch(&mut session, files);
    assert_eq!(reports.len(), 20);
    assert_eq!(session.accepted().len(), 20);

    let geometry = LayoutConfig::default();
    let placements = session.layout(&geometry);
    assert_eq!(placements.last().unwrap().page, 1);

    let mut progress_calls = 0_usize;
    let mut final_fraction = 0.0_f64;
    let mut callback = |fraction: f64, _eta: f64| {
        progress_calls += 1;
        final_fraction = fraction;
    };

    let blob = render_deck(
        &session,
        &placements,
        SvgDeck::new(&geometry),
        Some(&mut callback),
    )
    .expect("export should succeed");

    // Items 0, 5, 10, 15 report, plus the completion call.
    assert_eq!(progress_calls, 5);
    assert!((final_fraction - 1.0).abs() < f64::EPSILON);

    let text = String::from_utf8(blob).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("</svg>"));
    assert_eq!(text.matches("<image").count(), 20);
    assert_eq!(text.matches("translate(").count(), 2);
    assert!(text.contains("data:image/png;base64,"));

    // The embedded payloads are the original bytes, not the previews:
    // spot-check that the first image's base64 appears verbatim.
    use base64::Engine as _;
    let original = noise_png(240, 120, 0);
    let encoded = base64::engine::general_purpose::STANDARD.encode(&original);
    assert!(text.contains(&encoded));
}
