//! Assemble image files into a paginated slide-deck document.
//!
//! Reads the given images in command-line order, drops exact and
//! near-duplicate copies (keeping the sharper side of each
//! near-duplicate pair unless told otherwise), packs the survivors onto
//! fixed-size pages, and writes a self-contained SVG deck.

use std::path::PathBuf;

use clap::Parser;

use deckle_export::{SvgDeck, render_deck};
use deckle_pipeline::{
    DeckSession, FileOutcome, FingerprintAlgorithm, LayoutConfig, SessionConfig, ingest_batch,
    recommend_discard,
};

#[derive(Parser)]
#[command(version, about = "Assemble images into a slide deck with perceptual de-duplication")]
struct Args {
    /// Input image files, placed in command-line order.
    #[arg(required = true, value_name = "IMAGE")]
    inputs: Vec<PathBuf>,

    /// Output document path.
    #[arg(short, long, default_value = "deck.svg")]
    output: PathBuf,

    /// Hamming-distance threshold for near-duplicate detection
    /// (smaller is stricter).
    #[arg(long, value_name = "BITS")]
    threshold: Option<u32>,

    /// Perceptual hash algorithm: mean, gradient, double-gradient, or dct.
    #[arg(long, default_value = "gradient")]
    algorithm: String,

    /// Keep near-duplicate images instead of discarding the
    /// lower-resolution copy of each pair.
    #[arg(long)]
    keep_duplicates: bool,

    /// Per-file input size ceiling in bytes.
    #[arg(long, value_name = "BYTES")]
    max_bytes: Option<u64>,

    /// Rendered height of every image, millimetres.
    #[arg(long, value_name = "MM")]
    item_height: Option<f64>,

    /// Page width, millimetres.
    #[arg(long, value_name = "MM")]
    page_width: Option<f64>,

    /// Page height, millimetres.
    #[arg(long, value_name = "MM")]
    page_height: Option<f64>,

    /// Top margin of every page, millimetres.
    #[arg(long, value_name = "MM")]
    top_margin: Option<f64>,

    /// Gap between images, millimetres.
    #[arg(long, value_name = "MM")]
    spacing: Option<f64>,
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let algorithm: FingerprintAlgorithm = args.algorithm.parse()?;
    let session_defaults = SessionConfig::default();
    let config = SessionConfig {
        threshold: args.threshold.unwrap_or(session_defaults.threshold),
        algorithm,
        max_input_bytes: args.max_bytes.unwrap_or(session_defaults.max_input_bytes),
        preview_max_edge: session_defaults.preview_max_edge,
    };

    let layout_defaults = LayoutConfig::default();
    let geometry = LayoutConfig {
        page_width: args.page_width.unwrap_or(layout_defaults.page_width),
        page_height: args.page_height.unwrap_or(layout_defaults.page_height),
        left_margin: layout_defaults.left_margin,
        top_margin: args.top_margin.unwrap_or(layout_defaults.top_margin),
        spacing: args.spacing.unwrap_or(layout_defaults.spacing),
        item_height: args.item_height.unwrap_or(layout_defaults.item_height),
    };

    let mut files = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let bytes =
            std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        files.push((name, bytes));
    }

    let mut session = DeckSession::new(config);
    let reports = ingest_batch(&mut session, files);
    for report in &reports {
        match &report.outcome {
            FileOutcome::Inserted { collision: Some(pair), .. } => {
                eprintln!(
                    "+ {} (near-duplicate of an earlier image, distance {})",
                    report.name, pair.distance,
                );
            }
            FileOutcome::Inserted { .. } => eprintln!("+ {}", report.name),
            FileOutcome::SkippedExactDuplicate => {
                eprintln!("= {} (exact duplicate, skipped)", report.name);
            }
            FileOutcome::Rejected(error) => eprintln!("! {} ({error})", report.name),
        }
    }

    // Act as the resolution step: apply the resolver's recommendation
    // for every pending pair, unless asked to keep everything.
    if !session.pending_duplicates().is_empty() {
        if args.keep_duplicates {
            eprintln!(
                "keeping {} near-duplicate pair(s) as requested",
                session.pending_duplicates().len(),
            );
        } else {
            for pair in session.pending_duplicates() {
                let (Some(existing), Some(incoming)) =
                    (session.record(pair.existing), session.record(pair.incoming))
                else {
                    continue;
                };
                let losing = if recommend_discard(existing, incoming) == existing.id() {
                    existing
                } else {
                    incoming
                };
                eprintln!(
                    "~ {} and {} look alike (distance {}); dropping {} ({}x{})",
                    existing.display_name(),
                    incoming.display_name(),
                    pair.distance,
                    losing.display_name(),
                    losing.width(),
                    losing.height(),
                );
            }
            let discards = session.recommended_discards();
            session.apply_discards(&discards);
        }
    }

    if session.accepted().is_empty() {
        return Err("no images were accepted".into());
    }

    let placements = session.layout(&geometry);
    let pages = placements.last().map_or(0, |last| last.page + 1);
    eprintln!(
        "laid out {} image(s) across {} page(s)",
        placements.len(),
        pages,
    );

    let mut show_progress = |fraction: f64, eta: f64| {
        eprint!("\rgenerating document... {:3.0}% (about {eta:.1}s left)", fraction * 100.0);
    };
    let blob = render_deck(
        &session,
        &placements,
        SvgDeck::new(&geometry),
        Some(&mut show_progress),
    )?;
    eprintln!();

    std::fs::write(&args.output, &blob)
        .map_err(|e| format!("cannot write {}: {e}", args.output.display()))?;
    eprintln!("wrote {} ({} bytes)", args.output.display(), blob.len());
    Ok(())
}
