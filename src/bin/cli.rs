//! CLI for replaying recorded eye landmarks through the overlay placer.
//!
//! Usage:
//!   glass-overlay session.jsonl --viewport 1080x1920 --bitmap glasses.png
//!   glass-overlay - --viewport 1080x1920 --bitmap-size 600x220 --json
//!   glass-overlay session.jsonl --viewport 1080x1920 --bitmap glasses.png -o placements.json

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use glass_overlay::{
    logging, read_observations, replay, BitmapSize, OverlayConfig, OverlayPlacer, ReplayStep,
    ViewportDimensions,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "glass-overlay")]
#[command(author, version, about = "Replay eye landmarks and print overlay placements", long_about = None)]
struct Args {
    /// Recorded observations, one JSON object per line ("-" for stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    viewport: Size,

    /// Overlay bitmap; only its dimensions are read
    #[arg(long, conflicts_with = "bitmap_size", required_unless_present = "bitmap_size")]
    bitmap: Option<PathBuf>,

    /// Overlay bitmap size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    bitmap_size: Option<Size>,

    /// Tuning overrides (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// WIDTHxHEIGHT from the command line.
#[derive(Debug, Clone, Copy)]
struct Size {
    width: f32,
    height: f32,
}

#[derive(Serialize)]
struct Output {
    viewport: ViewportDimensions,
    bitmap: BitmapSize,
    config: OverlayConfig,
    frames: usize,
    frames_with_eyes: usize,
    steps: Vec<ReplayStep>,
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
    let w: f32 = w.trim().parse().map_err(|_| format!("invalid width {:?}", w))?;
    let h: f32 = h.trim().parse().map_err(|_| format!("invalid height {:?}", h))?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("size must be positive, got {}x{}", w, h));
    }
    Ok(Size {
        width: w,
        height: h,
    })
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_subscriber(if args.verbose { "debug" } else { "warn" })?;

    let config = OverlayConfig::load(args.config.as_deref())?;
    tracing::debug!(?config, "loaded overlay config");

    let bitmap = match (&args.bitmap, args.bitmap_size) {
        (Some(path), _) => {
            let size = BitmapSize::probe(path)?;
            tracing::debug!(path = %path.display(), ?size, "probed bitmap");
            size
        }
        (None, Some(size)) => BitmapSize::new(size.width, size.height),
        (None, None) => return Err("either --bitmap or --bitmap-size is required".into()),
    };
    if bitmap.width <= 0.0 || bitmap.height <= 0.0 {
        return Err("bitmap has no pixels".into());
    }

    let observations = if args.input.as_os_str() == "-" {
        read_observations(io::stdin().lock())?
    } else {
        read_observations(BufReader::new(File::open(&args.input)?))?
    };
    tracing::debug!(count = observations.len(), "read observations");

    let viewport = ViewportDimensions::new(args.viewport.width, args.viewport.height);
    let mut placer = OverlayPlacer::new(config, viewport);
    let steps = replay(&observations, &mut placer, viewport, bitmap);

    let output = Output {
        viewport,
        bitmap,
        config,
        frames: steps.len(),
        frames_with_eyes: steps.iter().filter(|s| s.detected).count(),
        steps,
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        tracing::info!(path = %path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Viewport: {}x{}  Bitmap: {}x{}\n",
        output.viewport.width, output.viewport.height, output.bitmap.width, output.bitmap.height
    ));
    s.push_str(&format!(
        "Frames: {} ({} with eyes)\n\n",
        output.frames, output.frames_with_eyes
    ));

    for step in &output.steps {
        let marker = if step.detected { ' ' } else { '-' };
        match &step.placement {
            Some(p) => s.push_str(&format!(
                "{:>5}{} rect=({:.1}, {:.1}, {:.1}, {:.1}) eyes={:.1}px\n",
                step.index,
                marker,
                p.rect.left,
                p.rect.top,
                p.rect.right,
                p.rect.bottom,
                p.eye_distance
            )),
            None => s.push_str(&format!("{:>5}{} nothing to draw\n", step.index, marker)),
        }
    }

    s
}
