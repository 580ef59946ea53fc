use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use palette_artwork::config::DEFAULT_EXPORT_NAME;
use palette_artwork::{
    CompositionSpec, DEFAULT_COLORS, MAX_COLORS, MIN_COLORS, Shape, compose_artwork,
    extract_palette_bytes,
};

/// Extract a dominant-color palette from an image and render it as banded artwork.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Number of palette colors
    #[arg(
        short = 'k',
        long,
        default_value_t = DEFAULT_COLORS as u8,
        value_parser = clap::value_parser!(u8).range(MIN_COLORS as i64..=MAX_COLORS as i64)
    )]
    n_colors: u8,

    /// Artwork shape: square, rectangle or circle
    #[arg(short, long, default_value_t = Shape::Square)]
    shape: Shape,

    /// Leave the background transparent instead of white
    #[arg(short, long)]
    transparent: bool,

    /// Comma-separated new band order, e.g. `2,0,1`
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<usize>>,

    /// Print the palette as JSON
    #[arg(long)]
    json: bool,

    /// Output PNG path
    #[arg(short, long, default_value = DEFAULT_EXPORT_NAME)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (mut palette, dims) = extract_palette_bytes(&bytes, args.n_colors as usize)
        .context("palette extraction failed")?;

    if palette.is_empty() {
        bail!("no opaque pixels found in {}", args.input.display());
    }
    if let Some(order) = &args.order {
        palette.reorder(order).context("invalid --order")?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&palette)?);
    } else {
        for entry in &palette {
            println!("{entry}");
        }
    }

    let spec = CompositionSpec::from_source(palette, args.shape, Some(dims), args.transparent);
    let png = compose_artwork(&spec).context("artwork rendering failed")?;

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, png)?;
    let (w, h) = spec.canvas_size();
    info!("Saved {w}x{h} {} → {}", spec.shape, args.output.display());

    Ok(())
}
