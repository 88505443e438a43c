use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use log::info;
use serde::Serialize;
use sdf_core::{GridView, Rgb8};
use sdf_erode::{propagate, CoordMap, DistanceField, ErodeConfig, SdfMode};
use sdf_label::{filter_small_islands, label, ColorSource, LabelConfig, Labeling};
use sdf_mask::{close3x3, open3x3, threshold_u8, BoolField, DEFAULT_CUTOFF};
use sdf_trace::{trace, TraceConfig};

#[derive(Parser, Debug)]
#[command(name = "sdf_gallery")]
#[command(about = "Run the sdf-fields pipeline on image fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "mask")]
    Mask(MaskArgs),
    #[command(name = "islands")]
    Islands(IslandArgs),
    #[command(name = "sdf")]
    Sdf(SdfArgs),
    #[command(name = "sdf_id")]
    SdfId(SdfArgs),
    #[command(name = "progression")]
    Progression(ProgressionArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    cutoff: f32,
}

#[derive(Args, Debug, Clone)]
struct MaskArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_enum, default_value = "none")]
    cleanup: Cleanup,
}

#[derive(Args, Debug, Clone)]
struct IslandArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 0)]
    min_island: usize,
}

#[derive(Args, Debug, Clone)]
struct SdfArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 25)]
    radius: u32,
    #[arg(long, value_enum, default_value = "dual")]
    mode: Mode,
    #[arg(long, default_value_t = true)]
    normalize: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 0)]
    min_island: usize,
}

#[derive(Args, Debug, Clone)]
struct ProgressionArgs {
    #[command(flatten)]
    sdf: SdfArgs,
    /// LUT index of the island to trace.
    #[arg(long, default_value_t = 0)]
    island: usize,
    #[arg(long, default_value_t = 500.0)]
    ceiling: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Cleanup {
    None,
    Open,
    Close,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Internal,
    External,
    Dual,
}

impl From<Mode> for SdfMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Internal => SdfMode::Internal,
            Mode::External => SdfMode::External,
            Mode::Dual => SdfMode::Dual,
        }
    }
}

#[derive(Debug, Serialize)]
struct MaskMeta {
    input: String,
    cutoff: f32,
    cleanup: String,
    foreground_px: usize,
}

#[derive(Debug, Serialize)]
struct IslandMeta {
    input: String,
    cutoff: f32,
    seed: u64,
    min_island: usize,
    islands: usize,
    counts: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct SdfMeta {
    input: String,
    cutoff: f32,
    radius: u32,
    mode: String,
    normalize: bool,
    covered_px: usize,
}

#[derive(Debug, Serialize)]
struct ProgressionMeta {
    input: String,
    island: usize,
    ceiling: f32,
    max_value: f32,
    stop: String,
    start: (usize, usize),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Mask(args) => run_mask(&args),
        Command::Islands(args) => run_islands(&args),
        Command::Sdf(args) => run_sdf(&args, false),
        Command::SdfId(args) => run_sdf(&args, true),
        Command::Progression(args) => run_progression(&args),
    }
}

fn run_mask(args: &MaskArgs) -> Result<()> {
    let gray = load_gray(&args.common.input)?;
    let field = make_field(&gray, args.common.cutoff)?;

    let cleaned = match args.cleanup {
        Cleanup::None => field,
        Cleanup::Open => open3x3(&field),
        Cleanup::Close => close3x3(&field),
    };

    fs::create_dir_all(&args.common.out).context("creating output directory")?;
    save_mask(&cleaned, &args.common.out.join("mask.png"))?;
    write_meta(
        &args.common.out.join("mask.json"),
        &MaskMeta {
            input: args.common.input.display().to_string(),
            cutoff: args.common.cutoff,
            cleanup: format!("{:?}", args.cleanup).to_lowercase(),
            foreground_px: cleaned.count_set(),
        },
    )
}

fn run_islands(args: &IslandArgs) -> Result<()> {
    let gray = load_gray(&args.common.input)?;
    let field = make_field(&gray, args.common.cutoff)?;
    let labeling = make_labeling(&field, args.seed, args.min_island)?;

    info!(
        "{}: {} islands",
        args.common.input.display(),
        labeling.island_count()
    );

    fs::create_dir_all(&args.common.out).context("creating output directory")?;
    save_island_map(&labeling, &args.common.out.join("islands.png"))?;
    save_lut_strip(&labeling, &args.common.out.join("islands_lut.png"))?;
    write_meta(
        &args.common.out.join("islands.json"),
        &IslandMeta {
            input: args.common.input.display().to_string(),
            cutoff: args.common.cutoff,
            seed: args.seed,
            min_island: args.min_island,
            islands: labeling.island_count(),
            counts: labeling.counts.clone(),
        },
    )
}

fn run_sdf(args: &SdfArgs, with_islands: bool) -> Result<()> {
    let gray = load_gray(&args.common.input)?;
    let field = make_field(&gray, args.common.cutoff)?;

    let labeling = if with_islands {
        Some(make_labeling(&field, args.seed, args.min_island)?)
    } else {
        None
    };

    let cfg = ErodeConfig {
        radius: args.radius,
        mode: args.mode.into(),
        normalize: args.normalize,
    };
    let (sdf, coords) =
        propagate(&field, labeling.as_ref().map(|l| &l.map), &cfg).context("propagation")?;

    fs::create_dir_all(&args.common.out).context("creating output directory")?;
    save_field(&sdf, &args.common.out.join("sdf.png"))?;
    save_coord_map(&coords, &args.common.out.join("sdf_coords.png"))?;
    if let Some(tags) = sdf.tags() {
        save_rgb_grid(tags, &args.common.out.join("sdf_id.png"))?;
    }

    let covered = sdf
        .samples()
        .data()
        .iter()
        .filter(|s| s.in_spread())
        .count();
    write_meta(
        &args.common.out.join("sdf.json"),
        &SdfMeta {
            input: args.common.input.display().to_string(),
            cutoff: args.common.cutoff,
            radius: args.radius,
            mode: format!("{:?}", args.mode).to_lowercase(),
            normalize: args.normalize,
            covered_px: covered,
        },
    )
}

fn run_progression(args: &ProgressionArgs) -> Result<()> {
    let gray = load_gray(&args.sdf.common.input)?;
    let field = make_field(&gray, args.sdf.common.cutoff)?;
    let labeling = make_labeling(&field, args.sdf.seed, args.sdf.min_island)?;

    let Some(&island) = labeling.lut.get(args.island) else {
        bail!(
            "island index {} out of range ({} islands)",
            args.island,
            labeling.island_count()
        );
    };

    let cfg = ErodeConfig {
        radius: args.sdf.radius,
        mode: args.sdf.mode.into(),
        normalize: args.sdf.normalize,
    };
    let (sdf, coords) = propagate(&field, Some(&labeling.map), &cfg).context("propagation")?;

    let trace_cfg = TraceConfig {
        max_value: args.ceiling,
    };
    let walk = sdf_trace::walk_for(&sdf, &coords, island, None, &trace_cfg)
        .context("trace setup")?;
    let start = walk.start();
    let progression = trace(&sdf, &coords, island, Some(start), &trace_cfg).context("trace")?;

    info!(
        "trace reached {} ({:?})",
        progression.max_value, progression.stop
    );

    fs::create_dir_all(&args.sdf.common.out).context("creating output directory")?;
    save_progression(&progression, &args.sdf.common.out.join("progression.png"))?;
    write_meta(
        &args.sdf.common.out.join("progression.json"),
        &ProgressionMeta {
            input: args.sdf.common.input.display().to_string(),
            island: args.island,
            ceiling: args.ceiling,
            max_value: progression.max_value,
            stop: format!("{:?}", progression.stop),
            start: (start.row, start.col),
        },
    )
}

fn load_gray(path: &Path) -> Result<GrayImage> {
    let img = image::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(img.to_luma8())
}

fn make_field(gray: &GrayImage, cutoff: f32) -> Result<BoolField> {
    let (w, h) = gray.dimensions();
    let view = GridView::from_slice(h as usize, w as usize, w as usize, gray.as_raw())
        .context("wrapping decoded image")?;
    Ok(threshold_u8(&view, cutoff))
}

fn make_labeling(field: &BoolField, seed: u64, min_island: usize) -> Result<Labeling> {
    let labeling = label(
        field,
        &LabelConfig {
            colors: ColorSource::Seeded(seed),
        },
    )
    .context("labeling")?;

    Ok(if min_island > 1 {
        filter_small_islands(&labeling, min_island)
    } else {
        labeling
    })
}

fn save_mask(field: &BoolField, path: &Path) -> Result<()> {
    let mut img = GrayImage::new(field.cols() as u32, field.rows() as u32);
    for (i, px) in img.pixels_mut().enumerate() {
        px.0 = [field.data()[i] * 255];
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_island_map(labeling: &Labeling, path: &Path) -> Result<()> {
    save_rgb_grid(&labeling.map, path)
}

fn save_rgb_grid(grid: &sdf_core::Grid<Rgb8>, path: &Path) -> Result<()> {
    let mut img = RgbImage::new(grid.cols() as u32, grid.rows() as u32);
    for (i, px) in img.pixels_mut().enumerate() {
        let c = grid.data()[i];
        px.0 = [c.r, c.g, c.b];
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_lut_strip(labeling: &Labeling, path: &Path) -> Result<()> {
    if labeling.lut.is_empty() {
        bail!("no islands to write a LUT for");
    }

    let mut img = RgbImage::new(labeling.lut.len() as u32, 1);
    for (px, c) in img.pixels_mut().zip(&labeling.lut) {
        *px = Rgb([c.r, c.g, c.b]);
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_field(sdf: &DistanceField, path: &Path) -> Result<()> {
    let mut img = RgbaImage::new(sdf.cols() as u32, sdf.rows() as u32);
    for (i, px) in img.pixels_mut().enumerate() {
        let s = sdf.samples().data()[i];
        *px = Rgba([
            to_u8(s.dir_x),
            to_u8(s.dir_y),
            to_u8(s.dist),
            to_u8(s.coverage),
        ]);
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_coord_map(coords: &CoordMap, path: &Path) -> Result<()> {
    // Origins normalized by the grid extent; NONE stays black.
    let (rows, cols) = (coords.rows() as f32, coords.cols() as f32);
    let mut img = RgbImage::new(coords.cols() as u32, coords.rows() as u32);
    for (i, px) in img.pixels_mut().enumerate() {
        let o = coords.data()[i];
        if o.is_none() {
            continue;
        }
        px.0 = [
            to_u8(o.col as f32 / cols),
            to_u8(o.row as f32 / rows),
            0,
        ];
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_progression(progression: &sdf_trace::Progression, path: &Path) -> Result<()> {
    let values = &progression.values;
    let scale = if progression.max_value > 0.0 {
        progression.max_value
    } else {
        1.0
    };

    let mut img = GrayImage::new(values.cols() as u32, values.rows() as u32);
    for (i, px) in img.pixels_mut().enumerate() {
        px.0 = [to_u8(values.data()[i] / scale)];
    }
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn write_meta<T: Serialize>(path: &Path, meta: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(meta).context("serializing metadata")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
