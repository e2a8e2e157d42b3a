//! Mipkit CLI - Command-line tool for inspecting and encoding DDS textures.
//!
//! This is the main entry point for the mipkit command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use mipkit::dds::pixel_flags;
use mipkit::prelude::*;

/// Mipkit - DDS texture inspection and encoding tool
#[derive(Parser)]
#[command(name = "mipkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header and texture description of a DDS file
    Info {
        /// Input DDS file
        #[arg(short, long, env = "MIPKIT_INPUT")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the sub-resources of a DDS file
    Layout {
        /// Input DDS file
        #[arg(short, long, env = "MIPKIT_INPUT")]
        input: PathBuf,

        /// Skip mip levels larger than this (0 keeps all)
        #[arg(short, long, env = "MIPKIT_MAX_SIZE", default_value_t = 0)]
        max_size: u32,
    },

    /// Validate every DDS file under a directory
    Scan {
        /// Directory to search
        #[arg(short, long)]
        dir: PathBuf,

        /// Filter pattern for file names (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Convert an image (PNG, JPEG, BMP or DDS) to DDS
    Encode {
        /// Input image
        #[arg(short, long, env = "MIPKIT_INPUT")]
        input: PathBuf,

        /// Output DDS file
        #[arg(short, long)]
        output: PathBuf,

        /// Largest width/height to keep (0 uses the 2D texture limit)
        #[arg(short, long, env = "MIPKIT_MAX_SIZE", default_value_t = 0)]
        max_size: u32,

        /// Always use the sRGB variant of the format
        #[arg(long, conflicts_with = "ignore_srgb")]
        srgb: bool,

        /// Never use sRGB formats
        #[arg(long)]
        ignore_srgb: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => {
            cmd_info(&input, json)?;
        }
        Commands::Layout { input, max_size } => {
            cmd_layout(&input, max_size)?;
        }
        Commands::Scan { dir, filter } => {
            cmd_scan(&dir, filter.as_deref())?;
        }
        Commands::Encode {
            input,
            output,
            max_size,
            srgb,
            ignore_srgb,
        } => {
            let flags = if srgb {
                LoadFlags::ForceSrgb
            } else if ignore_srgb {
                LoadFlags::IgnoreSrgb
            } else {
                LoadFlags::Default
            };
            let options = LoadOptions::default()
                .with_max_size(max_size)
                .with_flags(flags);
            cmd_encode(&input, &output, options)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// JSON view of `info` output.
#[derive(Serialize)]
struct InfoReport<'a> {
    file: &'a Path,
    four_cc: Option<String>,
    has_dx10_header: bool,
    header_bytes: usize,
    payload_bytes: usize,
    metadata: DdsMetadata,
    total_bytes: u64,
}

fn cmd_info(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let dds = Dds::parse(&data).context("Failed to parse DDS header")?;
    let meta = dds.metadata().context("Invalid texture description")?;
    let layout = dds.layout(0).context("Invalid payload layout")?;

    let pixel_format = &dds.header().pixel_format;
    let four_cc = pixel_format
        .has_flag(pixel_flags::FOURCC)
        .then(|| pixel_format.four_cc.to_string());

    if json {
        let report = InfoReport {
            file: input,
            four_cc,
            has_dx10_header: dds.dx10().is_some(),
            header_bytes: dds.header_len(),
            payload_bytes: dds.payload().len(),
            metadata: meta,
            total_bytes: layout.total_bytes,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File:        {}", input.display());
    println!("Format:      {}", meta.format);
    if let Some(four_cc) = four_cc {
        println!("FourCC:      {}", four_cc);
    }
    println!("Dimension:   {}", meta.dimension);
    println!("Size:        {}x{}x{}", meta.width, meta.height, meta.depth);
    println!("Mip levels:  {}", meta.mip_levels);
    if meta.is_cubemap {
        println!("Array size:  {} ({} cube(s))", meta.array_size, meta.cube_count());
    } else {
        println!("Array size:  {}", meta.array_size);
    }
    println!("Alpha mode:  {:?}", meta.alpha_mode);
    println!(
        "Header:      {} bytes{}",
        dds.header_len(),
        if dds.dx10().is_some() { " (DX10)" } else { "" }
    );
    println!(
        "Payload:     {} bytes ({} used by the mip chain)",
        dds.payload().len(),
        layout.total_bytes
    );

    Ok(())
}

fn cmd_layout(input: &Path, max_size: u32) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let dds = Dds::parse(&data).context("Failed to parse DDS header")?;
    let layout = dds.layout(max_size).context("Invalid payload layout")?;

    if layout.skipped_mips > 0 {
        println!(
            "Skipped {} mip level(s); top level is {}x{}",
            layout.skipped_mips, layout.width, layout.height
        );
    }

    println!(
        "{:>5} {:>4} {:>13} {:>10} {:>12} {:>12}",
        "item", "mip", "size", "row pitch", "offset", "bytes"
    );
    for sub in &layout.subresources {
        println!(
            "{:>5} {:>4} {:>13} {:>10} {:>12} {:>12}",
            sub.item,
            sub.mip_level,
            format!("{}x{}x{}", sub.width, sub.height, sub.depth),
            sub.row_pitch,
            sub.offset,
            sub.len
        );
    }

    println!(
        "\nTotal: {} sub-resources, {} bytes",
        layout.subresources.len(),
        layout.total_bytes
    );

    Ok(())
}

fn cmd_scan(dir: &Path, filter: Option<&str>) -> Result<()> {
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let start = Instant::now();
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("dds"))
        })
        .filter(|path| match &pattern {
            Some(pattern) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| pattern.matches(name)),
            None => true,
        })
        .collect();

    println!("Scanning {} DDS files under {}...", files.len(), dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let valid = AtomicUsize::new(0);
    let mut failures: Vec<(PathBuf, String)> = files
        .par_iter()
        .filter_map(|path| {
            let result = fs::read(path)
                .map_err(mipkit::dds::Error::from)
                .and_then(|data| parse(&data));
            pb.inc(1);
            match result {
                Ok(meta) => {
                    debug!("{}: {} {}x{}", path.display(), meta.format, meta.width, meta.height);
                    valid.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Err(e) => Some((path.clone(), e.to_string())),
            }
        })
        .collect();

    pb.finish_with_message("Done");
    failures.sort();

    for (path, reason) in &failures {
        println!("FAIL {}: {}", path.display(), reason);
    }
    println!(
        "Scanned {} files in {:?}: {} valid, {} invalid",
        files.len(),
        start.elapsed(),
        valid.load(Ordering::Relaxed),
        failures.len()
    );

    Ok(())
}

fn cmd_encode(input: &Path, output: &Path, options: LoadOptions) -> Result<()> {
    println!("Encoding: {} -> {}", input.display(), output.display());

    let loader = TextureLoader::new(options);
    let texture = loader
        .load_from_path(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    info!(
        "loaded {} {}x{} with {} mip level(s)",
        texture.metadata.format,
        texture.metadata.width,
        texture.metadata.height,
        texture.metadata.mip_levels
    );

    texture
        .save_dds(output)
        .context("Failed to write output file")?;

    println!(
        "Wrote {} {}x{} ({} bytes of pixels)",
        texture.metadata.format,
        texture.metadata.width,
        texture.metadata.height,
        texture.pixels.len()
    );

    Ok(())
}
