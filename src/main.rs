use clap::{Parser, Subcommand};
use imgset::config::BuildConfig;
use imgset::imaging::RustBackend;
use imgset::{output, process, scan};
use std::path::{Path, PathBuf};

/// Shared flags for commands that encode images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the encode cache — force re-encoding of all variants
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "imgset")]
#[command(about = "Responsive-image pipeline for static sites")]
#[command(long_about = "\
Responsive-image pipeline for static sites

Walks a source image tree, encodes every image at each usable breakpoint
width in JPEG, WebP and AVIF, and records the results in a manifest the
site's runtime uses to upgrade <img> elements in place.

Source structure:

  assets/images/
  ├── hero.jpg                     # Any supported raster (.jpg/.jpeg/.png)
  ├── pics/
  │   ├── tile one.png             # Subdirectories and spaces are fine
  │   └── tile-two.jpg
  └── optimized/                   # Build output — never re-ingested
      ├── manifest.json
      ├── hero-320.jpg/.webp/.avif
      └── pics/...

The runtime treats a missing manifest as a valid state: until the build
runs, the site serves its original sources unchanged.

An optional imgset.toml can override directories, the breakpoint ladder,
and per-format qualities.")]
#[command(version)]
struct Cli {
    /// Source image directory (overrides imgset.toml)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory for variants and the manifest (overrides imgset.toml)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate all variants and write the manifest
    Build(CacheArgs),
    /// Validate the source tree without encoding anything
    Check,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Build failed: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = BuildConfig::load(Path::new("."))?;
    if let Some(source) = &cli.source {
        config.source_dir = source.to_string_lossy().into_owned();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.to_string_lossy().into_owned();
    }

    let backend = RustBackend::new();
    match cli.command {
        Command::Build(cache_args) => {
            let report = process::build(&backend, &config, !cache_args.no_cache)?;
            output::print_build_summary(
                report.processed,
                &report.manifest_path,
                &report.cache_stats,
            );
        }
        Command::Check => {
            let assets = scan::discover(
                &backend,
                Path::new(&config.source_dir),
                Path::new(&config.output_dir),
            )?;
            output::print_check_output(&assets);
        }
    }

    Ok(())
}
