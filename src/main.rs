use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geink::models::{AppConfig, ConfigLayer};
use geink::services::pipeline::{convert_output_path, dither_output_path, preprocess_output_path};
use geink::services::{
    convert_dir, convert_file, dither_dir, dither_file, grid_file, preprocess_dir,
    preprocess_file, BatchReport, HeaderTarget,
};

#[derive(Parser)]
#[command(name = "geink")]
#[command(version, about = "Geink - prepare, dither and pack images for e-paper displays")]
struct Cli {
    /// YAML config file (overrides GEINK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop or pad to the panel ratio, resize, and convert to gray
    Preprocess {
        /// Image file or directory of images
        input: PathBuf,

        /// Output file (default: <stem>_crop.<ext>, ignored for directories)
        output: Option<PathBuf>,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,
    },
    /// Apply error diffusion dithering
    Dither {
        /// Image file or directory containing _crop images
        input: PathBuf,

        /// Output file (default: _crop replaced by _dithered, ignored for directories)
        output: Option<PathBuf>,

        /// floyd_steinberg, jarvis_judice_ninke or stucki
        #[arg(short, long)]
        method: Option<String>,

        /// Number of gray levels (power of 2, 2-256)
        #[arg(short = 'l', long)]
        color_levels: Option<u32>,
    },
    /// Pack dithered images into EPD binaries and optional C headers
    Convert {
        /// Image file or directory containing _dithered images
        input: PathBuf,

        /// Output .bin file, or output directory in directory mode
        output: Option<PathBuf>,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Number of gray levels (power of 2, 2-256)
        #[arg(short = 'l', long)]
        color_levels: Option<u32>,

        /// Also write C headers (and images.h in directory mode) here
        #[arg(long)]
        espslider_dir: Option<PathBuf>,

        /// Invert header bytes (ESPSlider 7.5 V2 panels)
        #[arg(long)]
        invert: bool,
    },
    /// Cut an image into a grid of tiles under <parent>/<stem>/
    Grid {
        /// Image file
        input: PathBuf,

        /// Number of rows
        #[arg(long)]
        rows: u32,

        /// Number of columns
        #[arg(long)]
        cols: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "geink=debug" } else { "geink=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Preprocess {
            input,
            output,
            width,
            height,
        } => {
            let config = resolve(
                config_path,
                ConfigLayer {
                    width,
                    height,
                    ..Default::default()
                },
            )?;
            run_preprocess(&input, output, &config)
        }
        Commands::Dither {
            input,
            output,
            method,
            color_levels,
        } => {
            let config = resolve(
                config_path,
                ConfigLayer {
                    color_levels,
                    method,
                    ..Default::default()
                },
            )?;
            run_dither(&input, output, &config)
        }
        Commands::Convert {
            input,
            output,
            width,
            height,
            color_levels,
            espslider_dir,
            invert,
        } => {
            let config = resolve(
                config_path,
                ConfigLayer {
                    width,
                    height,
                    color_levels,
                    method: None,
                },
            )?;
            let header = espslider_dir.map(|dir| HeaderTarget { dir, invert });
            run_convert(&input, output, &config, header.as_ref())
        }
        Commands::Grid { input, rows, cols } => {
            require_file(&input)?;
            grid_file(&input, rows, cols)
                .with_context(|| format!("Grid cut failed for {}", input.display()))?;
            Ok(())
        }
    }
}

fn resolve(config_path: Option<&Path>, cli: ConfigLayer) -> anyhow::Result<AppConfig> {
    let config = AppConfig::resolve(config_path, cli).context("Invalid configuration")?;
    tracing::info!(
        width = config.width(),
        height = config.height(),
        levels = config.levels().count(),
        method = %config.kernel(),
        "Configuration"
    );
    Ok(config)
}

fn require_file(input: &Path) -> anyhow::Result<()> {
    if input.is_file() {
        Ok(())
    } else {
        anyhow::bail!("Input file not found: {}", input.display())
    }
}

/// Fail the command only when every item in a non-empty batch failed.
fn finish_batch<T>(stage: &str, dir: &Path, report: &BatchReport<T>) -> anyhow::Result<()> {
    report.log_summary(stage, dir);
    if report.is_total_failure() {
        anyhow::bail!("{stage}: all {} files in {} failed", report.total(), dir.display());
    }
    Ok(())
}

fn warn_ignored_output(output: &Option<PathBuf>) {
    if let Some(output) = output {
        tracing::warn!(output = %output.display(), "Output path is ignored in directory mode");
    }
}

fn run_preprocess(input: &Path, output: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    if input.is_dir() {
        warn_ignored_output(&output);
        let report = preprocess_dir(input, config)?;
        return finish_batch("preprocess", input, &report);
    }
    require_file(input)?;
    let output = output.unwrap_or_else(|| preprocess_output_path(input));
    preprocess_file(input, &output, config)
        .with_context(|| format!("Preprocessing failed for {}", input.display()))?;
    Ok(())
}

fn run_dither(input: &Path, output: Option<PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    if input.is_dir() {
        warn_ignored_output(&output);
        let report = dither_dir(input, config)?;
        return finish_batch("dither", input, &report);
    }
    require_file(input)?;
    let output = output.unwrap_or_else(|| dither_output_path(input));
    dither_file(input, &output, config)
        .with_context(|| format!("Dithering failed for {}", input.display()))?;
    Ok(())
}

fn run_convert(
    input: &Path,
    output: Option<PathBuf>,
    config: &AppConfig,
    header: Option<&HeaderTarget>,
) -> anyhow::Result<()> {
    if input.is_dir() {
        let batch = convert_dir(input, output.as_deref(), config, header)?;
        finish_batch("convert", input, &batch.report)?;
        batch.index.context("Failed to write image index")?;
        return Ok(());
    }
    require_file(input)?;
    let output = output.unwrap_or_else(|| convert_output_path(input, None));
    convert_file(input, &output, config, header)
        .with_context(|| format!("Conversion failed for {}", input.display()))?;
    Ok(())
}
