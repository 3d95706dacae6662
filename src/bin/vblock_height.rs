//! vblock-height CLI: measure workpiece height in V-block photographs.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use vblock_height::{HeightMeasurer, MeasurementConfig, MeasurementReport};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "vblock-height")]
#[command(about = "Measure how high a round workpiece sits above the vertex of a V-block")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure one or more images.
    Measure(MeasureArgs),

    /// Write the default configuration as JSON.
    DefaultConfig {
        /// Destination file.
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct MeasureArgs {
    /// Images to measure, processed independently.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON configuration file (missing sections use defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for `<stem>_annotated.png` overlays.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print a JSON array of reports instead of one line per image.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ImageReport<'a> {
    image: &'a Path,
    #[serde(flatten)]
    report: MeasurementReport,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Measure(args) => run_measure(&args),
        Commands::DefaultConfig { output } => run_default_config(&output),
    }
}

// ── measure ────────────────────────────────────────────────────────────

fn run_measure(args: &MeasureArgs) -> CliResult<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration: {}", path.display());
            MeasurementConfig::from_json_file(path)?
        }
        None => MeasurementConfig::default(),
    };
    let measurer = HeightMeasurer::new(config)?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut reports = Vec::with_capacity(args.images.len());
    for image in &args.images {
        tracing::info!("Measuring {}", image.display());
        let measurement = measurer.measure_file(image);

        if let Some(dir) = &args.output_dir {
            if measurement.annotated.is_some() {
                let out = annotated_path(dir, image);
                match measurement.save_annotated(&out) {
                    Ok(()) => tracing::info!("Annotated image written to {}", out.display()),
                    Err(e) => tracing::warn!("Could not write {}: {}", out.display(), e),
                }
            }
        }

        let report = measurement.report();
        if !args.json {
            print_line(image, &report);
        }
        reports.push(ImageReport {
            image: image.as_path(),
            report,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let measured = reports.iter().filter(|r| r.report.height.is_some()).count();
    tracing::info!("Measured {}/{} images", measured, reports.len());
    Ok(())
}

fn print_line(image: &Path, report: &MeasurementReport) {
    match (report.height, &report.failure) {
        (Some(height), _) => println!("{}: {:.2} px", image.display(), height),
        (None, Some(failure)) => {
            println!("{}: no height ({})", image.display(), failure.user_message())
        }
        (None, None) => println!("{}: no height", image.display()),
    }
}

fn annotated_path(dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{stem}_annotated.png"))
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config(output: &Path) -> CliResult<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let config = MeasurementConfig::default();
    config.to_json_file(output)?;

    tracing::info!("Configuration saved to {}", output.display());
    tracing::info!(
        "Canny ({:.0}, {:.0}), Hough lines threshold {}, circle radius {}..{} px",
        config.preprocessing.canny_low_threshold,
        config.preprocessing.canny_high_threshold,
        config.lines.threshold,
        config.circles.min_radius,
        config.circles.max_radius,
    );
    Ok(())
}
