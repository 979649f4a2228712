//! CLI binary for edgequake-img2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to one
//! `ConversionJob` and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use edgequake_img2pdf::job::DEFAULT_MERGED_NAME;
use edgequake_img2pdf::{
    ConversionConfig, ConversionJob, ConversionProgressCallback, Converter, JobOutcome, PageSize,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar plus one log line per image.
///
/// The bar stays invisible until `on_batch_start`, so single-image jobs
/// (which report no batch events) print nothing here.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
        })
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    /// Clear the bar if a batch never completed it.
    fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} images…"))
        ));
    }

    fn on_item_start(&self, _index: usize, _total: usize, source: &Path) {
        self.bar.set_message(short_name(source));
    }

    fn on_item_complete(&self, index: usize, total: usize, source: &Path) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            short_name(source),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, source: &Path, error: &str) {
        // Keep to the first line and truncate; error messages can carry hints.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 80 {
            format!("{}\u{2026}", first_line.chars().take(79).collect::<String>())
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            short_name(source),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} images converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} images converted  ({} skipped or failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One image → image.pdf
  img2pdf image.jpg

  # One image → chosen file
  img2pdf image.jpg -o output.pdf

  # Several images → one multi-page PDF
  img2pdf img1.jpg img2.png -m -o combined.pdf

  # Every image in a directory → one PDF each (written into the directory)
  img2pdf -d /path/to/images/

  # Every image in a directory → one PDF each, into another directory
  img2pdf -d /path/to/images/ -o /path/to/pdfs/

  # Every image in a directory → one multi-page PDF
  img2pdf -d /path/to/images/ --merge-all combined.pdf

  # Letter pages, 1/2 inch margin, JSON result on stdout
  img2pdf --page-size letter --margin 36 --json scan.png

SUPPORTED FORMATS:
  .jpg .jpeg .png .bmp .tiff .tif .gif .webp   (extension match is case-insensitive)

PAGE SIZES:
  A4       595 × 842 pt   (default)
  Letter   612 × 792 pt

ENVIRONMENT VARIABLES:
  IMG2PDF_OUTPUT        Default for --output
  IMG2PDF_PAGE_SIZE     Default for --page-size
  IMG2PDF_MARGIN        Default for --margin
  RUST_LOG              Overrides the log filter (e.g. RUST_LOG=edgequake_img2pdf=debug)
"#;

/// Convert images to PDF: one per image, or merged into one document.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Convert images to PDF format",
    long_about = "Convert raster images (JPEG, PNG, BMP, TIFF, GIF, WebP) to PDF. Each image \
is scaled to fit inside the page margins, keeping its aspect ratio, and centred on an A4 or \
Letter page.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file(s) to convert.
    images: Vec<PathBuf>,

    /// Directory containing images to convert.
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Output PDF file, or output directory for directory batch mode.
    #[arg(short, long, env = "IMG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Merge multiple images into a single PDF.
    #[arg(short, long)]
    merge: bool,

    /// Merge all images in --directory into this single PDF.
    #[arg(long, value_name = "FILE", requires = "directory")]
    merge_all: Option<PathBuf>,

    /// PDF page size.
    #[arg(long, env = "IMG2PDF_PAGE_SIZE", value_enum, ignore_case = true, default_value = "a4")]
    page_size: PageSizeArg,

    /// Page margin in points.
    #[arg(long, env = "IMG2PDF_MARGIN", default_value_t = 50)]
    margin: u32,

    /// Print the job result as JSON on stdout.
    #[arg(long, env = "IMG2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

/// Resolve the flags to exactly one job; `None` when no input was given.
fn resolve_job(cli: &Cli) -> Option<ConversionJob> {
    if let Some(ref dir) = cli.directory {
        return Some(match cli.merge_all {
            Some(ref output) => ConversionJob::MergeDirectory {
                dir: dir.clone(),
                output: output.clone(),
            },
            None => ConversionJob::Directory {
                dir: dir.clone(),
                output_dir: cli.output.clone(),
            },
        });
    }

    match cli.images.as_slice() {
        [] => None,
        images if cli.merge || (images.len() > 1 && cli.output.is_some()) => {
            Some(ConversionJob::Merge {
                images: images.to_vec(),
                output: cli
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_MERGED_NAME)),
            })
        }
        [image] => Some(ConversionJob::Single {
            image: image.clone(),
            output: cli.output.clone(),
        }),
        images => Some(ConversionJob::Separate {
            images: images.to_vec(),
            output_dir: None,
        }),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve job ──────────────────────────────────────────────────────
    let Some(job) = resolve_job(&cli) else {
        Cli::command()
            .print_help()
            .context("Failed to print help")?;
        eprintln!("\nError: Please provide either image file(s) or a directory.");
        std::process::exit(1);
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .page_size(cli.page_size.into())
        .margin(cli.margin as f32);
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;
    let converter = Converter::new(config).context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = job.run(&converter);
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let outcome = result.context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        print_summary(&outcome);
    }

    check_outcome(&job, &outcome)
}

/// Decide the exit status once the summary has been printed.
///
/// Images named on the command line must all convert. A directory batch
/// only fails when nothing at all was created.
fn check_outcome(job: &ConversionJob, outcome: &JobOutcome) -> Result<()> {
    let JobOutcome::Batch(batch) = outcome else {
        return Ok(());
    };
    match job {
        ConversionJob::Separate { .. } if !batch.failed.is_empty() => {
            let first = &batch.failed[0];
            anyhow::bail!(
                "{} of {} images failed; first: {}: {}",
                batch.failed.len(),
                batch.total(),
                first.path.display(),
                first.error
            )
        }
        _ if batch.created.is_empty() && !batch.failed.is_empty() => {
            anyhow::bail!("No PDF files were created ({} failed)", batch.failed.len())
        }
        _ => Ok(()),
    }
}

/// Human-readable result on stderr.
fn print_summary(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Single { output } => {
            eprintln!("{}  {}", green("✔"), bold(&output.display().to_string()));
        }
        JobOutcome::Merged(merged) => {
            for skipped in &merged.skipped {
                eprintln!(
                    "  {} {}  {}",
                    red("✗"),
                    skipped.path.display(),
                    dim(&skipped.reason.to_string())
                );
            }
            eprintln!(
                "{}  {} pages  →  {}",
                if merged.skipped.is_empty() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                merged.page_count(),
                bold(&merged.output_path.display().to_string()),
            );
        }
        JobOutcome::Batch(batch) => {
            for failed in &batch.failed {
                eprintln!(
                    "  {} {}  {}",
                    red("✗"),
                    failed.path.display(),
                    dim(&failed.error.to_string())
                );
            }
            eprintln!("{}", outcome.status_text());
        }
    }
}
