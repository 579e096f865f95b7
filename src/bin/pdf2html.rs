//! CLI binary for edgequake-pdf2html.
//!
//! A thin shim over the library crate that maps CLI flags onto
//! `ConversionOptions` and prints or writes the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2html::{
    output::error_response, ColorFormat, ConversionOptions, ConversionProgressCallback,
    ImageFormat, ImageMode, PageSelection, PdfToHtmlConverter, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn page_elapsed(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, html_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{html_len:>6} bytes")),
            dim(&format!("{:.2}s", self.page_elapsed())),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['…']).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{:.2}s", self.page_elapsed())),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages converted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} replaced by placeholders)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (HTML on stdout, page images under storage/app/public/pdf-images)
  pdf2html document.pdf

  # Convert to file
  pdf2html document.pdf -o document.html

  # Text only, absolutely positioned like the PDF
  pdf2html --no-images --preserve-layout report.pdf -o report.html

  # Self-contained HTML with inline JPEG page images
  pdf2html --embed-images --image-format jpeg --quality 70 --dpi 150 slides.pdf -o slides.html

  # JSON response {"success": true, "html": "..."}
  pdf2html --format json document.pdf > response.json

  # Options from a JSON file; flags override it
  pdf2html --options options.json --pages 1-5 document.pdf

  # Inspect PDF metadata
  pdf2html --inspect-only document.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium
  RUST_LOG          Log filter (e.g. edgequake_pdf2html=debug)
"#;

/// Convert PDF files to styled, responsive HTML.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2html",
    version,
    about = "Convert PDF files to styled, responsive HTML",
    long_about = "Convert PDF documents to a single self-contained HTML file with embedded CSS. \
Headings are detected from text and font metadata, styles and positions can be preserved, and \
page images are written to a storage directory served under a public URL prefix.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long, env = "PDF2HTML_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "html")]
    format: OutputFormat,

    /// JSON file with conversion options; flags below override it.
    #[arg(long, env = "PDF2HTML_OPTIONS")]
    options: Option<PathBuf>,

    /// Rasterisation DPI (72–600).
    #[arg(long, env = "PDF2HTML_DPI", value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: Option<u32>,

    /// Image quality (1–100).
    #[arg(long, env = "PDF2HTML_QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Skip image extraction.
    #[arg(long)]
    no_images: bool,

    /// Inline images as base64 data URIs.
    #[arg(long)]
    embed_images: bool,

    /// Image encoding.
    #[arg(long, value_enum)]
    image_format: Option<ImageFormatArg>,

    /// Rasterise whole pages or extract embedded images.
    #[arg(long, value_enum)]
    image_mode: Option<ImageModeArg>,

    /// Directory image files are written to.
    #[arg(long, env = "PDF2HTML_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// URL prefix the image directory is served under.
    #[arg(long, env = "PDF2HTML_PUBLIC_URL_PREFIX")]
    public_url_prefix: Option<String>,

    /// Don't attach font, colour and alignment styles.
    #[arg(long)]
    no_styles: bool,

    /// Position text and images absolutely, as in the PDF.
    #[arg(long)]
    preserve_layout: bool,

    /// Keep single line breaks inside paragraphs.
    #[arg(long)]
    preserve_line_breaks: bool,

    /// Omit responsive and print media rules.
    #[arg(long)]
    no_responsive: bool,

    /// CSS colour notation.
    #[arg(long, value_enum)]
    color_format: Option<ColorFormatArg>,

    /// Document title (defaults to the PDF title or file name).
    #[arg(long)]
    title: Option<String>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2HTML_PAGES")]
    pages: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2HTML_PASSWORD")]
    password: Option<String>,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2HTML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Html,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ImageFormatArg {
    Png,
    Jpeg,
}

impl From<ImageFormatArg> for ImageFormat {
    fn from(v: ImageFormatArg) -> Self {
        match v {
            ImageFormatArg::Png => ImageFormat::Png,
            ImageFormatArg::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ImageModeArg {
    PageRaster,
    Embedded,
}

impl From<ImageModeArg> for ImageMode {
    fn from(v: ImageModeArg) -> Self {
        match v {
            ImageModeArg::PageRaster => ImageMode::PageRaster,
            ImageModeArg::Embedded => ImageMode::Embedded,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ColorFormatArg {
    Rgb,
    Hex,
}

impl From<ColorFormatArg> for ColorFormat {
    fn from(v: ColorFormatArg) -> Self {
        match v {
            ColorFormatArg::Rgb => ColorFormat::Rgb,
            ColorFormatArg::Hex => ColorFormat::Hex,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.format == OutputFormat::Json;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !json;
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

    let converter = PdfToHtmlConverter::with_pdfium().context("Failed to load pdfium")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = converter
            .inspect(&cli.input, cli.password.as_deref())
            .context("Failed to inspect PDF")?;

        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build options ────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let options = build_options(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = match converter.convert(&cli.input, &options) {
        Ok(output) => output,
        Err(e) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&error_response(&e))
                    .context("Failed to serialise error")?
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Conversion failed"),
    };

    let body = if json {
        serde_json::to_string_pretty(&output.to_json_response())
            .context("Failed to serialise output")?
    } else {
        output.html.clone()
    };

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, body.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(body.as_bytes())
                .context("Failed to write to stdout")?;
            if !body.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    if !cli.quiet && !json {
        let stats = &output.stats;
        let selected = stats.processed_pages + stats.failed_pages;
        eprintln!(
            "{}  {}/{} pages  {} images  {}ms{}",
            if stats.failed_pages == 0 && stats.image_failures == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.processed_pages,
            selected,
            stats.images_written,
            stats.total_duration_ms,
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
        if stats.image_failures > 0 {
            eprintln!("   {}", dim(&format!("{} images failed", stats.image_failures)));
        }
    }

    Ok(())
}

/// Layer CLI flags over the options file (or the defaults).
fn build_options(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionOptions> {
    let mut options = match cli.options {
        Some(ref path) => ConversionOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ConversionOptions::default(),
    };

    if let Some(dpi) = cli.dpi {
        options.dpi = dpi;
    }
    if let Some(quality) = cli.quality {
        options.image_quality = quality;
    }
    if cli.no_images {
        options.extract_images = false;
    }
    if cli.embed_images {
        options.embed_images = true;
    }
    if let Some(format) = cli.image_format {
        options.image_format = format.into();
    }
    if let Some(mode) = cli.image_mode {
        options.image_mode = mode.into();
    }
    if let Some(ref dir) = cli.image_dir {
        options.image_dir = dir.clone();
    }
    if let Some(ref prefix) = cli.public_url_prefix {
        options.public_url_prefix = prefix.clone();
    }
    if cli.no_styles {
        options.preserve_styles = false;
    }
    if cli.preserve_layout {
        options.preserve_layout = true;
    }
    if cli.preserve_line_breaks {
        options.preserve_line_breaks = true;
    }
    if cli.no_responsive {
        options.responsive = false;
    }
    if let Some(format) = cli.color_format {
        options.color_format = format.into();
    }
    if let Some(ref title) = cli.title {
        options.title = Some(title.clone());
    }
    if let Some(ref pages) = cli.pages {
        options.pages = parse_pages(pages)?;
    }
    if let Some(ref password) = cli.password {
        options.password = Some(password.clone());
    }
    options.progress_callback = progress;

    options.validate().context("Invalid configuration")?;
    Ok(options)
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }
        return Ok(PageSelection::Range(start, end));
    }

    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
        return Ok(PageSelection::Set(pages));
    }

    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
