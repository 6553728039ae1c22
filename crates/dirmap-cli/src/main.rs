//! dirmap CLI
//!
//! Maps a directory into a compact, summarized tree for pasting into
//! prompts. Repeated runs reuse a per-directory mtime cache.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::DirmapConfig;
use dirmap_indexer::{ScanOptions, ScanReport, Scanner};
use dirmap_render::{estimate_tokens, render_json, OutputFormat, TextRenderer};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dirmap")]
#[command(about = "dirmap - Summarized directory maps for AI coding assistants")]
#[command(version)]
struct Cli {
    /// Directory to map (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Extra pattern to exclude (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Maximum directory depth to expand
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Do not read .gitignore files
    #[arg(long)]
    no_ignore_file: bool,

    /// List files without content summaries
    #[arg(long)]
    no_content: bool,

    /// Neither read nor write the scan cache
    #[arg(long)]
    no_cache: bool,

    /// Delete the scan cache before scanning
    #[arg(long)]
    clear_cache: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output file (default from config: directory_structure.txt)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the report to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Approximate token budget for the report
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Config file (default: <config dir>/dirmap/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match DirmapConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (DirmapConfig::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    run(cli, config)
}

fn run(cli: Cli, config: DirmapConfig) -> Result<()> {
    let options = scan_options(&cli, &config);

    eprintln!("Scanning {}...", cli.path.display());
    let report = Scanner::with_options(options)
        .scan(&cli.path)
        .with_context(|| format!("Cannot scan {}", cli.path.display()))?;

    for warning in &report.warnings {
        warn!("{}", warning);
    }
    eprintln!(
        "Indexed {} files in {} dirs (skipped {}) [cache: {} hits]",
        report.stats.files, report.stats.dirs, report.stats.skipped, report.stats.cache_hits
    );

    let max_tokens = cli.max_tokens.or(config.max_tokens);
    let output = render(&report, cli.format.into(), config.summary_lines, max_tokens)?;

    if cli.stdout {
        print!("{}", output);
        return Ok(());
    }

    let path = cli.output.unwrap_or(config.output_file);
    std::fs::write(&path, &output)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!(
        "Output saved to: {} (~{} tokens)",
        path.display(),
        estimate_tokens(&output)
    );

    Ok(())
}

/// Merge flags over config values.
fn scan_options(cli: &Cli, config: &DirmapConfig) -> ScanOptions {
    let mut ignore_patterns = cli.ignore.clone();
    ignore_patterns.extend(config.ignore_patterns.iter().cloned());

    ScanOptions {
        ignore_patterns,
        max_depth: cli.max_depth.or(config.max_depth),
        use_ignore_file: config.use_ignore_file && !cli.no_ignore_file,
        use_cache: config.use_cache && !cli.no_cache,
        clear_cache: cli.clear_cache,
        omit_content: config.omit_content || cli.no_content,
        window_bytes: config.window_bytes,
    }
}

fn render(
    report: &ScanReport,
    format: OutputFormat,
    summary_lines: usize,
    max_tokens: Option<usize>,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(TextRenderer::with_summary_lines(summary_lines)
            .render_with_budget(report, max_tokens)),
        OutputFormat::Json => {
            let mut json = render_json(report, max_tokens).context("Failed to render JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}
