//! Orthographic correction CLI.
//!
//! Corrects Markdown and DOCX files with the built-in presets and any
//! user-supplied `wrong:right` rules, writing a single corrected file or a
//! ZIP archive when several files are given.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use hyoki::correction::mime_for_path;
use hyoki::domain::presets;
use hyoki::{BatchOutcome, Config, CorrectionRequest, CorrectionService, Download, UploadedFile};

/// Japanese orthographic variant corrector
///
/// Rewrites spelling variants such as 下さい → ください in Markdown and DOCX
/// files while keeping run formatting and comments intact.
#[derive(Parser)]
#[command(name = "hyoki")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input files (.md, .markdown, .txt or .docx)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Built-in preset to apply (can be specified multiple times)
    #[arg(short = 'p', long = "preset", value_name = "KEY")]
    presets: Vec<String>,

    /// Apply every built-in preset
    #[arg(long, conflicts_with = "presets")]
    all_presets: bool,

    /// Additional correction rule (can be specified multiple times)
    #[arg(short = 'r', long = "rule", value_name = "WRONG:RIGHT")]
    rules: Vec<String>,

    /// File with one WRONG:RIGHT rule per line
    #[arg(long, value_name = "FILE")]
    rules_file: Option<PathBuf>,

    /// Output file or directory (defaults to the artifact name in the
    /// current directory)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the highlighted text of each file
    #[arg(long)]
    show: bool,

    /// Configuration file (defaults to ./hyoki.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in presets
    Presets,

    /// Print the paragraph text of a file (for checking before correcting)
    Extract {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Correction command handler.
struct CorrectionHandler {
    service: CorrectionService,
    verbose: bool,
}

impl CorrectionHandler {
    fn new(verbose: bool) -> Self {
        Self {
            service: CorrectionService::with_default_strategies(),
            verbose,
        }
    }

    /// Corrects `files` and writes the resulting artifact.
    fn correct(
        &self,
        files: &[PathBuf],
        request: CorrectionRequest,
        output: Option<&Path>,
        show: bool,
    ) -> Result<()> {
        if files.is_empty() {
            anyhow::bail!("No input files given");
        }

        let uploads = files
            .iter()
            .map(|path| read_upload(path))
            .collect::<Result<Vec<_>>>()?;
        let request = CorrectionRequest {
            files: uploads,
            ..request
        };

        if self.verbose {
            println!("Inputs: {} file(s)", request.files.len());
            println!("Presets: {}", request.presets.join(", "));
        }

        let outcome = self
            .service
            .process(&request)
            .with_context(|| "Correction failed")?;

        report_errors(&outcome);
        if show {
            print_display(&outcome);
        }

        let download = match &outcome.download {
            Some(download) => download,
            None => anyhow::bail!("No file could be corrected"),
        };
        let target = output_path(output, download);
        write_download(&target, download)?;

        if self.verbose {
            println!("\nCorrection Summary:");
            println!("  Files corrected: {}", outcome.files.len());
            println!(
                "  Files changed:   {}",
                outcome.files.iter().filter(|f| f.content.has_changes()).count()
            );
            println!("  Files skipped:   {}", outcome.errors.len());
            println!(
                "  Paragraphs rewritten: {}",
                outcome
                    .files
                    .iter()
                    .map(|f| f.content.paragraphs_rewritten)
                    .sum::<usize>()
            );
        }

        println!(
            "✓ Applied {} correction(s) → {}",
            outcome.replacements(),
            target.display()
        );
        Ok(())
    }

    /// Prints or writes the paragraph text of a file.
    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let upload = read_upload(input)?;
        let text = self
            .service
            .extract_text(&upload)
            .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.chars().count(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }
        Ok(())
    }

    fn list_presets(&self) {
        for preset in presets::PRESETS {
            println!("{}\t→ {}", preset.wrong, preset.correct);
        }
    }
}

/// Reads a file from disk as an upload, guessing its MIME type from the
/// extension.
fn read_upload(path: &Path) -> Result<UploadedFile> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let upload = UploadedFile::new(mime_for_path(path), bytes);
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => upload.with_name(name),
        None => upload,
    })
}

/// Joins command-line rules and the rules file into free-form lines.
fn build_rules(rules: &[String], rules_file: Option<&Path>) -> Result<String> {
    let mut lines = rules.to_vec();
    if let Some(path) = rules_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        lines.push(content);
    }
    Ok(lines.join("\n"))
}

/// Chooses the preset keys: explicit flags win over the configured defaults.
fn select_presets(explicit: &[String], all: bool, config: &Config) -> Vec<String> {
    if all {
        presets::keys().map(str::to_string).collect()
    } else if explicit.is_empty() {
        config.default_presets.clone()
    } else {
        explicit.to_vec()
    }
}

fn output_path(output: Option<&Path>, download: &Download) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(&download.file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&download.file_name),
    }
}

fn write_download(target: &Path, download: &Download) -> Result<()> {
    std::fs::write(target, &download.bytes)
        .with_context(|| format!("Failed to write to {}", target.display()))
}

fn report_errors(outcome: &BatchOutcome) {
    for failure in &outcome.errors {
        eprintln!(
            "✗ {}: {}",
            failure.name.as_deref().unwrap_or("<unnamed>"),
            failure.error
        );
    }
}

fn print_display(outcome: &BatchOutcome) {
    for file in &outcome.files {
        println!("== {} ==", file.name.as_deref().unwrap_or("<unnamed>"));
        println!("{}", file.content.display_text);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default()?,
    };
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let handler = CorrectionHandler::new(cli.verbose);

    match &cli.command {
        Some(Commands::Presets) => handler.list_presets(),
        Some(Commands::Extract { file, output }) => {
            handler.extract(file, output.as_deref())?;
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            let mut request = CorrectionRequest::default()
                .with_presets(&select_presets(&cli.presets, cli.all_presets, &config))
                .with_freeform(&build_rules(&cli.rules, cli.rules_file.as_deref())?);
            request.extra = config.extra_corrections();
            handler.correct(&cli.files, request, cli.output.as_deref(), cli.show)?;
        }
    }

    Ok(())
}
