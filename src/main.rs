use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hashkit::config::Config;
use hashkit::hash::verify::load_checksum_list;
use hashkit::hash::{
    BatchProcessor, ChecksumValidator, CompositeHasher, FormattedDigest, HashComputer, HashRegistry,
    Options, OutputFormat, format_digest, wildcard,
};

#[derive(Parser)]
#[command(name = "hashkit", version, about = "Hash strings, files, directories and archives")]
struct Cli {
    /// Digest algorithm (see `hashkit list`)
    #[arg(short, long, global = true)]
    algo: Option<String>,

    /// Output format: hex, base64 or raw
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Prefix digests with "<algorithm>:"
    #[arg(long, global = true)]
    prefix: bool,

    /// Worker threads for batch commands (0 = one per CPU)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Configuration file (defaults to ~/.config/hashkit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a string
    String { text: String },

    /// Hash standard input
    Stdin,

    /// Hash one or more files in parallel (wildcards are expanded)
    File {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Emit one JSON record per file
        #[arg(long)]
        json: bool,
    },

    /// Hash a directory into a single digest
    Dir {
        path: PathBuf,

        /// Include files in subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Hash the entries of a zip, tar or tar.gz archive into a single digest
    Archive { path: PathBuf },

    /// Check one file against an expected digest
    Verify { path: PathBuf, expected: String },

    /// Check every file listed in a checksum manifest
    Check { manifest: PathBuf },

    /// List available algorithms
    List,
}

#[derive(serde::Serialize)]
struct JsonRecord<'a> {
    path: &'a Path,
    algorithm: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(io::stderr)
        .init();
}

/// RUST_LOG wins when set and valid; otherwise -v picks the level
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    EnvFilter::default().add_directive(level.into())
}

/// Returns Ok(false) when the command ran but some input failed
fn run(cli: Cli) -> Result<bool> {
    let config = Config::load(cli.config.as_deref())?;
    let algorithm = cli.algo.clone().unwrap_or_else(|| config.algorithm.clone());
    let mut options = config.options();
    if let Some(format) = cli.format {
        options.format = format;
    }
    options.prefix |= cli.prefix;
    if let Some(workers) = cli.workers {
        options.workers = workers;
    }

    let registry = Arc::new(HashRegistry::new());
    if !registry.is_supported(&algorithm) && !matches!(cli.command, Commands::List) {
        return Err(hashkit::HashError::UnsupportedAlgorithm { algorithm }.into());
    }
    let computer = HashComputer::with_registry(Arc::clone(&registry)).with_buffer_size(options.buffer_size);

    match cli.command {
        Commands::String { text } => {
            let digest = computer.hash_string(&text, &algorithm)?;
            print_digest(&format_digest(digest, &algorithm, &options))?;
        }
        Commands::Stdin => {
            let digest = computer.hash_reader(io::stdin().lock(), &algorithm)?;
            print_digest(&format_digest(digest, &algorithm, &options))?;
        }
        Commands::File { paths, json } => {
            let paths = wildcard::expand_patterns(&paths)?;
            return hash_files(computer, &paths, &algorithm, &options, json);
        }
        Commands::Dir { path, recursive } => {
            let digest = CompositeHasher::new(computer)
                .hash_dir(&path, &algorithm, recursive || config.recursive)
                .with_context(|| format!("hashing directory {}", path.display()))?;
            print_digest(&format_digest(digest, &algorithm, &options))?;
        }
        Commands::Archive { path } => {
            let digest = CompositeHasher::new(computer).hash_archive_file(&path, &algorithm)?;
            print_digest(&format_digest(digest, &algorithm, &options))?;
        }
        Commands::Verify { path, expected } => {
            let validator = ChecksumValidator::new(BatchProcessor::new(computer));
            validator.validate_file_checksum(&path, &expected, &algorithm)?;
            println!("{}: {}", path.display(), "OK".green());
        }
        Commands::Check { manifest } => {
            let checksums = load_checksum_list(&manifest)?;
            let validator = ChecksumValidator::new(batch_processor(computer, checksums.len()));
            let failures = validator.validate_files_in_parallel(&checksums, &algorithm, options.workers);
            for failure in &failures {
                eprintln!("{}: {}", failure.path.display(), failure.error.to_string().red());
            }
            println!(
                "{} checked, {} failed",
                checksums.len(),
                failures.len()
            );
            return Ok(failures.is_empty());
        }
        Commands::List => {
            for info in registry.list_algorithms() {
                let mut notes = Vec::new();
                if info.insecure {
                    notes.push("insecure".yellow().to_string());
                }
                if !info.cryptographic {
                    notes.push("non-cryptographic".dimmed().to_string());
                }
                if !info.builtin {
                    notes.push("custom".cyan().to_string());
                }
                println!("{:<10} {:>4} bits  {}", info.name, info.output_bits, notes.join(", "));
            }
        }
    }
    Ok(true)
}

fn hash_files(
    computer: HashComputer,
    paths: &[PathBuf],
    algorithm: &str,
    options: &Options,
    json: bool,
) -> Result<bool> {
    let processor = batch_processor(computer, paths.len());
    let batch = processor.hash_files_in_parallel_with_options(paths, algorithm, options);

    let mut stdout = io::stdout().lock();
    for result in &batch.results {
        if json {
            // JSON carries text only, so raw digests are rendered as hex
            let record = JsonRecord {
                path: &result.path,
                algorithm: &result.algorithm,
                digest: result.digest.as_ref().ok().map(ToString::to_string),
                error: result.digest.as_ref().err().map(ToString::to_string),
            };
            serde_json::to_writer(&mut stdout, &record)?;
            writeln!(stdout)?;
        } else if let Ok(digest) = &result.digest {
            write_file_digest(&mut stdout, digest, &result.path)?;
        }
    }
    stdout.flush()?;
    if !json {
        for error in batch.errors() {
            eprintln!("{}", error.to_string().red());
        }
    }
    Ok(batch.errors().is_empty())
}

/// Batch processor with a progress bar when stderr is a terminal
fn batch_processor(computer: HashComputer, total: usize) -> BatchProcessor {
    let processor = BatchProcessor::new(computer);
    if total < 2 || !io::stderr().is_terminal() {
        return processor;
    }

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    processor.with_progress_callback(move |progress| {
        pb.set_position(progress.completed as u64);
        if progress.failed {
            pb.set_message(format!("failed: {}", progress.path.display()));
        }
        if progress.completed == progress.total {
            pb.finish_and_clear();
        }
    })
}

/// One "<digest>  <path>" line per file; raw digests are written unencoded
/// with no path or separator
fn write_file_digest<W: Write>(out: &mut W, digest: &FormattedDigest, path: &Path) -> io::Result<()> {
    match digest {
        FormattedDigest::Raw(bytes) => out.write_all(bytes),
        other => writeln!(out, "{}  {}", other, path.display()),
    }
}

fn print_digest(digest: &FormattedDigest) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match digest {
        FormattedDigest::Raw(bytes) => stdout.write_all(bytes)?,
        other => writeln!(stdout, "{other}")?,
    }
    stdout.flush()?;
    Ok(())
}
